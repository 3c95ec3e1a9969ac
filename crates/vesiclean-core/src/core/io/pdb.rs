use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Metadata preserved across a PDB read/write cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// REMARK/TITLE header lines, kept verbatim.
    pub header_lines: Vec<String>,
    /// Number of MODEL records encountered (0 for a single-frame file).
    pub model_count: usize,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("File contains no ATOM records")]
    Empty,
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for an ATOM/HETATM record")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coord(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let raw = slice_and_trim(line, start, end);
    raw.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: raw.into(),
        },
    })
}

/// PDB coordinate file, optionally multi-model.
///
/// Reading a multi-model file (a trajectory written as MODEL/ENDMDL blocks)
/// keeps the **last** model's coordinates: the structure is built from the
/// first model's records and every subsequent model overwrites positions by
/// record order. This is the pipeline's "last trajectory frame" contract.
///
/// Segment identifiers are taken from columns 73-76; PDB files carry no
/// charges, so partial charges are zero until merged with a PSF topology.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PdbMetadata::default();

        // Record order of the first model; later models overwrite by index.
        let mut atom_order = Vec::new();
        let mut current_model = 0usize;
        let mut index_in_model = 0usize;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "MODEL" => {
                    current_model += 1;
                    metadata.model_count = current_model;
                    index_in_model = 0;
                }
                "ENDMDL" | "TER" | "END" => {}
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let x = parse_coord(&line, line_num, 30, 38)?;
                    let y = parse_coord(&line, line_num, 38, 46)?;
                    let z = parse_coord(&line, line_num, 46, 54)?;
                    let position = Point3::new(x, y, z);

                    if current_model > 1 {
                        // Subsequent frame: positions only, matched by order.
                        let &atom_id =
                            atom_order.get(index_in_model).ok_or_else(|| {
                                PdbError::Inconsistency(format!(
                                    "model {} has more atoms than model 1",
                                    current_model
                                ))
                            })?;
                        system
                            .atom_mut(atom_id)
                            .ok_or_else(|| {
                                PdbError::Inconsistency("atom order out of sync".into())
                            })?
                            .position = position;
                        index_in_model += 1;
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let residue_name = slice_and_trim(&line, 17, 21);
                    let residue_number_str = slice_and_trim(&line, 22, 26);
                    let residue_number: isize =
                        residue_number_str.parse().map_err(|_| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::InvalidInt {
                                columns: "23-26".into(),
                                value: residue_number_str.into(),
                            },
                        })?;
                    let segment_name = {
                        let seg = slice_and_trim(&line, 72, 76);
                        if seg.is_empty() { "MAIN" } else { seg }
                    };

                    let segment_id = system.add_segment(segment_name);
                    let residue_id = system
                        .add_residue(segment_id, residue_number, residue_name)
                        .ok_or_else(|| {
                            PdbError::Inconsistency("segment vanished during build".into())
                        })?;
                    let atom = Atom::new(name, residue_id, position);
                    let atom_id = system.add_atom_to_residue(residue_id, atom).ok_or_else(
                        || PdbError::Inconsistency("residue vanished during build".into()),
                    )?;
                    atom_order.push(atom_id);
                    index_in_model += 1;
                }
                _ => {
                    if !line.trim().is_empty() && current_model == 0 && atom_order.is_empty() {
                        metadata.header_lines.push(line);
                    }
                }
            }
        }

        if atom_order.is_empty() {
            return Err(PdbError::Empty);
        }

        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }
        write_atom_records(system, writer)?;
        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(system, &PdbMetadata::default(), writer)
    }
}

fn write_atom_records(
    system: &MolecularSystem,
    writer: &mut impl Write,
) -> Result<(), PdbError> {
    for (index, atom_id) in system.canonical_atom_order().into_iter().enumerate() {
        let atom = system
            .atom(atom_id)
            .ok_or_else(|| PdbError::Inconsistency("atom order out of sync".into()))?;
        let residue = system
            .residue(atom.residue_id)
            .ok_or_else(|| PdbError::Inconsistency("orphaned atom".into()))?;
        let segment = system
            .segment(residue.segment_id)
            .ok_or_else(|| PdbError::Inconsistency("orphaned residue".into()))?;

        // Columns: serial 7-11, name 13-16, resName 18-21, resSeq 23-26,
        // x/y/z 31-54, occupancy/beta 55-66, segID 73-76.
        writeln!(
            writer,
            "ATOM  {:>5} {:<4} {:<4} {:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}",
            (index + 1) % 100000,
            atom.name,
            residue.name,
            residue.number,
            atom.position.x,
            atom.position.y,
            atom.position.z,
            1.0,
            0.0,
            segment.name
        )?;
    }
    Ok(())
}
