use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Metadata preserved across a PSF read/write cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsfMetadata {
    /// REMARKS lines from the !NTITLE section, without the keyword.
    pub title_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PsfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PsfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
}

#[derive(Debug, Error)]
pub enum PsfParseErrorKind {
    #[error("Invalid integer in field {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Atom record has {found} fields, expected at least 8")]
    ShortAtomRecord { found: usize },
    #[error("Bond references unknown atom serial {serial}")]
    DanglingBondSerial { serial: usize },
}

/// X-PLOR/CHARMM PSF topology file.
///
/// Only the !NTITLE, !NATOM, and !NBOND sections are interpreted; angle,
/// dihedral, and cross-term sections carry no information the pipeline
/// needs and are ignored on read and omitted on write.
pub struct PsfFile;

fn parse_section_count(line: &str, keyword: &str) -> Option<usize> {
    if !line.contains(keyword) {
        return None;
    }
    line.split_whitespace().next()?.parse().ok()
}

impl MolecularFile for PsfFile {
    type Metadata = PsfMetadata;
    type Error = PsfError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PsfMetadata::default();
        let mut serial_map: HashMap<usize, AtomId> = HashMap::new();

        let mut lines = reader.lines().enumerate();
        let mut natom: Option<usize> = None;

        // Scan the header until the !NATOM section, collecting title lines.
        for (_, line_res) in lines.by_ref() {
            let line = line_res?;
            if parse_section_count(&line, "!NTITLE").is_some() {
                continue;
            }
            if let Some(remark) = line.trim_start().strip_prefix("REMARKS") {
                metadata.title_lines.push(remark.trim().to_string());
                continue;
            }
            if let Some(count) = parse_section_count(&line, "!NATOM") {
                natom = Some(count);
                break;
            }
        }
        let natom = natom.ok_or(PsfError::MissingSection("!NATOM"))?;

        // Atom records: serial, segment, resid, resname, name, type, charge, mass.
        let mut parsed_atoms = 0usize;
        while parsed_atoms < natom {
            let (line_num, line_res) = lines.next().ok_or_else(|| {
                PsfError::Inconsistency(format!(
                    "!NATOM declared {} atoms but the file ended after {}",
                    natom, parsed_atoms
                ))
            })?;
            let line = line_res?;
            let line_num = line_num + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 8 {
                return Err(PsfError::Parse {
                    line: line_num,
                    kind: PsfParseErrorKind::ShortAtomRecord {
                        found: fields.len(),
                    },
                });
            }

            let serial: usize = fields[0].parse().map_err(|_| PsfError::Parse {
                line: line_num,
                kind: PsfParseErrorKind::InvalidInt {
                    field: "serial",
                    value: fields[0].into(),
                },
            })?;
            let segment_name = fields[1];
            let residue_number: isize = fields[2].parse().map_err(|_| PsfError::Parse {
                line: line_num,
                kind: PsfParseErrorKind::InvalidInt {
                    field: "resid",
                    value: fields[2].into(),
                },
            })?;
            let residue_name = fields[3];
            let atom_name = fields[4];
            let ff_type = fields[5];
            let charge: f64 = fields[6].parse().map_err(|_| PsfError::Parse {
                line: line_num,
                kind: PsfParseErrorKind::InvalidFloat {
                    field: "charge",
                    value: fields[6].into(),
                },
            })?;
            let mass: f64 = fields[7].parse().map_err(|_| PsfError::Parse {
                line: line_num,
                kind: PsfParseErrorKind::InvalidFloat {
                    field: "mass",
                    value: fields[7].into(),
                },
            })?;

            let segment_id = system.add_segment(segment_name);
            let residue_id = system
                .add_residue(segment_id, residue_number, residue_name)
                .ok_or_else(|| PsfError::Inconsistency("segment vanished during build".into()))?;

            let mut atom = Atom::new(atom_name, residue_id, Point3::origin());
            atom.force_field_type = ff_type.to_string();
            atom.partial_charge = charge;
            atom.mass = mass;
            let atom_id = system
                .add_atom_to_residue(residue_id, atom)
                .ok_or_else(|| PsfError::Inconsistency("residue vanished during build".into()))?;

            if serial_map.insert(serial, atom_id).is_some() {
                return Err(PsfError::Inconsistency(format!(
                    "Duplicate atom serial: {}",
                    serial
                )));
            }
            parsed_atoms += 1;
        }

        // Bond list: pairs of serials, up to four pairs per line.
        let mut nbond: Option<usize> = None;
        let mut bond_serials: Vec<usize> = Vec::new();
        for (line_num, line_res) in lines {
            let line = line_res?;
            let line_num = line_num + 1;
            match nbond {
                None => {
                    if let Some(count) = parse_section_count(&line, "!NBOND") {
                        nbond = Some(count);
                        bond_serials.reserve(count * 2);
                    }
                }
                Some(count) => {
                    if bond_serials.len() >= count * 2 {
                        break;
                    }
                    for field in line.split_whitespace() {
                        let serial: usize = field.parse().map_err(|_| PsfError::Parse {
                            line: line_num,
                            kind: PsfParseErrorKind::InvalidInt {
                                field: "bond serial",
                                value: field.into(),
                            },
                        })?;
                        bond_serials.push(serial);
                    }
                }
            }
        }

        if let Some(count) = nbond {
            if bond_serials.len() < count * 2 {
                return Err(PsfError::Inconsistency(format!(
                    "!NBOND declared {} bonds but only {} serials were found",
                    count,
                    bond_serials.len()
                )));
            }
            for pair in bond_serials.chunks_exact(2).take(count) {
                let a = *serial_map
                    .get(&pair[0])
                    .ok_or(PsfError::Parse {
                        line: 0,
                        kind: PsfParseErrorKind::DanglingBondSerial { serial: pair[0] },
                    })?;
                let b = *serial_map
                    .get(&pair[1])
                    .ok_or(PsfError::Parse {
                        line: 0,
                        kind: PsfParseErrorKind::DanglingBondSerial { serial: pair[1] },
                    })?;
                system.add_bond(a, b);
            }
        }

        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "PSF EXT")?;
        writeln!(writer)?;
        writeln!(writer, "{:>8} !NTITLE", metadata.title_lines.len())?;
        for line in &metadata.title_lines {
            writeln!(writer, " REMARKS {}", line)?;
        }
        writeln!(writer)?;

        let order = system.canonical_atom_order();
        writeln!(writer, "{:>8} !NATOM", order.len())?;

        let mut serial_of: HashMap<AtomId, usize> = HashMap::with_capacity(order.len());
        for (index, &atom_id) in order.iter().enumerate() {
            let serial = index + 1;
            serial_of.insert(atom_id, serial);

            let atom = system
                .atom(atom_id)
                .ok_or_else(|| PsfError::Inconsistency("atom order out of sync".into()))?;
            let residue = system
                .residue(atom.residue_id)
                .ok_or_else(|| PsfError::Inconsistency("orphaned atom".into()))?;
            let segment = system
                .segment(residue.segment_id)
                .ok_or_else(|| PsfError::Inconsistency("orphaned residue".into()))?;

            writeln!(
                writer,
                "{:>8} {:<4} {:<6} {:<6} {:<6} {:<6} {:>10.6} {:>13.4} {:>11}",
                serial,
                segment.name,
                residue.number,
                residue.name,
                atom.name,
                atom.force_field_type,
                atom.partial_charge,
                atom.mass,
                0
            )?;
        }
        writeln!(writer)?;

        let bonds = system.bonds();
        writeln!(writer, "{:>8} !NBOND: bonds", bonds.len())?;
        for chunk in bonds.chunks(4) {
            for bond in chunk {
                let a = serial_of.get(&bond.atom1_id).copied().ok_or_else(|| {
                    PsfError::Inconsistency("bond references atom outside canonical order".into())
                })?;
                let b = serial_of.get(&bond.atom2_id).copied().ok_or_else(|| {
                    PsfError::Inconsistency("bond references atom outside canonical order".into())
                })?;
                write!(writer, "{:>8}{:>8}", a, b)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(system, &PsfMetadata::default(), writer)
    }
}
