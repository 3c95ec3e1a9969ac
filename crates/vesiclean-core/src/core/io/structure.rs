use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::psf::{PsfError, PsfFile, PsfMetadata};
use crate::core::io::traits::MolecularFile;
use crate::core::models::system::MolecularSystem;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Failed to read topology: {0}")]
    Psf(#[from] PsfError),
    #[error("Failed to read coordinates: {0}")]
    Pdb(#[from] PdbError),
    #[error("Topology has {psf_atoms} atoms but coordinate file has {pdb_atoms}")]
    AtomCountMismatch { psf_atoms: usize, pdb_atoms: usize },
}

/// Loads a structure snapshot from a topology/coordinate pair.
///
/// The PSF supplies segments, residues, charges, masses, and bonds; the PDB
/// supplies coordinates, matched by canonical record order. For a
/// multi-model coordinate file (a trajectory), the last model wins.
///
/// # Errors
///
/// Returns an error if either file fails to parse or the atom counts of the
/// two files disagree.
pub fn load_structure(
    psf_path: &Path,
    pdb_path: &Path,
) -> Result<(MolecularSystem, PsfMetadata), StructureError> {
    let (mut system, metadata) = PsfFile::read_from_path(psf_path)?;
    let (coords_system, coords_metadata) = PdbFile::read_from_path(pdb_path)?;

    let topology_order = system.canonical_atom_order();
    let coords_order = coords_system.canonical_atom_order();
    if topology_order.len() != coords_order.len() {
        return Err(StructureError::AtomCountMismatch {
            psf_atoms: topology_order.len(),
            pdb_atoms: coords_order.len(),
        });
    }

    for (&topo_id, &coord_id) in topology_order.iter().zip(coords_order.iter()) {
        let position = coords_system
            .atom(coord_id)
            .map(|a| a.position)
            .unwrap_or_default();
        if let Some(atom) = system.atom_mut(topo_id) {
            atom.position = position;
        }
    }

    debug!(
        atoms = topology_order.len(),
        models = coords_metadata.model_count,
        "Loaded structure snapshot"
    );
    Ok((system, metadata))
}

/// Persists a structure snapshot as a topology/coordinate pair.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn write_structure_pair(
    system: &MolecularSystem,
    metadata: &PsfMetadata,
    psf_path: &Path,
    pdb_path: &Path,
) -> Result<(), StructureError> {
    PsfFile::write_to_path(system, metadata, psf_path)?;
    PdbFile::write_system_to_path(system, pdb_path)?;
    Ok(())
}
