use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::engine::shell::ResidueSet;
use std::collections::HashMap;
use tracing::info;

/// The two systems produced by splitting on a residue set.
#[derive(Debug, Clone)]
pub struct SplitStructures {
    /// Everything not named in the removal set.
    pub retained: MolecularSystem,
    /// Exactly the residues named in the removal set.
    pub removed: MolecularSystem,
}

/// Splits a system into retained and removed halves by residue membership.
///
/// Both halves are rebuilt from scratch so their IDs are dense and their
/// canonical atom order is well defined. Bonds survive on whichever side
/// holds both endpoints; a bond crossing the cut is dropped from both,
/// which only happens when the removal set cuts through a covalent unit
/// the fragment expander should have completed.
pub fn split_by_residues(system: &MolecularSystem, to_remove: &ResidueSet) -> SplitStructures {
    let retained = copy_subset(system, |id| !to_remove.contains(&id));
    let removed = copy_subset(system, |id| to_remove.contains(&id));

    info!(
        retained_atoms = retained.atom_count(),
        removed_atoms = removed.atom_count(),
        removed_residues = to_remove.len(),
        "Split structure by residue set"
    );
    SplitStructures { retained, removed }
}

fn copy_subset(
    system: &MolecularSystem,
    keep: impl Fn(ResidueId) -> bool,
) -> MolecularSystem {
    let mut subset = MolecularSystem::new();
    let mut atom_id_map: HashMap<AtomId, AtomId> = HashMap::new();

    for (_, segment) in system.segments_iter() {
        let mut segment_id = None;
        for &residue_id in &segment.residues {
            if !keep(residue_id) {
                continue;
            }
            let residue = match system.residue(residue_id) {
                Some(r) => r,
                None => continue,
            };
            // Segments materialize lazily so an emptied segment vanishes.
            let seg =
                *segment_id.get_or_insert_with(|| subset.add_segment(&segment.name));
            let new_residue = match subset.add_residue(seg, residue.number, &residue.name) {
                Some(id) => id,
                None => continue,
            };
            for &atom_id in residue.atoms() {
                if let Some(atom) = system.atom(atom_id) {
                    let mut copy = atom.clone();
                    copy.residue_id = new_residue;
                    if let Some(new_atom) = subset.add_atom_to_residue(new_residue, copy) {
                        atom_id_map.insert(atom_id, new_atom);
                    }
                }
            }
        }
    }

    for bond in system.bonds() {
        if let (Some(&a), Some(&b)) = (
            atom_id_map.get(&bond.atom1_id),
            atom_id_map.get(&bond.atom2_id),
        ) {
            subset.add_bond(a, b);
        }
    }

    subset
}
