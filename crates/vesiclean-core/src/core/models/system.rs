use super::atom::Atom;
use super::ids::{AtomId, ResidueId, SegmentId};
use super::residue::{Residue, ResidueClass};
use super::segment::Segment;
use super::topology::Bond;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, VecDeque};

/// Represents a complete molecular system with atoms, residues, segments,
/// and bonds.
///
/// This struct is the central data structure of the library. It provides
/// efficient storage and access to all molecular components and maintains
/// internal lookup maps and a bond-adjacency cache for performance.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for segments using a slot map for efficient ID management.
    segments: SlotMap<SegmentId, Segment>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Lookup map for finding residues by segment ID and residue number.
    residue_id_map: HashMap<(SegmentId, isize), ResidueId>,
    /// Lookup map for finding segments by name.
    segment_id_map: HashMap<String, SegmentId>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in the system.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns a mutable iterator over all atoms in the system.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    /// Returns an iterator over all residues in the system.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id)
    }

    /// Returns an iterator over all segments in the system.
    pub fn segments_iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments.iter()
    }

    /// Returns a slice of all bonds in the system.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn find_segment_by_name(&self, name: &str) -> Option<SegmentId> {
        self.segment_id_map.get(name).copied()
    }

    /// Finds a residue ID by its segment ID and residue number.
    pub fn find_residue_by_number(
        &self,
        segment_id: SegmentId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(segment_id, residue_number))
            .copied()
    }

    /// Adds a new segment to the system or returns the existing one.
    ///
    /// This method is idempotent; if a segment with the given name already
    /// exists, it returns the existing segment ID without creating a
    /// duplicate.
    pub fn add_segment(&mut self, name: &str) -> SegmentId {
        match self.segment_id_map.get(name) {
            Some(&id) => id,
            None => {
                let id = self.segments.insert(Segment::new(name));
                self.segment_id_map.insert(name.to_string(), id);
                id
            }
        }
    }

    /// Adds a new residue to the system or returns the existing one.
    ///
    /// The residue's species class is derived from its name on insertion.
    /// Returns `None` if the segment does not exist.
    pub fn add_residue(
        &mut self,
        segment_id: SegmentId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let segment = self.segments.get_mut(segment_id)?;
        let key = (segment_id, residue_number);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(residue_number, name, segment_id);
            self.residues.insert(residue)
        });

        if !segment.residues.contains(&residue_id) {
            segment.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Adds an atom to a specific residue.
    ///
    /// Inserts the atom, registers it with the residue, and initializes the
    /// bond adjacency list for the new atom. Returns `None` if the residue
    /// does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        let name = atom.name.clone();

        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());

        let residue = self.residues.get_mut(residue_id).unwrap();
        residue.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms.
    ///
    /// Updates the adjacency cache. Idempotent; adding an existing bond
    /// succeeds without creating duplicates. Returns `None` if either atom
    /// does not exist.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId) -> Option<()> {
        if !self.atoms.contains_key(atom1_id) || !self.atoms.contains_key(atom2_id) {
            return None;
        }

        if let Some(neighbors) = self.bond_adjacency.get(atom1_id) {
            if neighbors.contains(&atom2_id) {
                // Bond already exists, operation is successful (idempotent)
                return Some(());
            }
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    /// Removes an atom from the system.
    ///
    /// Removes the atom, its bonds, and its adjacency entries, and updates
    /// the parent residue.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;

        // 1. Remove from parent residue
        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }

        // 2. Remove all bonds connected to this atom
        let original_bonds = std::mem::take(&mut self.bonds);
        self.bonds = original_bonds
            .into_iter()
            .filter(|bond| !bond.contains(atom_id))
            .collect();

        // 3. Clean up adjacency list
        let neighbors = self.bond_adjacency.remove(atom_id).unwrap_or_default();
        for neighbor_id in neighbors {
            if let Some(adjacency) = self.bond_adjacency.get_mut(neighbor_id) {
                adjacency.retain(|&id| id != atom_id);
            }
        }

        Some(atom)
    }

    /// Removes a residue from the system.
    ///
    /// Removes the residue and all its atoms, updating the parent segment
    /// and cleaning up all references and bonds.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let residue = self.residues.get(residue_id)?.clone(); // Clone to avoid borrow checker issues

        // 1. Remove all atoms within the residue
        for atom_id in residue.atoms().to_vec() {
            self.remove_atom(atom_id);
        }

        // 2. Remove from parent segment
        if let Some(segment) = self.segments.get_mut(residue.segment_id) {
            segment.residues.retain(|&id| id != residue_id);
        }

        // 3. Remove from residue maps
        self.residue_id_map
            .remove(&(residue.segment_id, residue.number));

        // 4. Finally, remove the residue itself
        self.residues.remove(residue_id)
    }

    /// Retrieves the bonded neighbors of an atom from the adjacency cache.
    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Returns an iterator over residues of a specific species class.
    pub fn residues_by_class(
        &self,
        class: ResidueClass,
    ) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues
            .iter()
            .filter(move |(_, residue)| residue.class == class)
    }

    /// Returns all atom IDs in canonical file order: segments in insertion
    /// order, residues in segment order, atoms in residue order.
    ///
    /// The PSF and PDB writers both iterate this order so a persisted
    /// topology/coordinate pair stays record-aligned.
    pub fn canonical_atom_order(&self) -> Vec<AtomId> {
        let mut order = Vec::with_capacity(self.atoms.len());
        for (_, segment) in self.segments.iter() {
            for &residue_id in &segment.residues {
                if let Some(residue) = self.residues.get(residue_id) {
                    order.extend_from_slice(residue.atoms());
                }
            }
        }
        order
    }

    /// Computes the bonded connected component of every residue.
    ///
    /// Two residues belong to the same fragment when any of their atoms are
    /// covalently bonded (directly or transitively). Atoms within one
    /// residue are treated as connected regardless of explicit bonds, so an
    /// unbonded residue is a fragment of its own. Fragment indices are
    /// assigned in residue storage order and are stable for a given system
    /// snapshot.
    pub fn residue_fragments(&self) -> SecondaryMap<ResidueId, usize> {
        // Residue-level adjacency from inter-residue bonds.
        let mut adjacency: SecondaryMap<ResidueId, Vec<ResidueId>> = SecondaryMap::new();
        for (res_id, _) in self.residues.iter() {
            adjacency.insert(res_id, Vec::new());
        }
        for bond in &self.bonds {
            let res_a = self.atoms[bond.atom1_id].residue_id;
            let res_b = self.atoms[bond.atom2_id].residue_id;
            if res_a != res_b {
                if !adjacency[res_a].contains(&res_b) {
                    adjacency[res_a].push(res_b);
                    adjacency[res_b].push(res_a);
                }
            }
        }

        let mut fragments: SecondaryMap<ResidueId, usize> = SecondaryMap::new();
        let mut next_fragment = 0usize;
        for (res_id, _) in self.residues.iter() {
            if fragments.contains_key(res_id) {
                continue;
            }
            let mut queue = VecDeque::from([res_id]);
            fragments.insert(res_id, next_fragment);
            while let Some(current) = queue.pop_front() {
                for &neighbor in &adjacency[current] {
                    if !fragments.contains_key(neighbor) {
                        fragments.insert(neighbor, next_fragment);
                        queue.push_back(neighbor);
                    }
                }
            }
            next_fragment += 1;
        }

        fragments
    }
}
