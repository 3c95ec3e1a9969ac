use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents an atom in a molecular structure.
///
/// This struct carries the identity and physicochemical properties the
/// classification and charge-balancing engines need: a name, a parent
/// residue, a partial charge, and a 3-D position. Force-field type and mass
/// are kept so a structure read from a PSF topology can be written back
/// without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "P", "OH2", "C1").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The force-field atom type as carried by the topology file.
    pub force_field_type: String,
    /// The partial atomic charge in elementary charge units.
    pub partial_charge: f64,
    /// The atomic mass in atomic mass units.
    pub mass: f64,
    /// The 3-D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with default values for most fields.
    ///
    /// The atom is initialized with the provided name, residue ID, and
    /// position; charge, mass, and force-field type default to neutral/empty
    /// and can be filled in afterward (e.g., by the PSF reader).
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            position,
            force_field_type: String::new(),
            partial_charge: 0.0,
            mass: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ResidueId;
    use nalgebra::Point3;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let residue_id = ResidueId::default();
        let atom = Atom::new("OH2", residue_id, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.name, "OH2");
        assert_eq!(atom.residue_id, residue_id);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.force_field_type, "");
        assert_eq!(atom.partial_charge, 0.0);
        assert_eq!(atom.mass, 0.0);
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let residue_id = ResidueId::default();
        let mut atom1 = Atom::new("P", residue_id, Point3::new(0.0, 0.0, 0.0));
        atom1.partial_charge = 1.5; // Also test non-default fields
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
    }
}
