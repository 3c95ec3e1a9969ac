use super::ids::{AtomId, SegmentId};
use phf::{phf_map, phf_set};
use std::collections::HashMap;
use std::fmt;

/// Phospholipid residue names recognized by the classification tables.
static PHOSPHOLIPID_RESIDUES: phf::Set<&'static str> = phf_set! {
    "POPC", "POPE", "POPS", "POPG", "POPA", "DOPC", "DOPE", "DOPS",
    "DPPC", "DPPE", "DLPC", "PSM", "SSM", "SAPI", "PLPI",
};

/// Sterol residue names.
static STEROL_RESIDUES: phf::Set<&'static str> = phf_set! {
    "CHL1", "ERG", "CHSD",
};

/// Residue names of the carbohydrate/ceramide units that make up
/// multi-residue glycolipids.
static GLYCOLIPID_RESIDUES: phf::Set<&'static str> = phf_set! {
    "CER1", "CER2", "BGLC", "BGAL", "AGAL", "ANE5", "SGA", "GM1A",
};

/// Water residue names across common models.
static WATER_RESIDUES: phf::Set<&'static str> = phf_set! {
    "TIP3", "TIP4", "TP3M", "HOH", "WAT", "SPC", "SPCE",
};

/// Monovalent counter-ion species: residue name mapped to formal charge.
static ION_CHARGES: phf::Map<&'static str, i8> = phf_map! {
    "SOD" => 1,
    "POT" => 1,
    "CLA" => -1,
};

/// Coarse species classification of a residue, derived from its name.
///
/// The shell classifier and the structure editor select residues by class
/// rather than by free-form name matching, so the name tables live here in
/// one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResidueClass {
    /// Phospholipid (single-residue lipid with a phosphate head).
    Lipid,
    /// Sterol (cholesterol-like, single residue).
    Sterol,
    /// One unit of a multi-residue, covalently linked glycolipid.
    Glycolipid,
    /// Water molecule.
    Water,
    /// Monovalent counter-ion.
    Ion,
    /// Anything else (protein, unrecognized species).
    Other,
}

impl ResidueClass {
    /// Classifies a residue name against the static species tables.
    pub fn from_residue_name(name: &str) -> Self {
        let name = name.trim();
        if PHOSPHOLIPID_RESIDUES.contains(name) {
            ResidueClass::Lipid
        } else if STEROL_RESIDUES.contains(name) {
            ResidueClass::Sterol
        } else if GLYCOLIPID_RESIDUES.contains(name) {
            ResidueClass::Glycolipid
        } else if WATER_RESIDUES.contains(name) {
            ResidueClass::Water
        } else if ION_CHARGES.contains_key(name) {
            ResidueClass::Ion
        } else {
            ResidueClass::Other
        }
    }

    /// True for the lipid-class residues (phospholipids, sterols, and
    /// glycolipid units) that form the vesicle body.
    pub fn is_lipid_class(&self) -> bool {
        matches!(
            self,
            ResidueClass::Lipid | ResidueClass::Sterol | ResidueClass::Glycolipid
        )
    }
}

impl fmt::Display for ResidueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ResidueClass::Lipid => "Lipid",
                ResidueClass::Sterol => "Sterol",
                ResidueClass::Glycolipid => "Glycolipid",
                ResidueClass::Water => "Water",
                ResidueClass::Ion => "Ion",
                ResidueClass::Other => "Other",
            }
        )
    }
}

/// A monovalent counter-ion species, identified by its residue name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IonSpecies {
    Sodium,
    Potassium,
    Chloride,
}

impl IonSpecies {
    pub fn from_residue_name(name: &str) -> Option<Self> {
        match name.trim() {
            "SOD" => Some(IonSpecies::Sodium),
            "POT" => Some(IonSpecies::Potassium),
            "CLA" => Some(IonSpecies::Chloride),
            _ => None,
        }
    }

    /// The formal charge of the species in elementary charge units.
    pub fn formal_charge(&self) -> f64 {
        match self {
            IonSpecies::Sodium | IonSpecies::Potassium => 1.0,
            IonSpecies::Chloride => -1.0,
        }
    }

    pub fn is_cation(&self) -> bool {
        self.formal_charge() > 0.0
    }
}

impl fmt::Display for IonSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IonSpecies::Sodium => "SOD",
                IonSpecies::Potassium => "POT",
                IonSpecies::Chloride => "CLA",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source file
    pub name: String,                       // Name of the residue (e.g., "POPC", "TIP3")
    pub class: ResidueClass,                // Species classification derived from the name
    pub segment_id: SegmentId,              // ID of the parent segment
    pub(crate) atoms: Vec<AtomId>,          // IDs of atoms belonging to this residue
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(number: isize, name: &str, segment_id: SegmentId) -> Self {
        Self {
            number,
            name: name.to_string(),
            class: ResidueClass::from_residue_name(name),
            segment_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        self.atom_name_map.remove(atom_name);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_segment_id(n: u64) -> SegmentId {
        SegmentId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn classification_covers_all_species_tables() {
        assert_eq!(
            ResidueClass::from_residue_name("POPC"),
            ResidueClass::Lipid
        );
        assert_eq!(
            ResidueClass::from_residue_name("CHL1"),
            ResidueClass::Sterol
        );
        assert_eq!(
            ResidueClass::from_residue_name("BGAL"),
            ResidueClass::Glycolipid
        );
        assert_eq!(
            ResidueClass::from_residue_name("TIP3"),
            ResidueClass::Water
        );
        assert_eq!(ResidueClass::from_residue_name("SOD"), ResidueClass::Ion);
        assert_eq!(ResidueClass::from_residue_name("ALA"), ResidueClass::Other);
    }

    #[test]
    fn classification_trims_whitespace() {
        assert_eq!(
            ResidueClass::from_residue_name(" POPC "),
            ResidueClass::Lipid
        );
    }

    #[test]
    fn lipid_class_groups_vesicle_body_species() {
        assert!(ResidueClass::Lipid.is_lipid_class());
        assert!(ResidueClass::Sterol.is_lipid_class());
        assert!(ResidueClass::Glycolipid.is_lipid_class());
        assert!(!ResidueClass::Water.is_lipid_class());
        assert!(!ResidueClass::Ion.is_lipid_class());
    }

    #[test]
    fn ion_species_charges_are_signed_correctly() {
        assert_eq!(
            IonSpecies::from_residue_name("SOD"),
            Some(IonSpecies::Sodium)
        );
        assert_eq!(
            IonSpecies::from_residue_name("CLA"),
            Some(IonSpecies::Chloride)
        );
        assert_eq!(IonSpecies::from_residue_name("MG"), None);
        assert_eq!(IonSpecies::Sodium.formal_charge(), 1.0);
        assert_eq!(IonSpecies::Chloride.formal_charge(), -1.0);
        assert!(IonSpecies::Potassium.is_cation());
        assert!(!IonSpecies::Chloride.is_cation());
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let segment_id = dummy_segment_id(1);
        let residue = Residue::new(10, "TIP3", segment_id);
        assert_eq!(residue.number, 10);
        assert_eq!(residue.name, "TIP3");
        assert_eq!(residue.class, ResidueClass::Water);
        assert_eq!(residue.segment_id, segment_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("OH2").is_none());
    }

    #[test]
    fn add_atom_adds_atom_and_maps_name() {
        let mut residue = Residue::new(5, "POPC", dummy_segment_id(2));
        let atom_id = dummy_atom_id(42);
        residue.add_atom("P", atom_id);
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("P"), Some(atom_id));
    }

    #[test]
    fn remove_atom_removes_atom_and_name_mapping() {
        let mut residue = Residue::new(8, "TIP3", dummy_segment_id(4));
        let atom_id = dummy_atom_id(100);
        residue.add_atom("OH2", atom_id);
        residue.remove_atom("OH2", atom_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("OH2").is_none());
    }

    #[test]
    fn remove_atom_does_nothing_if_atom_not_present() {
        let mut residue = Residue::new(9, "CHL1", dummy_segment_id(5));
        let atom_id = dummy_atom_id(200);
        residue.add_atom("O3", atom_id);
        residue.remove_atom("C3", dummy_atom_id(201));
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("O3"), Some(atom_id));
    }
}
