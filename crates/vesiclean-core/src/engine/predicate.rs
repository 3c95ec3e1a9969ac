use crate::core::models::atom::Atom;
use crate::core::models::residue::{Residue, ResidueClass};

/// A filter over residues, composed from primitive field comparisons.
///
/// The source system expressed selections as free-form strings evaluated by
/// an external scripting tool; here they are explicit values that can be
/// unit-tested without any engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResidueFilter {
    /// Residue species class is one of the listed classes.
    ClassIn(&'static [ResidueClass]),
    /// Residue name equals one of the listed names.
    NameIn(&'static [&'static str]),
    /// Matches every residue.
    Any,
}

impl ResidueFilter {
    pub fn matches(&self, residue: &Residue) -> bool {
        match self {
            ResidueFilter::ClassIn(classes) => classes.contains(&residue.class),
            ResidueFilter::NameIn(names) => names.contains(&residue.name.as_str()),
            ResidueFilter::Any => true,
        }
    }
}

/// A filter over atoms within an already-matched residue.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomFilter {
    /// Atom name equals one of the listed names.
    NameIn(&'static [&'static str]),
    /// Matches every atom.
    Any,
}

impl AtomFilter {
    pub fn matches(&self, atom: &Atom) -> bool {
        match self {
            AtomFilter::NameIn(names) => names.contains(&atom.name.as_str()),
            AtomFilter::Any => true,
        }
    }
}

/// A combined residue/atom selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub residue: ResidueFilter,
    pub atom: AtomFilter,
}

const LIPID_CLASSES: &[ResidueClass] = &[
    ResidueClass::Lipid,
    ResidueClass::Sterol,
    ResidueClass::Glycolipid,
];
const SOLVENT_CLASSES: &[ResidueClass] = &[ResidueClass::Water, ResidueClass::Ion];
const PHOSPHOLIPID_CLASS: &[ResidueClass] = &[ResidueClass::Lipid];
const STEROL_CLASS: &[ResidueClass] = &[ResidueClass::Sterol];
const GLYCOLIPID_CLASS: &[ResidueClass] = &[ResidueClass::Glycolipid];
const WATER_CLASS: &[ResidueClass] = &[ResidueClass::Water];

impl Selection {
    pub fn new(residue: ResidueFilter, atom: AtomFilter) -> Self {
        Self { residue, atom }
    }

    pub fn matches(&self, atom: &Atom, residue: &Residue) -> bool {
        self.residue.matches(residue) && self.atom.matches(atom)
    }

    /// All atoms of lipid-class residues: the reference subset for the
    /// assembly geometry estimate.
    pub fn lipid_reference() -> Self {
        Self::new(ResidueFilter::ClassIn(LIPID_CLASSES), AtomFilter::Any)
    }

    /// The designated head atom of each lipid: the phosphate of a
    /// phospholipid. Used as a positional proxy for the whole residue.
    pub fn phospholipid_heads() -> Self {
        Self::new(
            ResidueFilter::ClassIn(PHOSPHOLIPID_CLASS),
            AtomFilter::NameIn(&["P"]),
        )
    }

    /// The designated oxygen of a sterol, the head-atom proxy for
    /// cholesterol-like residues.
    pub fn sterol_heads() -> Self {
        Self::new(
            ResidueFilter::ClassIn(STEROL_CLASS),
            AtomFilter::NameIn(&["O3"]),
        )
    }

    /// The anomeric-carbon marker atom of a glycolipid unit. One marker per
    /// unit; matched units are expanded to their full bonded fragment before
    /// removal.
    pub fn glycolipid_markers() -> Self {
        Self::new(
            ResidueFilter::ClassIn(GLYCOLIPID_CLASS),
            AtomFilter::NameIn(&["C1"]),
        )
    }

    /// Water-class residues and monovalent ion species, every atom.
    pub fn solvent() -> Self {
        Self::new(ResidueFilter::ClassIn(SOLVENT_CLASSES), AtomFilter::Any)
    }

    /// Water-class residues only.
    pub fn water() -> Self {
        Self::new(ResidueFilter::ClassIn(WATER_CLASS), AtomFilter::Any)
    }
}
