use super::ids::ResidueId;

/// A named segment as carried by PSF topology files (e.g., "MEMB", "TIP3",
/// "ION"). Segments group residues; vesicle systems have no chain concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,                    // Segment identifier from the topology file
    pub(crate) residues: Vec<ResidueId>, // Ordered list of residue IDs belonging to this segment
}

impl Segment {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[ResidueId] {
        &self.residues
    }
}
