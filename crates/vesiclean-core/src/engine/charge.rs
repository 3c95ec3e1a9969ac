use crate::core::models::residue::{IonSpecies, ResidueClass};
use crate::core::models::system::MolecularSystem;
use crate::engine::error::EngineError;
use crate::engine::shell::ResidueSet;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// A breakdown of the system's partial charge, excluding water.
///
/// Water models are individually neutral; excluding them keeps the sums
/// readable without changing the net.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeState {
    /// Summed partial charge of all lipid-class residues.
    pub lipid_charge: f64,
    /// Summed partial charge per ion species present.
    pub ion_charge_by_species: BTreeMap<IonSpecies, f64>,
    /// Net partial charge over all non-water residues.
    pub net_charge: f64,
}

impl ChargeState {
    /// The number of monovalent ions whose removal neutralizes the net
    /// charge, with the species sign that must be removed.
    ///
    /// A positive net needs cations removed; a non-positive net needs
    /// anions removed. A net that rounds to zero needs nothing.
    pub fn ions_to_remove(&self) -> (usize, bool) {
        let needed = self.net_charge.round().abs() as usize;
        let remove_cations = self.net_charge > 0.0;
        (needed, remove_cations)
    }
}

/// Sums partial charges over every non-water residue, grouped for reporting.
pub fn assess_charge(system: &MolecularSystem) -> ChargeState {
    let mut lipid_charge = 0.0;
    let mut ion_charge_by_species: BTreeMap<IonSpecies, f64> = BTreeMap::new();
    let mut net_charge = 0.0;

    for (_, residue) in system.residues_iter() {
        if residue.class == ResidueClass::Water {
            continue;
        }
        let residue_charge: f64 = residue
            .atoms()
            .iter()
            .filter_map(|&id| system.atom(id))
            .map(|atom| atom.partial_charge)
            .sum();
        net_charge += residue_charge;

        if residue.class.is_lipid_class() {
            lipid_charge += residue_charge;
        } else if let Some(species) = IonSpecies::from_residue_name(&residue.name) {
            *ion_charge_by_species.entry(species).or_insert(0.0) += residue_charge;
        }
    }

    debug!(
        lipid_charge,
        net_charge,
        species = ion_charge_by_species.len(),
        "Assessed system charge"
    );
    ChargeState {
        lipid_charge,
        ion_charge_by_species,
        net_charge,
    }
}

/// Picks the ion residues whose removal neutralizes the assessed charge.
///
/// Exactly `round(|net|)` ions of the compensating sign are drawn, without
/// replacement, from the most abundant matching species. The candidate list
/// is sorted by residue ID before sampling, so a seeded RNG reproduces the
/// same pick across runs regardless of map iteration order.
///
/// # Errors
///
/// Returns [`EngineError::InsufficientIons`] when fewer matching ions exist
/// than must be removed.
pub fn select_counter_ions(
    system: &MolecularSystem,
    state: &ChargeState,
    rng: &mut impl Rng,
) -> Result<ResidueSet, EngineError> {
    let (needed, remove_cations) = state.ions_to_remove();
    if needed == 0 {
        return Ok(ResidueSet::new());
    }

    // Group candidates of the compensating sign by species.
    let mut by_species: BTreeMap<IonSpecies, Vec<_>> = BTreeMap::new();
    for (residue_id, residue) in system.residues_iter() {
        if let Some(species) = IonSpecies::from_residue_name(&residue.name) {
            if species.is_cation() == remove_cations {
                by_species.entry(species).or_default().push(residue_id);
            }
        }
    }

    // Neutralize with a single salt species, the most abundant one, so the
    // removal is attributable in the report.
    let fallback = if remove_cations {
        IonSpecies::Sodium
    } else {
        IonSpecies::Chloride
    };
    let (species, mut candidates) = by_species
        .into_iter()
        .max_by_key(|(_, ids)| ids.len())
        .unwrap_or((fallback, Vec::new()));

    if candidates.len() < needed {
        return Err(EngineError::InsufficientIons {
            needed,
            available: candidates.len(),
            species,
        });
    }

    candidates.sort_unstable();
    let picked: ResidueSet = rand::seq::index::sample(rng, candidates.len(), needed)
        .into_iter()
        .map(|i| candidates[i])
        .collect();

    info!(
        needed,
        %species,
        net_charge = state.net_charge,
        "Selected counter-ions for removal"
    );
    Ok(picked)
}
