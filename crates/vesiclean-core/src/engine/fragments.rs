use crate::core::models::system::MolecularSystem;
use crate::engine::shell::ResidueSet;
use phf::phf_map;
use std::str::FromStr;
use tracing::debug;

/// How a seed residue is expanded to the covalent unit it belongs to.
///
/// Multi-residue lipids (glycolipids, gangliosides) must be removed whole;
/// deleting only the residue whose marker atom fell in the shell would leave
/// dangling sugar residues behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentStrategy {
    /// Walk the bond graph: a seed pulls in every residue in its bonded
    /// connected component. Exact for any topology.
    #[default]
    Connectivity,
    /// Look up fixed residue-number offsets per species name. Matches the
    /// fixed unit layouts produced by common membrane builders and works
    /// without bond records, but misses nonstandard layouts.
    OffsetTable,
}

impl FromStr for FragmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connectivity" => Ok(FragmentStrategy::Connectivity),
            "offset-table" => Ok(FragmentStrategy::OffsetTable),
            other => Err(format!(
                "unknown fragment strategy '{other}' (expected connectivity or offset-table)"
            )),
        }
    }
}

/// Relative residue numbers (same segment) that complete a unit, keyed by
/// the marker residue's name. Names absent from the table expand to the
/// seed alone.
static UNIT_OFFSETS: phf::Map<&'static str, &'static [isize]> = phf_map! {
    // Ceramide backbones reach forward over the sugars they carry. Longer
    // chains are still caught whole: their sugar markers reach back.
    "CER1" => &[0, 1, 2],
    "CER2" => &[0, 1, 2],
    // Sugar units: the ceramide precedes the first sugar.
    "BGLC" => &[-1, 0],
    "BGAL" => &[-2, -1, 0],
    "AGAL" => &[-3, -2, -1, 0],
    "ANE5" => &[-4, -3, -2, -1, 0],
    "SGA" => &[-2, -1, 0],
    "GM1A" => &[-6, -5, -4, -3, -2, -1, 0],
};

/// Expands a set of seed residues to complete covalent units.
///
/// The result is always a superset of `seeds`; expansion never drops a
/// seed, and a seed with no discoverable unit partners passes through
/// unchanged. Idempotent under [`FragmentStrategy::Connectivity`]: the
/// expansion of an expansion adds nothing.
pub fn expand_fragments(
    system: &MolecularSystem,
    seeds: &ResidueSet,
    strategy: FragmentStrategy,
) -> ResidueSet {
    let mut expanded = seeds.clone();

    match strategy {
        FragmentStrategy::Connectivity => {
            let fragments = system.residue_fragments();
            let seed_fragments: std::collections::BTreeSet<usize> = seeds
                .iter()
                .filter_map(|&id| fragments.get(id).copied())
                .collect();
            for (residue_id, _) in system.residues_iter() {
                if let Some(fragment) = fragments.get(residue_id) {
                    if seed_fragments.contains(fragment) {
                        expanded.insert(residue_id);
                    }
                }
            }
        }
        FragmentStrategy::OffsetTable => {
            for &seed_id in seeds {
                let seed = match system.residue(seed_id) {
                    Some(r) => r,
                    None => continue,
                };
                let offsets = UNIT_OFFSETS
                    .get(seed.name.as_str())
                    .copied()
                    .unwrap_or(&[0]);
                for &offset in offsets {
                    if let Some(partner) =
                        system.find_residue_by_number(seed.segment_id, seed.number + offset)
                    {
                        expanded.insert(partner);
                    }
                }
            }
        }
    }

    debug!(
        seeds = seeds.len(),
        expanded = expanded.len(),
        ?strategy,
        "Expanded seed residues to covalent units"
    );
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::ids::ResidueId;
    use nalgebra::Point3;

    /// Builds a segment holding one three-residue bonded unit (ceramide
    /// plus two sugars at consecutive numbers) and one lone water.
    fn glycolipid_system() -> (MolecularSystem, Vec<ResidueId>, ResidueId) {
        let mut system = MolecularSystem::new();
        let seg = system.add_segment("GLYC");

        let mut unit = Vec::new();
        let mut prev_atom = None;
        for (number, name) in [(1, "CER1"), (2, "BGLC"), (3, "BGAL")] {
            let res = system.add_residue(seg, number, name).unwrap();
            let atom_id = system
                .add_atom_to_residue(res, Atom::new("C1", res, Point3::origin()))
                .unwrap();
            if let Some(prev) = prev_atom {
                system.add_bond(prev, atom_id).unwrap();
            }
            prev_atom = Some(atom_id);
            unit.push(res);
        }

        let solv = system.add_segment("SOLV");
        let water = system.add_residue(solv, 1, "TIP3").unwrap();
        system
            .add_atom_to_residue(water, Atom::new("OH2", water, Point3::origin()))
            .unwrap();

        (system, unit, water)
    }

    #[test]
    fn connectivity_expands_a_seed_to_its_whole_unit() {
        let (system, unit, water) = glycolipid_system();
        let seeds: ResidueSet = [unit[1]].into_iter().collect();

        let expanded = expand_fragments(&system, &seeds, FragmentStrategy::Connectivity);

        assert_eq!(expanded.len(), 3);
        for &res in &unit {
            assert!(expanded.contains(&res));
        }
        assert!(!expanded.contains(&water));
    }

    #[test]
    fn expansion_is_a_superset_of_the_seeds() {
        let (system, unit, water) = glycolipid_system();
        let seeds: ResidueSet = [unit[0], water].into_iter().collect();

        for strategy in [FragmentStrategy::Connectivity, FragmentStrategy::OffsetTable] {
            let expanded = expand_fragments(&system, &seeds, strategy);
            assert!(seeds.is_subset(&expanded), "{strategy:?} dropped a seed");
        }
    }

    #[test]
    fn connectivity_expansion_is_idempotent() {
        let (system, unit, _) = glycolipid_system();
        let seeds: ResidueSet = [unit[2]].into_iter().collect();

        let once = expand_fragments(&system, &seeds, FragmentStrategy::Connectivity);
        let twice = expand_fragments(&system, &once, FragmentStrategy::Connectivity);
        assert_eq!(once, twice);
    }

    #[test]
    fn offset_table_reaches_the_ceramide_without_bond_records() {
        // Same layout, but no bonds at all.
        let mut system = MolecularSystem::new();
        let seg = system.add_segment("GLYC");
        let mut ids = Vec::new();
        for (number, name) in [(1, "CER1"), (2, "BGLC"), (3, "BGAL")] {
            let res = system.add_residue(seg, number, name).unwrap();
            system
                .add_atom_to_residue(res, Atom::new("C1", res, Point3::origin()))
                .unwrap();
            ids.push(res);
        }

        let seeds: ResidueSet = [ids[2]].into_iter().collect();
        let expanded = expand_fragments(&system, &seeds, FragmentStrategy::OffsetTable);

        // BGAL's offsets reach back over BGLC and the ceramide.
        assert_eq!(expanded.len(), 3);
    }

    #[test]
    fn offset_table_reaches_the_sugars_from_a_ceramide_seed() {
        let (system, unit, water) = glycolipid_system();
        let seeds: ResidueSet = [unit[0]].into_iter().collect();

        let expanded = expand_fragments(&system, &seeds, FragmentStrategy::OffsetTable);

        // The ceramide pulls in both bonded sugars, nothing else.
        assert_eq!(expanded.len(), 3);
        for &res in &unit {
            assert!(expanded.contains(&res));
        }
        assert!(!expanded.contains(&water));
    }

    #[test]
    fn unknown_names_expand_to_the_seed_alone() {
        let (system, _unit, water) = glycolipid_system();
        let seeds: ResidueSet = [water].into_iter().collect();

        let expanded = expand_fragments(&system, &seeds, FragmentStrategy::OffsetTable);
        assert_eq!(expanded, seeds);
    }
}
