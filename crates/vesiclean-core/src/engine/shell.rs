use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::engine::error::EngineError;
use crate::engine::geometry::GeometryEstimate;
use crate::engine::predicate::Selection;
use std::collections::BTreeSet;
use tracing::debug;

/// A set of residue IDs, ordered for reproducible reporting.
pub type ResidueSet = BTreeSet<ResidueId>;

/// A spherical annulus defined by two offsets subtracted from the estimated
/// assembly radius.
///
/// `d_inner` and `d_outer` are distances inward from the surface; the
/// derived radii are `r_inner = radius - d_inner` and `r_outer = radius -
/// d_outer`. For a non-empty shell the caller supplies `d_inner < d_outer`
/// so that `r_outer < r_inner`; the membership test itself does not reorder
/// the offsets, and a reversed or equal pair classifies nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellSpec {
    pub d_inner: f64,
    pub d_outer: f64,
}

impl ShellSpec {
    pub fn new(d_inner: f64, d_outer: f64) -> Self {
        Self { d_inner, d_outer }
    }

    /// The midpoint offset used to partition the shell for reporting.
    pub fn midpoint_offset(&self) -> f64 {
        (self.d_outer - self.d_inner) / 2.0 + self.d_inner
    }
}

/// How a residue's position is judged against the shell.
///
/// The source pipeline is inconsistent about this across phases: solvent
/// phases admit a residue if any of its atoms lies in the shell, while the
/// lipid phase judges only the designated head atom. Both behaviors are
/// preserved explicitly; phases pick their mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipMode {
    /// Any atom matching the selection's atom filter decides membership.
    AnyAtom,
    /// Only the first atom matching the atom filter (the head atom) decides.
    HeadAtom,
}

/// Counts from partitioning a classified shell at its midpoint offset.
///
/// Reporting only; the split never changes what is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellSplit {
    /// Residues between the midpoint radius and the center.
    pub inner: usize,
    /// Residues between the midpoint radius and the shell's inner edge.
    pub outer: usize,
}

/// Classifies the residues matched by `selection` against the shell.
///
/// A residue is in-shell iff `r_outer² < |p - center|² < r_inner²` for its
/// deciding atom(s) per `mode`. Both comparisons are strict, so an equal
/// offset pair yields an empty set rather than an error.
///
/// # Errors
///
/// Returns [`EngineError::DegenerateShell`] if either derived radius is at
/// or below zero, which signals offsets exceeding the estimated radius.
pub fn classify_shell(
    system: &MolecularSystem,
    estimate: &GeometryEstimate,
    spec: &ShellSpec,
    selection: &Selection,
    mode: MembershipMode,
) -> Result<ResidueSet, EngineError> {
    let r_inner = estimate.radius - spec.d_inner;
    let r_outer = estimate.radius - spec.d_outer;
    if r_inner <= 0.0 || r_outer <= 0.0 {
        return Err(EngineError::DegenerateShell {
            d_inner: spec.d_inner,
            d_outer: spec.d_outer,
            radius: estimate.radius,
        });
    }

    let r_inner_sq = r_inner * r_inner;
    let r_outer_sq = r_outer * r_outer;
    let in_shell =
        |dist_sq: f64| dist_sq > r_outer_sq && dist_sq < r_inner_sq;

    let mut members = ResidueSet::new();
    for (residue_id, residue) in system.residues_iter() {
        if !selection.residue.matches(residue) {
            continue;
        }
        let mut is_member = false;
        for &atom_id in residue.atoms() {
            let atom = match system.atom(atom_id) {
                Some(a) => a,
                None => continue,
            };
            if !selection.atom.matches(atom) {
                continue;
            }
            let dist_sq = (atom.position - estimate.center).norm_squared();
            is_member = in_shell(dist_sq);
            if matches!(mode, MembershipMode::HeadAtom) || is_member {
                // HeadAtom: the first matching atom decides, full stop.
                break;
            }
        }
        if is_member {
            members.insert(residue_id);
        }
    }

    debug!(
        members = members.len(),
        d_inner = spec.d_inner,
        d_outer = spec.d_outer,
        radius = estimate.radius,
        "Classified shell membership"
    );
    Ok(members)
}

/// Partitions classified shell members into inner/outer halves at the
/// midpoint offset, using each residue's first selection-matched atom as
/// its representative position.
pub fn split_shell_counts(
    system: &MolecularSystem,
    estimate: &GeometryEstimate,
    spec: &ShellSpec,
    selection: &Selection,
    members: &ResidueSet,
) -> ShellSplit {
    let r_mid = estimate.radius - spec.midpoint_offset();
    let r_mid_sq = r_mid * r_mid;

    let mut split = ShellSplit::default();
    for &residue_id in members {
        let residue = match system.residue(residue_id) {
            Some(r) => r,
            None => continue,
        };
        let representative = residue.atoms().iter().find_map(|&atom_id| {
            system
                .atom(atom_id)
                .filter(|atom| selection.atom.matches(atom))
        });
        if let Some(atom) = representative {
            let dist_sq = (atom.position - estimate.center).norm_squared();
            if dist_sq < r_mid_sq {
                split.inner += 1;
            } else {
                split.outer += 1;
            }
        }
    }
    split
}
