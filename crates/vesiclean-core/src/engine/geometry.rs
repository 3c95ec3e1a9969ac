use crate::core::models::system::MolecularSystem;
use crate::engine::error::EngineError;
use crate::engine::predicate::Selection;
use nalgebra::Point3;
use tracing::debug;

/// A coarse spherical approximation of the assembly: geometric center and a
/// single scalar radius.
///
/// The radius is the mean of the three axis-aligned bounding-box extents of
/// the reference atom subset, halved. It is intentionally tolerant of
/// non-perfect sphericity and is recomputed independently in every phase
/// that needs it, so structural drift between phases is reflected
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryEstimate {
    pub center: Point3<f64>,
    pub radius: f64,
}

/// Estimates the assembly center and radius from the atoms matched by
/// `selection`.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] if no atom matches, which
/// signals a topology/species-table mismatch upstream.
pub fn estimate_assembly(
    system: &MolecularSystem,
    selection: &Selection,
) -> Result<GeometryEstimate, EngineError> {
    let mut count = 0usize;
    let mut sum = Point3::origin().coords;
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

    for (_, atom) in system.atoms_iter() {
        let residue = match system.residue(atom.residue_id) {
            Some(r) => r,
            None => continue,
        };
        if !selection.matches(atom, residue) {
            continue;
        }
        count += 1;
        sum += atom.position.coords;
        min = min.inf(&atom.position);
        max = max.sup(&atom.position);
    }

    if count == 0 {
        return Err(EngineError::EmptySelection {
            context: "assembly geometry estimate",
        });
    }

    let center = Point3::from(sum / count as f64);
    let extents = max - min;
    let radius = (extents.x + extents.y + extents.z) / 3.0 / 2.0;

    debug!(
        atoms = count,
        center = ?center,
        radius,
        "Estimated assembly geometry"
    );

    Ok(GeometryEstimate { center, radius })
}
