/// Mesh distance: root-mean-square nodal displacement between two point sets.

use thiserror::Error;

pub type Point3 = [f64; 3];

/// The two point sets do not have the same number of nodes.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("reference has {reference} points, simulated has {simulated}")]
pub struct ShapeMismatch {
    pub reference: usize,
    pub simulated: usize,
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn dist2(a: &Point3, b: &Point3) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// RMSE = sqrt(1/n · Σ ‖ref_i − sim_i‖²). Points correspond by index.
/// Two empty sets are at distance 0.
pub fn rmse(reference: &[Point3], simulated: &[Point3]) -> Result<f64, ShapeMismatch> {
    if reference.len() != simulated.len() {
        return Err(ShapeMismatch { reference: reference.len(), simulated: simulated.len() });
    }
    if reference.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = reference.iter().zip(simulated).map(|(a, b)| dist2(a, b)).sum();
    Ok((sum / reference.len() as f64).sqrt())
}
