//! geo.rs — Coordinate value type, the step-grid walker, and great-circle distance.
//!
//! The grid walker is a pure function of its inputs: same center/step/limit,
//! same sequence. Downstream aggregation is order-independent, but determinism
//! keeps tests reproducible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_MILES: f64 = 3_958.756;

/// (latitude, longitude) in double-precision degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid grid argument: {0}")]
    InvalidArgument(String),
}

/// Generate the `step_limit × step_limit` search grid around `center`.
///
/// Rows run south to north, cells west to east within a row. The longitude
/// step is widened by `1 / cos(row latitude)` so cells stay roughly square in
/// physical distance as longitude degrees shrink toward the poles.
pub fn grid(
    center: Coordinate,
    step_size: f64,
    step_limit: usize,
) -> Result<Vec<Coordinate>, GridError> {
    if !center.is_valid() {
        return Err(GridError::InvalidArgument(format!(
            "degenerate center ({}, {})",
            center.latitude, center.longitude
        )));
    }
    if !step_size.is_finite() || step_size <= 0.0 {
        return Err(GridError::InvalidArgument(format!(
            "step_size must be > 0, got {step_size}"
        )));
    }
    if step_limit == 0 {
        return Err(GridError::InvalidArgument(
            "step_limit must be >= 1".into(),
        ));
    }

    let half = step_limit as f64 / 2.0;
    let mut cells = Vec::with_capacity(step_limit * step_limit);
    for row in 0..step_limit {
        let lat = (center.latitude + (row as f64 - half + 0.5) * step_size).clamp(-90.0, 90.0);
        // Clamp away from the poles so the correction stays finite.
        let lon_step = step_size / lat.to_radians().cos().abs().max(1e-6);
        for col in 0..step_limit {
            let lon = wrap_longitude(center.longitude + (col as f64 - half + 0.5) * lon_step);
            cells.push(Coordinate::new(lat, lon));
        }
    }
    Ok(cells)
}

/// Wrap into [-180, 180]; rows near a pole can otherwise step past the
/// antimeridian once the cos correction blows the step up.
fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Haversine great-circle distance in miles. Spherical approximation; ordering
/// consistency is what matters for ranking, not ellipsoidal accuracy.
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let (phi1, phi2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dphi = (b.latitude - a.latitude).to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Float error can push h past 1.0 near antipodes; asin would return NaN.
    2.0 * EARTH_RADIUS_MILES * h.min(1.0).sqrt().asin()
}
