//! Full orbit traces, for visualization sinks.

use nalgebra::Vector3;

use crate::{
    navigation::{kepler::perifocal_to_inertial, Keplerian},
    prelude::SV,
};

/// [OrbitTrace] is one full revolution of a satellite orbit sampled in
/// the inertial frame, intended for plotting sinks. It is built from the
/// *first* ephemeris received for the PRN only (known limitation: no
/// per-ToE slicing) and plays no role in the position solution.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitTrace {
    /// Satellite this trace describes.
    pub satellite: SV,

    /// ECI positions, in meters, swept along the full orbit.
    pub eci_m: Vec<Vector3<f64>>,
}

impl OrbitTrace {
    /// Sweeps the true anomaly over [0, 2π] in fixed steps and samples
    /// the conic radius `r = a(1 - e²) / (1 + e·cos f)` rotated into ECI.
    pub fn sample(satellite: SV, kepler: &Keplerian, step_rad: f64) -> Self {
        let mut eci_m = Vec::with_capacity((std::f64::consts::TAU / step_rad) as usize + 1);

        let semi_latus_m = kepler.sma_m * (1.0 - kepler.ecc.powi(2));

        let mut f_rad = 0.0;
        while f_rad < std::f64::consts::TAU {
            let r_m = semi_latus_m / (1.0 + kepler.ecc * f_rad.cos());
            let pqw_m = Vector3::new(r_m * f_rad.cos(), r_m * f_rad.sin(), 0.0);
            eci_m.push(perifocal_to_inertial(&pqw_m, kepler));
            f_rad += step_rad;
        }

        Self { satellite, eci_m }
    }
}
