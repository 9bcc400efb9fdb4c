//! Iterative least squares resolution of receiver position and clock
//! bias, one epoch at a time.

mod matrix;

use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

use hifitime::{Epoch, TimeScale};
use nalgebra::{DVector, Matrix4, MatrixXx4, Vector3, Vector4};

use crate::{
    cfg::Config,
    constants::time_of_week_seconds,
    coords::GeodeticCoords,
    solver::matrix::try_invert_4x4,
};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolverError {
    /// Position resolution requires at least 4 satellites in sight.
    #[error("not enough satellites: {0} in sight")]
    NotEnoughSatellites(usize),

    /// The 4x4 normal equation matrix is ill conditioned: no solution
    /// is emitted for this epoch.
    #[error("singular geometry matrix")]
    SingularGeometry,
}

/// Receiver solution for one observation epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochSolution {
    /// Observation time, as decoded (milliseconds of week).
    pub tow_ms: f64,

    /// Receiver ECEF position, in meters.
    pub ecef_m: Vector3<f64>,

    /// Receiver clock bias, expressed as a range (c·δt), in meters.
    pub clock_bias_m: f64,

    /// Receiver position in geodetic (WGS-84) coordinates.
    pub geodetic: GeodeticCoords,

    /// Number of satellites that contributed.
    pub n_satellites: usize,

    /// Geometric dilution of precision.
    pub gdop: f64,

    /// Position dilution of precision.
    pub pdop: f64,

    /// Time dilution of precision.
    pub tdop: f64,
}

impl EpochSolution {
    /// Expresses the observation time as a GPST [Epoch], given the GPS
    /// week this run belongs to.
    pub fn epoch_gpst(&self, week: u32) -> Epoch {
        let tow_s = time_of_week_seconds(self.tow_ms);
        let nanos = (tow_s * 1.0E9).round() as u64;
        Epoch::from_time_of_week(week, nanos, TimeScale::GPST)
    }
}

/// Collects the globally unique, ascending epoch list from every
/// observation timestamp of the run. Zero timestamps mark absent
/// records and are excluded. Past `cap` entries, the earliest epochs
/// win.
pub fn unique_epochs<I: IntoIterator<Item = f64>>(tows: I, cap: usize) -> Vec<f64> {
    let mut epochs: Vec<f64> = tows
        .into_iter()
        .filter(|tow| *tow != 0.0)
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .collect();

    if epochs.len() > cap {
        debug!("unique epochs capped at {} (earliest win)", cap);
        epochs.truncate(cap);
    }

    epochs
}

/// [NavigationSolver] runs the Gauss-Newton resolution of receiver
/// position and clock bias, from a cold `(0, 0, 0, 0)` start, with a
/// fixed iteration budget and no convergence test (a deliberate
/// simplification of the reference algorithm).
#[derive(Debug, Clone, Copy)]
pub struct NavigationSolver {
    iterations: usize,
    pivot_threshold: f64,
}

impl NavigationSolver {
    /// Builds a [NavigationSolver] from provided [Config].
    pub fn new(cfg: &Config) -> Self {
        Self {
            iterations: cfg.solver_iterations,
            pivot_threshold: cfg.pivot_threshold,
        }
    }

    /// Resolves one epoch from gathered satellite positions and
    /// pseudoranges.
    ///
    /// ## Input
    /// - tow_ms: observation time, as decoded
    /// - sat_ecef_m: satellite ECEF positions, in meters
    /// - pseudoranges_m: matching pseudoranges, in meters
    ///
    /// ## Output
    /// - [EpochSolution] carrying ECEF, geodetic conversion and DOPs.
    pub fn resolve(
        &self,
        tow_ms: f64,
        sat_ecef_m: &[Vector3<f64>],
        pseudoranges_m: &[f64],
    ) -> Result<EpochSolution, SolverError> {
        let m = sat_ecef_m.len();

        if m < 4 {
            return Err(SolverError::NotEnoughSatellites(m));
        }

        let mut pos_m = Vector3::<f64>::zeros();
        let mut clock_bias_m = 0.0;
        let mut q = Matrix4::<f64>::zeros();

        for iteration in 0..self.iterations {
            let mut g = MatrixXx4::<f64>::zeros(m);
            let mut y = DVector::<f64>::zeros(m);

            for (i, sat) in sat_ecef_m.iter().enumerate() {
                let delta = sat - pos_m;
                let range_m = delta.norm();
                let unit = delta / range_m;

                g[(i, 0)] = -unit[0];
                g[(i, 1)] = -unit[1];
                g[(i, 2)] = -unit[2];
                g[(i, 3)] = 1.0;

                y[i] = pseudoranges_m[i] - range_m - clock_bias_m;
            }

            // normal equations, solved through a dense 4x4 inverse
            let gt = g.transpose();
            let gtg: Matrix4<f64> = &gt * &g;
            let gty: Vector4<f64> = &gt * &y;

            q = try_invert_4x4(&gtg, self.pivot_threshold)
                .ok_or(SolverError::SingularGeometry)?;

            let delta: Vector4<f64> = q * gty;

            if !(delta[0].is_finite()
                && delta[1].is_finite()
                && delta[2].is_finite()
                && delta[3].is_finite())
            {
                return Err(SolverError::SingularGeometry);
            }

            pos_m += Vector3::new(delta[0], delta[1], delta[2]);
            clock_bias_m += delta[3];

            trace!(
                "t={}ms iter={} |delta|={:.6}m",
                tow_ms,
                iteration,
                delta.norm()
            );
        }

        let gdop = (q[(0, 0)] + q[(1, 1)] + q[(2, 2)] + q[(3, 3)]).sqrt();
        let pdop = (q[(0, 0)] + q[(1, 1)] + q[(2, 2)]).sqrt();
        let tdop = q[(3, 3)].sqrt();

        let geodetic = GeodeticCoords::from_ecef(&pos_m);

        debug!(
            "t={}ms: ({:.3}, {:.3}, {:.3})m {} satellites pdop={:.3}",
            tow_ms, pos_m[0], pos_m[1], pos_m[2], m, pdop
        );

        Ok(EpochSolution {
            tow_ms,
            ecef_m: pos_m,
            clock_bias_m,
            geodetic,
            n_satellites: m,
            gdop,
            pdop,
            tdop,
        })
    }
}
