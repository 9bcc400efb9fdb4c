//! Engine configuration.

#[cfg(feature = "serde")]
use serde::Deserialize;

fn default_ephemeris_history() -> usize {
    4096
}

fn default_max_epochs() -> usize {
    100_000
}

fn default_solver_iterations() -> usize {
    10
}

fn default_kepler_iterations() -> usize {
    10
}

fn default_kepler_tolerance() -> f64 {
    1.0E-12
}

fn default_orbit_step() -> f64 {
    0.01
}

fn default_pivot_threshold() -> f64 {
    1.0E-18
}

/// [Config] gathers all tuning knobs of the positioning engine.
/// [Config::default] reproduces the legacy algorithm exactly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Maximal number of [crate::navigation::Ephemeris] retained per PRN.
    /// Past this point new frames are dropped (counted, non fatal).
    #[cfg_attr(feature = "serde", serde(default = "default_ephemeris_history"))]
    pub max_ephemeris_history: usize,

    /// Maximal number of observation records retained per PRN,
    /// and maximal size of the unique epoch list consumed by the solver
    /// (earliest epochs win past that point).
    #[cfg_attr(feature = "serde", serde(default = "default_max_epochs"))]
    pub max_epochs: usize,

    /// Gauss-Newton iteration budget per epoch. The solver runs this
    /// many iterations unconditionally: there is no convergence test.
    #[cfg_attr(feature = "serde", serde(default = "default_solver_iterations"))]
    pub solver_iterations: usize,

    /// Maximal number of Newton-Raphson iterations of the Kepler solver.
    #[cfg_attr(feature = "serde", serde(default = "default_kepler_iterations"))]
    pub kepler_max_iterations: usize,

    /// Kepler solver convergence criterion, in radians.
    #[cfg_attr(feature = "serde", serde(default = "default_kepler_tolerance"))]
    pub kepler_tolerance_rad: f64,

    /// True anomaly step of the orbit trace sampler, in radians.
    #[cfg_attr(feature = "serde", serde(default = "default_orbit_step"))]
    pub orbit_sampling_step_rad: f64,

    /// Pivots at or below this magnitude flag the 4x4 normal equation
    /// matrix as singular and skip the epoch.
    #[cfg_attr(feature = "serde", serde(default = "default_pivot_threshold"))]
    pub pivot_threshold: f64,

    /// When enabled, ephemerides declaring an unhealthy satellite are
    /// ignored by the series builder. Disabled by default: the legacy
    /// algorithm navigates on every decoded frame.
    #[cfg_attr(feature = "serde", serde(default))]
    pub require_healthy_satellites: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_ephemeris_history: default_ephemeris_history(),
            max_epochs: default_max_epochs(),
            solver_iterations: default_solver_iterations(),
            kepler_max_iterations: default_kepler_iterations(),
            kepler_tolerance_rad: default_kepler_tolerance(),
            orbit_sampling_step_rad: default_orbit_step(),
            pivot_threshold: default_pivot_threshold(),
            require_healthy_satellites: false,
        }
    }
}

impl Config {
    /// Copies and returns [Config] with updated solver iteration budget.
    pub fn with_solver_iterations(&self, solver_iterations: usize) -> Self {
        let mut s = self.clone();
        s.solver_iterations = solver_iterations;
        s
    }

    /// Copies and returns [Config] with updated observation capacity.
    pub fn with_max_epochs(&self, max_epochs: usize) -> Self {
        let mut s = self.clone();
        s.max_epochs = max_epochs;
        s
    }

    /// Copies and returns [Config] that rejects unhealthy satellites
    /// at series construction.
    pub fn with_healthy_satellites_only(&self) -> Self {
        let mut s = self.clone();
        s.require_healthy_satellites = true;
        s
    }
}
