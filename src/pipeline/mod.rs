//! End to end positioning pipeline.
//!
//! One run is a straight sequence of synchronous stages,
//! `READ → SORT → PROPAGATE → SOLVE → EMIT`, each producing a frozen
//! value the next stage consumes read-only. Recoverable conditions are
//! counted in [Summary] and never abort; fatal conditions (mixed
//! observation stream, unreadable input) return a typed [Error]
//! immediately and no partial output is produced.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Vector3;

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

use crate::{
    cfg::Config,
    navigation::{KeplerSolver, OrbitTrace, SatelliteState},
    rtcm::Message,
    series::SeriesSet,
    solver::{unique_epochs, EpochSolution, NavigationSolver, SolverError},
    storage::{History, StoreOutcome},
    Error,
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Read,
    Sort,
    Propagate,
    Solve,
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Read => write!(f, "READ"),
            Self::Sort => write!(f, "SORT"),
            Self::Propagate => write!(f, "PROPAGATE"),
            Self::Solve => write!(f, "SOLVE"),
            Self::Emit => write!(f, "EMIT"),
        }
    }
}

/// Recoverable condition counters, surfaced once per run at EMIT.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Input lines consumed.
    pub lines: usize,

    /// Ephemeris frames stored.
    pub ephemerides: usize,

    /// Observation messages stored.
    pub observations: usize,

    /// Messages of unsupported types, skipped.
    pub skipped_messages: usize,

    /// Lines that looked like messages but could not be decoded.
    pub malformed_lines: usize,

    /// Records dropped because a PRN history was full.
    pub capacity_drops: usize,

    /// Observations left without a qualifying ephemeris.
    pub missing_ephemerides: usize,

    /// Orbital samples rejected on a non finite intermediate.
    pub numerical_rejections: usize,

    /// Epochs skipped on an ill conditioned geometry matrix.
    pub singular_epochs: usize,

    /// Epochs skipped with fewer than 4 satellites in sight.
    pub underdetermined_epochs: usize,

    /// Epochs a receiver solution was produced for.
    pub solved_epochs: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} lines ({} eph, {} obs, {} skipped, {} malformed), \
             {} capacity drops, {} missing eph, {} numeric rejections, \
             {} singular epochs, {} underdetermined epochs, {} solved",
            self.lines,
            self.ephemerides,
            self.observations,
            self.skipped_messages,
            self.malformed_lines,
            self.capacity_drops,
            self.missing_ephemerides,
            self.numerical_rejections,
            self.singular_epochs,
            self.underdetermined_epochs,
            self.solved_epochs,
        )
    }
}

/// Frozen outputs of one pipeline run, ready for external serializers
/// (gnuplot, KML, ... sinks are not part of this crate).
#[derive(Debug, Clone)]
pub struct Results {
    /// Unique observation epochs, ascending, as decoded (ms of week).
    pub epochs: Vec<f64>,

    /// Receiver solution per epoch index. `None` marks an epoch that
    /// was skipped (underdetermined or singular geometry).
    pub solutions: Vec<Option<EpochSolution>>,

    /// Satellite states per PRN (slot 0 unused), parallel to the PRN's
    /// observation series. `None` marks samples without an ephemeris or
    /// rejected on numerics.
    pub satellites: Vec<Vec<Option<SatelliteState>>>,

    /// One full orbit trace per PRN that broadcast at least one
    /// ephemeris (from its first frame only).
    pub orbits: Vec<OrbitTrace>,

    /// Recoverable condition counters.
    pub summary: Summary,
}

impl Results {
    /// Iterates solved epochs only: `(epoch index, solution)`.
    pub fn receiver_solutions(&self) -> impl Iterator<Item = (usize, &EpochSolution)> {
        self.solutions
            .iter()
            .enumerate()
            .filter_map(|(index, sol)| sol.as_ref().map(|sol| (index, sol)))
    }

    /// Satellite states of desired PRN, parallel to its observations.
    pub fn satellite_states(&self, prn: u8) -> &[Option<SatelliteState>] {
        &self.satellites[prn as usize]
    }

    /// Orbit trace of desired PRN, when it broadcast an ephemeris.
    pub fn orbit_trace(&self, prn: u8) -> Option<&OrbitTrace> {
        self.orbits
            .iter()
            .find(|trace| trace.satellite.prn == prn)
    }
}

/// [Pipeline] drives one input stream through the positioning stages.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    cfg: Config,
}

impl Pipeline {
    /// Builds a [Pipeline] with desired [Config].
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Runs the whole pipeline over a readable stream of pre-parsed
    /// message lines.
    pub fn run<R: BufRead>(&self, reader: R) -> Result<Results, Error> {
        let mut summary = Summary::default();

        // READ: accumulate decoded records per PRN
        debug!("stage: {}", Stage::Read);
        let history = self.read(reader, &mut summary)?;

        // SORT: align observations with their best fit ephemeris
        debug!("stage: {}", Stage::Sort);
        let series = SeriesSet::build(&history, &self.cfg);
        summary.missing_ephemerides = series.missing_ephemerides;

        // PROPAGATE: satellite states and orbit traces
        debug!("stage: {}", Stage::Propagate);
        let (satellites, orbits) = self.propagate(&series, &mut summary);

        // SOLVE: one receiver solution per epoch
        debug!("stage: {}", Stage::Solve);
        let (epochs, solutions) = self.solve(&series, &satellites, &mut summary);

        // EMIT
        debug!("stage: {}", Stage::Emit);
        info!("pipeline summary: {}", summary);

        Ok(Results {
            epochs,
            solutions,
            satellites,
            orbits,
            summary,
        })
    }

    /// Runs the pipeline over a plain text log file.
    pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<Results, Error> {
        let reader = BufReader::new(File::open(path)?);
        self.run(reader)
    }

    /// Runs the pipeline over a gzip compressed log file.
    #[cfg(feature = "flate2")]
    #[cfg_attr(docrs, doc(cfg(feature = "flate2")))]
    pub fn from_gzip_file<P: AsRef<Path>>(&self, path: P) -> Result<Results, Error> {
        let reader = BufReader::new(GzDecoder::new(File::open(path)?));
        self.run(reader)
    }

    fn read<R: BufRead>(&self, reader: R, summary: &mut Summary) -> Result<History, Error> {
        let mut history = History::new(&self.cfg);

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            summary.lines += 1;

            let message = match Message::decode(trimmed) {
                Ok(Some(message)) => message,
                Ok(None) => {
                    summary.skipped_messages += 1;
                    continue;
                },
                Err(error) => {
                    warn!("line {}: {}", summary.lines, error);
                    summary.malformed_lines += 1;
                    continue;
                },
            };

            match message {
                Message::Ephemeris(eph) => {
                    summary.ephemerides += 1;
                    if let StoreOutcome::CapacityExceeded(dropped) = history.store_ephemeris(eph) {
                        summary.capacity_drops += dropped;
                    }
                },
                Message::Msm4Observations(msm4) => {
                    summary.observations += 1;
                    if let StoreOutcome::CapacityExceeded(dropped) = history.store_msm4(msm4)? {
                        summary.capacity_drops += dropped;
                    }
                },
                Message::LegacyObservations(legacy) => {
                    summary.observations += 1;
                    if let StoreOutcome::CapacityExceeded(dropped) = history.store_legacy(legacy)? {
                        summary.capacity_drops += dropped;
                    }
                },
            }
        }

        Ok(history)
    }

    fn propagate(
        &self,
        series: &SeriesSet,
        summary: &mut Summary,
    ) -> (Vec<Vec<Option<SatelliteState>>>, Vec<OrbitTrace>) {
        let kepler_solver = KeplerSolver::new(
            self.cfg.kepler_max_iterations,
            self.cfg.kepler_tolerance_rad,
        );

        let mut satellites = vec![Vec::new()];
        let mut orbits = Vec::new();

        for (prn, sat) in series.iter() {
            let mut states = Vec::with_capacity(sat.entries.len());

            for entry in &sat.entries {
                let state = entry.keplerian.as_ref().and_then(|kepler| {
                    match kepler_solver.resolve_state(kepler, entry.tow_ms) {
                        Ok(state) => Some(state),
                        Err(error) => {
                            warn!("prn {}: t={}ms: {}", prn, entry.tow_ms, error);
                            summary.numerical_rejections += 1;
                            None
                        },
                    }
                });

                states.push(state);
            }

            satellites.push(states);

            // orbit trace from the first broadcast frame only
            if let Some(first) = sat.ephemerides.first() {
                orbits.push(OrbitTrace::sample(
                    first.satellite,
                    &first.to_keplerian(),
                    self.cfg.orbit_sampling_step_rad,
                ));
            }
        }

        (satellites, orbits)
    }

    fn solve(
        &self,
        series: &SeriesSet,
        satellites: &[Vec<Option<SatelliteState>>],
        summary: &mut Summary,
    ) -> (Vec<f64>, Vec<Option<EpochSolution>>) {
        let solver = NavigationSolver::new(&self.cfg);

        let epochs = unique_epochs(
            series
                .iter()
                .flat_map(|(_, sat)| sat.entries.iter().map(|entry| entry.tow_ms)),
            self.cfg.max_epochs,
        );

        // index the observations by epoch: PRN then insertion order
        let mut by_epoch: HashMap<u64, Vec<(Vector3<f64>, f64)>> = HashMap::new();

        for (prn, sat) in series.iter() {
            for (k, entry) in sat.entries.iter().enumerate() {
                let state = match satellites[prn as usize][k] {
                    Some(state) => state,
                    None => continue,
                };

                let pseudorange_m = match entry.pseudorange_m {
                    Some(pseudorange_m) => pseudorange_m,
                    None => continue,
                };

                by_epoch
                    .entry(entry.tow_ms.to_bits())
                    .or_default()
                    .push((state.ecef_m, pseudorange_m));
            }
        }

        let mut solutions = Vec::with_capacity(epochs.len());

        for &epoch in &epochs {
            let gathered = by_epoch.get(&epoch.to_bits());

            let (sat_ecef_m, pseudoranges_m): (Vec<_>, Vec<_>) = match gathered {
                Some(gathered) => gathered.iter().cloned().unzip(),
                None => (Vec::new(), Vec::new()),
            };

            match solver.resolve(epoch, &sat_ecef_m, &pseudoranges_m) {
                Ok(solution) => {
                    summary.solved_epochs += 1;
                    solutions.push(Some(solution));
                },
                Err(SolverError::NotEnoughSatellites(found)) => {
                    debug!("t={}ms: {} satellites in sight, skipped", epoch, found);
                    summary.underdetermined_epochs += 1;
                    solutions.push(None);
                },
                Err(SolverError::SingularGeometry) => {
                    warn!("t={}ms: singular geometry, skipped", epoch);
                    summary.singular_epochs += 1;
                    solutions.push(None);
                },
            }
        }

        (epochs, solutions)
    }
}
