//! Per PRN accumulation of decoded messages.

use log::warn;

use crate::{
    cfg::Config,
    constants::MAX_GPS_PRN,
    navigation::Ephemeris,
    observation::{LegacyObservations, Msm4Observations, ObservationType},
    Error,
};

/// Outcome of one store operation, for the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Record appended to every relevant PRN slot.
    Stored,

    /// One or more PRN slots were full: those appends were dropped.
    /// The pipeline keeps running.
    CapacityExceeded(usize),
}

/// [History] accumulates decoded records into PRN indexed, append-only
/// tables (PRN 1..=32, slot 0 unused). It is written by the READ stage
/// and consumed read-only by everything downstream.
///
/// Observation messages are duplicated whole into the slot of every PRN
/// they list: each PRN then owns a compact, self-sufficient record
/// sequence, which keeps the series builder a per-PRN linear scan.
#[derive(Debug, Clone)]
pub struct History {
    /// Broadcast ephemeris frames, per PRN, in arrival order.
    ephemerides: Vec<Vec<Ephemeris>>,

    /// MSM4 records, per listed PRN, in arrival order.
    msm4: Vec<Vec<Msm4Observations>>,

    /// Legacy 1002 records, per listed PRN, in arrival order.
    legacy: Vec<Vec<LegacyObservations>>,

    /// Observation family, locked by the first observation message.
    observation_type: Option<ObservationType>,

    /// Capacity caps.
    max_ephemeris_history: usize,
    max_epochs: usize,
}

impl History {
    /// Builds an empty [History] with the capacity caps of provided
    /// [Config].
    pub fn new(cfg: &Config) -> Self {
        let slots = MAX_GPS_PRN as usize + 1;
        Self {
            ephemerides: vec![Vec::new(); slots],
            msm4: vec![Vec::new(); slots],
            legacy: vec![Vec::new(); slots],
            observation_type: None,
            max_ephemeris_history: cfg.max_ephemeris_history,
            max_epochs: cfg.max_epochs,
        }
    }

    /// Iterates all PRNs the tables are indexed by.
    pub fn prns() -> impl Iterator<Item = u8> {
        1..=MAX_GPS_PRN
    }

    /// Observation family of this run, once known.
    pub fn observation_type(&self) -> Option<ObservationType> {
        self.observation_type
    }

    /// Ephemeris history of desired PRN, in arrival order.
    pub fn ephemerides(&self, prn: u8) -> &[Ephemeris] {
        &self.ephemerides[prn as usize]
    }

    /// MSM4 records stored under desired PRN, in arrival order.
    pub fn msm4_records(&self, prn: u8) -> &[Msm4Observations] {
        &self.msm4[prn as usize]
    }

    /// Legacy records stored under desired PRN, in arrival order.
    pub fn legacy_records(&self, prn: u8) -> &[LegacyObservations] {
        &self.legacy[prn as usize]
    }

    /// Appends one [Ephemeris] to its PRN history. Duplicate ToEs are
    /// kept as-is: deduplication happens at series construction.
    pub fn store_ephemeris(&mut self, eph: Ephemeris) -> StoreOutcome {
        let slot = &mut self.ephemerides[eph.satellite.prn as usize];

        if slot.len() >= self.max_ephemeris_history {
            warn!(
                "{}: ephemeris history full ({}), frame dropped",
                eph.satellite, self.max_ephemeris_history
            );
            return StoreOutcome::CapacityExceeded(1);
        }

        slot.push(eph);
        StoreOutcome::Stored
    }

    /// Appends one MSM4 record into the slot of every PRN it lists.
    /// Fails when the stream was locked on the legacy family.
    pub fn store_msm4(&mut self, msm4: Msm4Observations) -> Result<StoreOutcome, Error> {
        self.lock_observation_type(ObservationType::Msm4)?;

        let mut dropped = 0;

        for &prn in &msm4.prns {
            let slot = &mut self.msm4[prn as usize];

            if slot.len() >= self.max_epochs {
                warn!("prn {}: observation history full, record dropped", prn);
                dropped += 1;
                continue;
            }

            slot.push(msm4.clone());
        }

        if dropped > 0 {
            Ok(StoreOutcome::CapacityExceeded(dropped))
        } else {
            Ok(StoreOutcome::Stored)
        }
    }

    /// Appends one legacy record into the slot of every PRN it lists.
    /// Fails when the stream was locked on the MSM4 family.
    pub fn store_legacy(&mut self, legacy: LegacyObservations) -> Result<StoreOutcome, Error> {
        self.lock_observation_type(ObservationType::Legacy)?;

        let mut dropped = 0;

        for index in 0..legacy.satellites.len() {
            let prn = legacy.satellites[index].prn;
            let slot = &mut self.legacy[prn as usize];

            if slot.len() >= self.max_epochs {
                warn!("prn {}: observation history full, record dropped", prn);
                dropped += 1;
                continue;
            }

            slot.push(legacy.clone());
        }

        if dropped > 0 {
            Ok(StoreOutcome::CapacityExceeded(dropped))
        } else {
            Ok(StoreOutcome::Stored)
        }
    }

    /// First observation message locks the family for the entire run.
    fn lock_observation_type(&mut self, found: ObservationType) -> Result<(), Error> {
        match self.observation_type {
            None => {
                self.observation_type = Some(found);
                Ok(())
            },
            Some(locked) if locked == found => Ok(()),
            Some(locked) => Err(Error::MixedObservationStream { locked, found }),
        }
    }
}
