#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

pub mod cfg;
pub mod constants;
pub mod coords;
pub mod navigation;
pub mod observation;
pub mod pipeline;
pub mod rtcm;
pub mod series;
pub mod solver;
pub mod storage;

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::observation::ObservationType;

/// Fatal errors: any of these aborts the pipeline immediately,
/// no partial output is produced. Recoverable conditions are counted
/// in [pipeline::Summary] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The observation family (1002 or 1074) is locked by the first
    /// observation message of the stream. Mixed streams are rejected.
    #[error("mixed observation stream: locked on {locked}, found {found}")]
    MixedObservationStream {
        locked: ObservationType,
        found: ObservationType,
    },

    /// Input stream could not be read.
    #[error("i/o error: {0}")]
    IO(#[from] std::io::Error),
}

pub mod prelude {
    pub use crate::{
        cfg::Config,
        coords::GeodeticCoords,
        navigation::{Ephemeris, Keplerian, OrbitTrace, SatelliteState},
        observation::{LegacyObservations, Msm4Observations, ObservationType},
        pipeline::{Pipeline, Results, Summary},
        rtcm::Message,
        solver::EpochSolution,
        Error,
    };

    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}
