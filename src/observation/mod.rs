//! Pseudorange observation records, decoded from 1002 and 1074 messages.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::fmt;

/// The two observation families the engine understands. A stream is
/// locked on the family of its first observation message: mixing both
/// in one run is a fatal configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObservationType {
    /// Message 1002: legacy extended L1 observables.
    Legacy = 1,

    /// Message 1074: MSM4 multi signal observables (L1 C/A retained).
    Msm4 = 4,
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "1002 (legacy L1)"),
            Self::Msm4 => write!(f, "1074 (MSM4)"),
        }
    }
}

/// One satellite/signal cell of an MSM4 message, restricted to the
/// L1 C/A ("1C") signal by the decoder.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Msm4Cell {
    /// PRN of the satellite this cell belongs to.
    pub prn: u8,

    /// Full recomposed pseudorange, in meters. `-1.0` marks a cell
    /// whose rough or fine components were missing or invalid.
    pub pseudorange_m: f64,

    /// Fine pseudorange residual (DF400), in meters.
    pub fine_range_m: f64,

    /// Fine phase range residual (DF401), in meters.
    pub fine_phase_m: f64,

    /// Lock time indicator (DF402).
    pub lock_time: f64,

    /// Carrier to noise ratio (DF403), in dB-Hz.
    pub cnr_dbhz: f64,

    /// Half cycle ambiguity indicator (DF420).
    pub half_cycle_ambiguity: bool,
}

/// One decoded MSM4 (1074) message, with the cell list already filtered
/// down to L1 C/A cells and the full pseudoranges recomposed.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Msm4Observations {
    /// GPS epoch time (DF004), in milliseconds of week.
    pub tow_ms: f64,

    /// Reference station identifier (DF003).
    pub station_id: u16,

    /// PRNs listed in the satellite section of the message, in mask
    /// order. Rough ranges below align with this list.
    pub prns: Vec<u8>,

    /// Rough range integer milliseconds (DF397), aligned to [Self::prns].
    /// `-1.0` marks a missing value.
    pub rough_range_ms: Vec<f64>,

    /// Rough range modulo one second (DF398) in meters, aligned to
    /// [Self::prns].
    pub rough_range_mod1s_m: Vec<f64>,

    /// L1 C/A cell count: rewritten by the decoder from the on-air cell
    /// count down to the retained cells.
    pub n_cell: usize,

    /// Retained L1 C/A cells, in on-air cell order.
    pub cells: Vec<Msm4Cell>,
}

impl Msm4Observations {
    /// Returns the recomposed pseudorange for desired PRN, when this
    /// message carries a valid L1 C/A cell for it.
    pub fn pseudorange_m(&self, prn: u8) -> Option<f64> {
        self.cells
            .iter()
            .find(|cell| cell.prn == prn && cell.pseudorange_m > 0.0)
            .map(|cell| cell.pseudorange_m)
    }
}

/// One satellite of a legacy 1002 message.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegacySatellite {
    /// PRN (DF009).
    pub prn: u8,

    /// Full recomposed pseudorange, in meters:
    /// `ambiguity · c/1000 + remainder`.
    pub pseudorange_m: f64,

    /// L1 pseudorange rough ambiguity (DF014), in integer milliseconds.
    pub ambiguity_ms: f64,

    /// L1 pseudorange remainder (DF011), in meters.
    pub remainder_m: f64,

    /// L1 phase minus code difference (DF012), in meters.
    pub phase_range_diff_m: f64,

    /// Lock time indicator (DF013).
    pub lock_time: f64,

    /// Carrier to noise ratio (DF015), in dB-Hz.
    pub cnr_dbhz: f64,
}

/// One decoded legacy (1002) message.
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LegacyObservations {
    /// GPS epoch time (DF004), in milliseconds of week.
    pub tow_ms: f64,

    /// Reference station identifier (DF003).
    pub station_id: u16,

    /// Per satellite observables, in message order.
    pub satellites: Vec<LegacySatellite>,
}

impl LegacyObservations {
    /// Returns the recomposed pseudorange for desired PRN, when listed.
    pub fn pseudorange_m(&self, prn: u8) -> Option<f64> {
        self.satellites
            .iter()
            .find(|sat| sat.prn == prn && sat.pseudorange_m > 0.0)
            .map(|sat| sat.pseudorange_m)
    }
}
