//! GPS broadcast ephemeris definitions and orbital state resolution.

pub(crate) mod kepler;
mod orbit;

pub use kepler::{KeplerSolver, SatelliteState};
pub use orbit::OrbitTrace;

use bitflags::bitflags;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use hifitime::{Duration, Epoch, TimeScale};

use crate::prelude::SV;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EphemerisError {
    /// One intermediate of the orbital resolution is not finite
    /// (degenerate semi-major axis, hyperbolic eccentricity, ...).
    /// The Kepler iteration itself never fails: it is capped by the
    /// iteration budget and GPS eccentricities converge well within it.
    #[error("non finite orbital state")]
    NonFinite,
}

bitflags! {
    /// GPS SV health word (DF102): summary bit plus per signal
    /// component status, as broadcast in subframe 1.
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct GpsHealth: u8 {
        /// All L5 signals unhealthy
        const L5_UNHEALTHY = 0x01;
        /// All L2 signals unhealthy
        const L2_UNHEALTHY = 0x02;
        /// All L1 signals unhealthy
        const L1_UNHEALTHY = 0x04;
        /// Some or all navigation data unhealthy
        const NAV_DATA_UNHEALTHY = 0x08;
        /// Summary: satellite should not be used
        const UNHEALTHY = 0x20;
    }
}

/// [Ephemeris] describes one GPS LNAV broadcast frame (message 1019)
/// for one satellite at one issue of data. Angular fields are stored in
/// radians: the π rescaling of the broadcast semicircle units happens
/// once, at decode time. Frames are append-only: the history store never
/// mutates them.
#[derive(Default, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// Satellite that broadcast this frame.
    pub satellite: SV,

    /// GPS week number.
    pub week: u32,

    /// Time of clock, in seconds of GPS week.
    pub toc_s: f64,

    /// Time of ephemeris, in seconds of GPS week.
    pub toe_s: f64,

    /// Semi major axis, in meters.
    pub sma_m: f64,

    /// Eccentricity.
    pub ecc: f64,

    /// Inclination at reference time, in radians.
    pub inc_rad: f64,

    /// Longitude of ascending node at reference time, in radians.
    pub longan_rad: f64,

    /// Argument of perigee, in radians.
    pub aop_rad: f64,

    /// Mean anomaly at reference time, in radians.
    pub ma_rad: f64,

    /// Mean motion difference, in radians.s⁻¹.
    pub dn_rad_s: f64,

    /// Right ascension rate of change, in radians.s⁻¹.
    pub omega_dot_rad_s: f64,

    /// Inclination rate of change, in radians.s⁻¹.
    pub i_dot_rad_s: f64,

    /// Amplitude of sine harmonic correction term of the argument
    /// of latitude, in radians.
    pub cus_rad: f64,

    /// Amplitude of cosine harmonic correction term of the argument
    /// of latitude, in radians.
    pub cuc_rad: f64,

    /// Amplitude of sine harmonic correction term of the angle of
    /// inclination, in radians.
    pub cis_rad: f64,

    /// Amplitude of cosine harmonic correction term of the angle of
    /// inclination, in radians.
    pub cic_rad: f64,

    /// Amplitude of sine harmonic correction term of the orbit radius,
    /// in meters.
    pub crs_m: f64,

    /// Amplitude of cosine harmonic correction term of the orbit radius,
    /// in meters.
    pub crc_m: f64,

    /// Clock bias, in seconds.
    pub af0_s: f64,

    /// Clock drift, in s.s⁻¹.
    pub af1_s_s: f64,

    /// Clock drift rate, in s.s⁻².
    pub af2_s_s2: f64,

    /// Total group delay, in seconds.
    pub tgd_s: f64,

    /// Issue of data (ephemeris).
    pub iode: u16,

    /// Issue of data (clock).
    pub iodc: u16,

    /// SV health word.
    pub health: GpsHealth,

    /// User range accuracy index.
    pub ura_index: u8,

    /// Fit interval flag: raised when the fit interval exceeds 4 hours.
    pub fit_interval: u8,
}

impl Ephemeris {
    /// Grab the satellite clock bias (s), drift (s.s⁻¹) and
    /// drift rate (s.s⁻²), attached to every [Ephemeris].
    pub fn clock_bias_drift_driftrate(&self) -> (f64, f64, f64) {
        (self.af0_s, self.af1_s_s, self.af2_s_s2)
    }

    /// Groups the six orbital elements and reference time as [Keplerian],
    /// ready for orbital state resolution.
    pub fn to_keplerian(&self) -> Keplerian {
        Keplerian {
            toe_s: self.toe_s,
            sma_m: self.sma_m,
            ecc: self.ecc,
            inc_rad: self.inc_rad,
            longan_rad: self.longan_rad,
            aop_rad: self.aop_rad,
            ma_rad: self.ma_rad,
        }
    }

    /// Returns Time of Ephemeris (ToE) expressed as [Epoch] in GPST.
    pub fn toe_gpst(&self) -> Epoch {
        let nanos = (self.toe_s * 1.0E9).round() as u64;
        Epoch::from_time_of_week(self.week, nanos, TimeScale::GPST)
    }

    /// Returns Time of Clock (ToC) expressed as [Epoch] in GPST.
    pub fn toc_gpst(&self) -> Epoch {
        let nanos = (self.toc_s * 1.0E9).round() as u64;
        Epoch::from_time_of_week(self.week, nanos, TimeScale::GPST)
    }

    /// Grab the Total Group Delay (TGD), expressed as [Duration].
    pub fn total_group_delay(&self) -> Duration {
        Duration::from_seconds(self.tgd_s)
    }

    /// Returns true if this frame declares the attached satellite as
    /// suitable for navigation.
    pub fn satellite_is_healthy(&self) -> bool {
        self.health.is_empty()
    }

    /// Evaluates the broadcast clock polynomial at desired time of week
    /// (in seconds), with respect to ToC. Returned value is the satellite
    /// clock offset in seconds; the legacy position solver does not apply
    /// it, this exists for consumers that do.
    pub fn clock_correction(&self, tow_s: f64, num_iter: usize) -> f64 {
        let (a0, a1, a2) = self.clock_bias_drift_driftrate();
        let mut dt = tow_s - self.toc_s;

        for _ in 0..num_iter {
            dt -= a0 + a1 * dt + a2 * dt.powi(2);
        }

        a0 + a1 * dt + a2 * dt.powi(2)
    }

    /// Returns the broadcast User Range Accuracy, in meters,
    /// from the URA index (per the GPS ICD conversion table).
    pub fn ura_m(&self) -> f64 {
        const URA_M: [f64; 15] = [
            2.4, 3.4, 4.85, 6.85, 9.65, 13.65, 24.0, 48.0, 96.0, 192.0, 384.0, 768.0, 1536.0,
            3072.0, 6144.0,
        ];

        match self.ura_index {
            index if (index as usize) < URA_M.len() => URA_M[index as usize],
            _ => f64::INFINITY,
        }
    }

    /// Returns true when this frame is considered valid at desired time
    /// of week (in seconds): |t - ToE| within the declared fit interval.
    /// Informational only: the series builder keeps the legacy
    /// largest-ToE-below selection rule regardless.
    pub fn is_valid(&self, tow_s: f64) -> bool {
        let max_dtoe_s = if self.fit_interval > 0 {
            3.0 * 3600.0
        } else {
            2.0 * 3600.0
        };
        (tow_s - self.toe_s).abs() < max_dtoe_s
    }
}

/// [Keplerian] is the exact element set the legacy propagator consumes:
/// the six orbital elements plus the reference time. Harmonic correction
/// and rate terms of the full LNAV model are intentionally not part of
/// this set.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keplerian {
    /// Time of ephemeris, in seconds of GPS week.
    pub toe_s: f64,

    /// Semi major axis, in meters.
    pub sma_m: f64,

    /// Eccentricity.
    pub ecc: f64,

    /// Inclination at reference time, in radians.
    pub inc_rad: f64,

    /// Longitude of ascending node at reference time, in radians.
    pub longan_rad: f64,

    /// Argument of perigee, in radians.
    pub aop_rad: f64,

    /// Mean anomaly at reference time, in radians.
    pub ma_rad: f64,
}
