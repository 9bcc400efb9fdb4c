//! Per PRN observation series, aligned with their best fit ephemeris.

use itertools::Itertools;
use log::debug;

use crate::{
    cfg::Config,
    constants::{time_of_week_seconds, MAX_GPS_PRN},
    navigation::{Ephemeris, Keplerian},
    observation::ObservationType,
    storage::History,
};

/// One observation of one PRN, in insertion order. Indices are compact:
/// entry `k` is the k-th record stored for this PRN. Absence of a
/// component is explicit, never a zero sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesEntry {
    /// Observation time, as decoded (milliseconds of week).
    pub tow_ms: f64,

    /// Recomposed pseudorange in meters, when this PRN carried a valid
    /// L1 measurement in record `k`.
    pub pseudorange_m: Option<f64>,

    /// Elements of the best fit ephemeris: the largest ToE at or below
    /// the observation time, first-arrived winning ties. `None` when no
    /// frame qualifies yet; the solver ignores such entries.
    pub keplerian: Option<Keplerian>,
}

/// Dense per PRN time series: every stored observation of the PRN,
/// paired with its selected ephemeris, plus the unique-by-ToE ephemeris
/// list that drives the orbit sampler independently of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteSeries {
    /// Observations in insertion order.
    pub entries: Vec<SeriesEntry>,

    /// Unique-by-ToE ephemerides, in arrival order.
    pub ephemerides: Vec<Ephemeris>,
}

/// All per PRN series of one run, the frozen output of the SORT stage.
#[derive(Debug, Clone)]
pub struct SeriesSet {
    /// Per PRN series, slot 0 unused.
    series: Vec<SatelliteSeries>,

    /// Observations for which no ephemeris qualified (counted for the
    /// run summary; those entries are skipped by the solver).
    pub missing_ephemerides: usize,
}

impl SeriesSet {
    /// Builds every per PRN series from frozen [History] tables.
    pub fn build(history: &History, cfg: &Config) -> Self {
        let mut missing_ephemerides = 0;

        let mut series: Vec<SatelliteSeries> = (0..=MAX_GPS_PRN as usize)
            .map(|_| SatelliteSeries {
                entries: Vec::new(),
                ephemerides: Vec::new(),
            })
            .collect();

        for prn in History::prns() {
            let slot = &mut series[prn as usize];

            // ephemeris-only series: unique by ToE, arrival order
            slot.ephemerides = history
                .ephemerides(prn)
                .iter()
                .unique_by(|eph| eph.toe_s.to_bits())
                .cloned()
                .collect();

            // observation series, aligned with the best fit ephemeris
            let observations: Vec<(f64, Option<f64>)> = match history.observation_type() {
                Some(ObservationType::Msm4) => history
                    .msm4_records(prn)
                    .iter()
                    .map(|rec| (rec.tow_ms, rec.pseudorange_m(prn)))
                    .collect(),
                Some(ObservationType::Legacy) => history
                    .legacy_records(prn)
                    .iter()
                    .map(|rec| (rec.tow_ms, rec.pseudorange_m(prn)))
                    .collect(),
                None => Vec::new(),
            };

            for (tow_ms, pseudorange_m) in observations {
                let keplerian = if tow_ms != 0.0 {
                    select_ephemeris(history.ephemerides(prn), tow_ms, cfg)
                        .map(Ephemeris::to_keplerian)
                } else {
                    None
                };

                if pseudorange_m.is_some() && keplerian.is_none() {
                    missing_ephemerides += 1;
                }

                slot.entries.push(SeriesEntry {
                    tow_ms,
                    pseudorange_m,
                    keplerian,
                });
            }

            if !slot.entries.is_empty() {
                debug!(
                    "prn {}: {} observations, {} unique ephemerides",
                    prn,
                    slot.entries.len(),
                    slot.ephemerides.len()
                );
            }
        }

        Self {
            series,
            missing_ephemerides,
        }
    }

    /// Series of desired PRN.
    pub fn satellite(&self, prn: u8) -> &SatelliteSeries {
        &self.series[prn as usize]
    }

    /// Iterates all (PRN, series) pairs in PRN order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &SatelliteSeries)> {
        History::prns().map(move |prn| (prn, self.satellite(prn)))
    }
}

/// Selects the ephemeris with the largest ToE at or below the
/// observation time. The scan replaces its candidate only on a strictly
/// larger ToE: on equal ToEs the first-arrived frame wins.
fn select_ephemeris<'a>(
    ephemerides: &'a [Ephemeris],
    tow: f64,
    cfg: &Config,
) -> Option<&'a Ephemeris> {
    let tow_s = time_of_week_seconds(tow);
    let mut best: Option<&'a Ephemeris> = None;

    for eph in ephemerides {
        if cfg.require_healthy_satellites && !eph.satellite_is_healthy() {
            continue;
        }

        if eph.toe_s <= tow_s {
            match best {
                Some(candidate) if eph.toe_s <= candidate.toe_s => {},
                _ => best = Some(eph),
            }
        }
    }

    best
}

#[cfg(test)]
mod test {
    use super::select_ephemeris;
    use crate::{cfg::Config, navigation::Ephemeris};

    fn eph_with_toe(toe_s: f64, iode: u16) -> Ephemeris {
        Ephemeris {
            toe_s,
            iode,
            ..Default::default()
        }
    }

    #[test]
    fn largest_toe_below_wins() {
        let cfg = Config::default();
        let history = [
            eph_with_toe(100.0, 1),
            eph_with_toe(300.0, 2),
            eph_with_toe(200.0, 3),
        ];

        assert_eq!(select_ephemeris(&history, 250.0, &cfg).unwrap().iode, 3);
        assert_eq!(select_ephemeris(&history, 300.0, &cfg).unwrap().iode, 2);
        assert_eq!(select_ephemeris(&history, 1_000.0, &cfg).unwrap().iode, 2);
        assert!(select_ephemeris(&history, 50.0, &cfg).is_none());
    }

    #[test]
    fn equal_toe_first_arrival_wins() {
        let cfg = Config::default();
        let history = [eph_with_toe(100.0, 1), eph_with_toe(100.0, 2)];
        assert_eq!(select_ephemeris(&history, 150.0, &cfg).unwrap().iode, 1);

        // and under permuted insertion order
        let history = [eph_with_toe(100.0, 2), eph_with_toe(100.0, 1)];
        assert_eq!(select_ephemeris(&history, 150.0, &cfg).unwrap().iode, 2);
    }

    #[test]
    fn millisecond_timestamps_are_normalized() {
        let cfg = Config::default();
        let history = [eph_with_toe(159_000.0, 1)];

        // 159_000_000 ms of week is 159_000 s of week
        assert!(select_ephemeris(&history, 159_000_000.0, &cfg).is_some());
        assert!(select_ephemeris(&history, 158_999_000.0, &cfg).is_none());
    }
}
