//! Legacy extended L1 observables (1002) decoding.

use crate::{
    constants::{RANGE_1MS_M, MAX_GPS_PRN},
    observation::{LegacyObservations, LegacySatellite},
    rtcm::{field::FieldReader, RtcmError},
};

/// Satellite groups larger than this mark a corrupt line.
const MAX_SATELLITES: usize = 64;

/// Decodes one 1002 message: straight per satellite extraction, the
/// full pseudorange is `DF014 · c/1000 + DF011`.
pub(crate) fn decode(reader: &FieldReader) -> Result<LegacyObservations, RtcmError> {
    let mut obs = LegacyObservations {
        tow_ms: reader.f64("DF004").unwrap_or(0.0),
        station_id: reader.u16("DF003").unwrap_or(0),
        satellites: Vec::new(),
    };

    for index in 0..MAX_SATELLITES {
        let prn = match reader.indexed_u8("DF009", index) {
            Some(prn) => prn,
            None => break, // end of the satellite group
        };

        if prn == 0 || prn > MAX_GPS_PRN {
            return Err(RtcmError::Malformed(1002));
        }

        let ambiguity_ms = reader.indexed_f64("DF014", index).unwrap_or(-1.0);
        let remainder_m = reader.indexed_f64("DF011", index).unwrap_or(-1.0);

        let pseudorange_m = if ambiguity_ms >= 0.0 && remainder_m >= 0.0 {
            ambiguity_ms * RANGE_1MS_M + remainder_m
        } else {
            -1.0
        };

        obs.satellites.push(LegacySatellite {
            prn,
            pseudorange_m,
            ambiguity_ms,
            remainder_m,
            phase_range_diff_m: reader.indexed_f64("DF012", index).unwrap_or(0.0),
            lock_time: reader.indexed_f64("DF013", index).unwrap_or(0.0),
            cnr_dbhz: reader.indexed_f64("DF015", index).unwrap_or(0.0),
        });
    }

    Ok(obs)
}
