//! MSM4 observables (1074) decoding.

use log::trace;

use crate::{
    constants::{SPEED_OF_LIGHT_M_S, MAX_GPS_PRN},
    observation::{Msm4Cell, Msm4Observations},
    rtcm::{field::FieldReader, RtcmError},
};

/// MSM satellite and cell groups larger than this mark a corrupt line.
const MAX_CELLS: usize = 64;

/// The one signal the engine retains: GPS L1 C/A.
const L1CA_SIGNAL: &str = "1C";

/// Decodes one 1074 message in two passes over the cell group:
/// a first pass filters cells down to the L1 C/A signal, a second pass
/// harvests DF400..DF403 and DF420 aligned to the filtered order. The
/// cell count of the output record is the L1-only count. Cells whose
/// rough or fine range components are missing keep a `-1.0` pseudorange.
pub(crate) fn decode(reader: &FieldReader) -> Result<Msm4Observations, RtcmError> {
    let mut obs = Msm4Observations {
        tow_ms: reader.f64("DF004").unwrap_or(0.0),
        station_id: reader.u16("DF003").unwrap_or(0),
        ..Default::default()
    };

    // satellite section: rough ranges aligned to the PRN list
    for index in 0..MAX_CELLS {
        let prn = match reader.indexed_u8("PRN", index) {
            Some(prn) => prn,
            None => break,
        };

        if prn == 0 || prn > MAX_GPS_PRN {
            return Err(RtcmError::Malformed(1074));
        }

        obs.prns.push(prn);
        obs.rough_range_ms
            .push(reader.indexed_f64("DF397", index).unwrap_or(-1.0));
        obs.rough_range_mod1s_m
            .push(reader.indexed_f64("DF398", index).unwrap_or(-1.0));
    }

    // first pass: retain L1 C/A cell indices only
    let mut retained = Vec::new();

    for index in 0..MAX_CELLS {
        let sig = match reader.indexed_str("CELLSIG", index) {
            Some(sig) => sig,
            None => break,
        };

        if sig == L1CA_SIGNAL {
            retained.push(index);
        }
    }

    // second pass: harvest the fine observables of retained cells
    for &index in &retained {
        let prn = reader
            .indexed_u8("CELLPRN", index)
            .ok_or(RtcmError::Malformed(1074))?;

        if prn == 0 || prn > MAX_GPS_PRN {
            return Err(RtcmError::Malformed(1074));
        }

        let fine_range_m = reader.indexed_f64("DF400", index);

        let mut cell = Msm4Cell {
            prn,
            pseudorange_m: -1.0,
            fine_range_m: fine_range_m.unwrap_or(0.0),
            fine_phase_m: reader.indexed_f64("DF401", index).unwrap_or(0.0),
            lock_time: reader.indexed_f64("DF402", index).unwrap_or(0.0),
            cnr_dbhz: reader.indexed_f64("DF403", index).unwrap_or(0.0),
            half_cycle_ambiguity: reader.indexed_f64("DF420", index).unwrap_or(0.0) != 0.0,
        };

        // full pseudorange: rough integer milliseconds scaled by c,
        // plus the modulo-1s component and the fine residual
        let sat = obs.prns.iter().position(|&p| p == prn);

        if let (Some(sat), Some(fine_m)) = (sat, fine_range_m) {
            let rough_ms = obs.rough_range_ms[sat];
            let mod1s_m = obs.rough_range_mod1s_m[sat];

            if rough_ms >= 0.0 && mod1s_m >= 0.0 {
                cell.pseudorange_m = SPEED_OF_LIGHT_M_S * (rough_ms * 1.0E-3) + mod1s_m + fine_m;
            }
        }

        trace!(
            "msm4: t={}ms prn={} pr={:.3}m",
            obs.tow_ms,
            prn,
            cell.pseudorange_m
        );

        obs.cells.push(cell);
    }

    obs.n_cell = obs.cells.len();

    Ok(obs)
}
