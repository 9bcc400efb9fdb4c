//! GPS ephemeris (1019) decoding.

use std::f64::consts::PI;

use crate::{
    constants::MAX_GPS_PRN,
    navigation::{Ephemeris, GpsHealth},
    prelude::{Constellation, SV},
    rtcm::{field::FieldReader, RtcmError},
};

/// Broadcast eccentricity scale factor (2⁻³³).
const ECCENTRICITY_LSB: f64 = 1.0 / 8_589_934_592.0;

/// Decodes one 1019 message into a typed [Ephemeris].
///
/// All unit rescalings live here and nowhere else:
/// - M0, Ω0, i0 and ω arrive in semicircles and are scaled by π,
/// - eccentricity arrives as a raw 2⁻³³ scaled integer,
/// - the semi major axis is the square of the broadcast `sqrt(A)`.
///
/// Fields absent from the line keep their zero default; the satellite
/// identifier is the one structurally mandatory field.
pub(crate) fn decode(reader: &FieldReader) -> Result<Ephemeris, RtcmError> {
    let prn = reader.u8("DF009").ok_or(RtcmError::Malformed(1019))?;

    if prn == 0 || prn > MAX_GPS_PRN {
        return Err(RtcmError::Malformed(1019));
    }

    let mut eph = Ephemeris {
        satellite: SV::new(Constellation::GPS, prn),
        ..Default::default()
    };

    if let Some(week) = reader.parse::<u32>("DF076") {
        eph.week = week;
    }

    eph.ura_index = reader.u8("DF077").unwrap_or(0);
    eph.i_dot_rad_s = reader.f64("DF079").unwrap_or(0.0);
    eph.iode = reader.u16("DF071").unwrap_or(0);
    eph.toc_s = reader.f64("DF081").unwrap_or(0.0);
    eph.af2_s_s2 = reader.f64("DF082").unwrap_or(0.0);
    eph.af1_s_s = reader.f64("DF083").unwrap_or(0.0);
    eph.af0_s = reader.f64("DF084").unwrap_or(0.0);
    eph.iodc = reader.u16("DF085").unwrap_or(0);
    eph.crs_m = reader.f64("DF086").unwrap_or(0.0);
    eph.dn_rad_s = reader.f64("DF087").unwrap_or(0.0);
    eph.ma_rad = reader.f64("DF088").unwrap_or(0.0) * PI;
    eph.cuc_rad = reader.f64("DF089").unwrap_or(0.0);
    eph.ecc = reader.f64("DF090").unwrap_or(0.0) * ECCENTRICITY_LSB;
    eph.cus_rad = reader.f64("DF091").unwrap_or(0.0);
    eph.cic_rad = reader.f64("DF094").unwrap_or(0.0);
    eph.longan_rad = reader.f64("DF095").unwrap_or(0.0) * PI;
    eph.cis_rad = reader.f64("DF096").unwrap_or(0.0);
    eph.inc_rad = reader.f64("DF097").unwrap_or(0.0) * PI;
    eph.crc_m = reader.f64("DF098").unwrap_or(0.0);
    eph.aop_rad = reader.f64("DF099").unwrap_or(0.0) * PI;
    eph.omega_dot_rad_s = reader.f64("DF100").unwrap_or(0.0);
    eph.toe_s = reader.f64("DF093").unwrap_or(0.0);
    eph.tgd_s = reader.f64("DF101").unwrap_or(0.0);
    eph.health = GpsHealth::from_bits_truncate(reader.u8("DF102").unwrap_or(0));
    eph.fit_interval = reader.u8("DF137").unwrap_or(0);

    let sqrt_a = reader.f64("DF092").unwrap_or(0.0);
    eph.sma_m = sqrt_a * sqrt_a;

    Ok(eph)
}
