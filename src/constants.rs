//! Physical constants shared by the decoding and navigation stages.

/// Speed of light, in m.s⁻¹.
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Signal travel distance over one millisecond, in meters.
/// Used to recompose full pseudoranges from rough millisecond ranges.
pub const RANGE_1MS_M: f64 = SPEED_OF_LIGHT_M_S * 1.0E-3;

/// Earth gravitational constant μ = G·M⊕, in m³.s⁻².
/// The legacy algorithm evaluates G·M⊕ from CODATA values rather than
/// using the GPS ICD WGS-84 constant; this is preserved on purpose.
pub const EARTH_GM_M3_S2: f64 = 6.674_30E-11 * 5.972_2E24;

/// Earth rotation rate, in rad.s⁻¹ (from the GPS ICD).
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115_146_7E-5;

/// One solar day, in seconds. The ECI to ECEF stage rotates by one full
/// revolution per solar (not sidereal) day: a legacy simplification that
/// must be preserved to reproduce receiver positions.
pub const SECONDS_PER_SOLAR_DAY: f64 = 86_400.0;

/// One GPS week, in seconds.
pub const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Highest GPS PRN we consider.
pub const MAX_GPS_PRN: u8 = 32;

/// Returns time of week in seconds. Timestamps larger than one week
/// are interpreted as milliseconds of week (the RTCM convention) and
/// scaled down accordingly.
pub fn time_of_week_seconds(tow: f64) -> f64 {
    if tow > SECONDS_PER_WEEK {
        tow * 1.0E-3
    } else {
        tow
    }
}
