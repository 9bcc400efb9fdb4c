//! ECEF to geodetic (WGS-84) conversion.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use nalgebra::Vector3;

/// WGS-84 semi major axis, in meters.
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS-84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// WGS-84 semi minor axis, in meters.
pub const WGS84_SEMI_MINOR_AXIS_M: f64 = WGS84_SEMI_MAJOR_AXIS_M * (1.0 - WGS84_FLATTENING);

/// WGS-84 first eccentricity squared.
pub const WGS84_ECC_SQUARED: f64 = 2.0 * WGS84_FLATTENING - WGS84_FLATTENING * WGS84_FLATTENING;

/// WGS-84 second eccentricity squared.
pub const WGS84_SECOND_ECC_SQUARED: f64 = (WGS84_SEMI_MAJOR_AXIS_M * WGS84_SEMI_MAJOR_AXIS_M
    - WGS84_SEMI_MINOR_AXIS_M * WGS84_SEMI_MINOR_AXIS_M)
    / (WGS84_SEMI_MINOR_AXIS_M * WGS84_SEMI_MINOR_AXIS_M);

/// Geodetic coordinates on the WGS-84 ellipsoid.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodeticCoords {
    /// Latitude, in degrees.
    pub latitude_deg: f64,

    /// Longitude, in degrees.
    pub longitude_deg: f64,

    /// Altitude above the ellipsoid, in meters.
    pub altitude_m: f64,
}

impl GeodeticCoords {
    /// Builds [GeodeticCoords] from explicit angles (degrees) and
    /// altitude (meters).
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Converts an ECEF position (meters) by Bowring's closed form.
    pub fn from_ecef(ecef_m: &Vector3<f64>) -> Self {
        let (a, b) = (WGS84_SEMI_MAJOR_AXIS_M, WGS84_SEMI_MINOR_AXIS_M);
        let (e2, ep2) = (WGS84_ECC_SQUARED, WGS84_SECOND_ECC_SQUARED);

        let (x, y, z) = (ecef_m[0], ecef_m[1], ecef_m[2]);

        let p = (x * x + y * y).sqrt();

        if p == 0.0 && z == 0.0 {
            // degenerate geocenter request
            return Self::new(0.0, 0.0, -a);
        }

        let longitude_rad = y.atan2(x);

        let theta = (z * a).atan2(p * b);
        let (sin_theta, cos_theta) = theta.sin_cos();

        let latitude_rad = (z + ep2 * b * sin_theta.powi(3))
            .atan2(p - e2 * a * cos_theta.powi(3));

        let (sin_lat, cos_lat) = latitude_rad.sin_cos();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        // the p/cos(lat) form degenerates at the poles where both
        // p and cos(lat) vanish: switch to the z axis there
        let altitude_m = if cos_lat.abs() > 1.0E-10 {
            p / cos_lat - n
        } else {
            z / sin_lat - n * (1.0 - e2)
        };

        Self {
            latitude_deg: latitude_rad.to_degrees(),
            longitude_deg: longitude_rad.to_degrees(),
            altitude_m,
        }
    }

    /// Converts back to an ECEF position, in meters. Exact inverse of
    /// [GeodeticCoords::from_ecef] to well under a millimeter at usual
    /// receiver altitudes; mostly useful to validate conversions.
    pub fn to_ecef(&self) -> Vector3<f64> {
        let (a, e2) = (WGS84_SEMI_MAJOR_AXIS_M, WGS84_ECC_SQUARED);

        let latitude_rad = self.latitude_deg.to_radians();
        let longitude_rad = self.longitude_deg.to_radians();

        let (sin_lat, cos_lat) = latitude_rad.sin_cos();
        let (sin_lon, cos_lon) = longitude_rad.sin_cos();

        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Vector3::new(
            (n + self.altitude_m) * cos_lat * cos_lon,
            (n + self.altitude_m) * cos_lat * sin_lon,
            (n * (1.0 - e2) + self.altitude_m) * sin_lat,
        )
    }
}
