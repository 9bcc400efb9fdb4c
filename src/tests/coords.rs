use crate::coords::{GeodeticCoords, WGS84_SEMI_MAJOR_AXIS_M, WGS84_SEMI_MINOR_AXIS_M};

use nalgebra::Vector3;

#[test]
fn equator_prime_meridian() {
    let geo = GeodeticCoords::from_ecef(&Vector3::new(6_378_137.0, 0.0, 0.0));

    assert!(geo.latitude_deg.abs() < 1.0E-6);
    assert!(geo.longitude_deg.abs() < 1.0E-6);
    assert!(geo.altitude_m.abs() < 1.0E-3);
}

#[test]
fn north_pole() {
    let geo = GeodeticCoords::from_ecef(&Vector3::new(0.0, 0.0, 6_356_752.3142));

    assert!((geo.latitude_deg - 90.0).abs() < 1.0E-6);
    assert!(geo.longitude_deg.abs() < 1.0E-6);
    assert!(geo.altitude_m.abs() < 1.0E-3);
}

#[test]
fn south_pole() {
    let geo = GeodeticCoords::from_ecef(&Vector3::new(0.0, 0.0, -WGS84_SEMI_MINOR_AXIS_M));

    assert!((geo.latitude_deg + 90.0).abs() < 1.0E-6);
    assert!(geo.altitude_m.abs() < 1.0E-3);
}

#[test]
fn geocenter_is_degenerate() {
    let geo = GeodeticCoords::from_ecef(&Vector3::zeros());

    assert_eq!(geo.latitude_deg, 0.0);
    assert_eq!(geo.longitude_deg, 0.0);
    assert_eq!(geo.altitude_m, -WGS84_SEMI_MAJOR_AXIS_M);
}

#[test]
fn round_trip_within_one_millimeter() {
    // ecef_to_geodetic ∘ geodetic_to_ecef = id for |h| ≤ 10 km
    for latitude_deg in [-89.0, -60.0, -45.2, -10.0, 0.0, 23.7, 45.0, 60.0, 89.0] {
        for longitude_deg in [-179.0, -90.0, -42.1, 0.0, 13.4, 90.0, 179.0] {
            for altitude_m in [-10_000.0, -1_000.0, 0.0, 150.8, 1_000.0, 10_000.0] {
                let geo = GeodeticCoords::new(latitude_deg, longitude_deg, altitude_m);
                let back = GeodeticCoords::from_ecef(&geo.to_ecef());

                let error_m = (back.to_ecef() - geo.to_ecef()).norm();

                assert!(
                    error_m < 1.0E-3,
                    "round trip failed for ({}, {}, {}): error={}m",
                    latitude_deg,
                    longitude_deg,
                    altitude_m,
                    error_m
                );
            }
        }
    }
}

#[test]
fn longitude_covers_all_quadrants() {
    let radius_m = WGS84_SEMI_MAJOR_AXIS_M;

    for (x, y, expected_deg) in [
        (radius_m, 0.0, 0.0),
        (0.0, radius_m, 90.0),
        (-radius_m, 0.0, 180.0),
        (0.0, -radius_m, -90.0),
    ] {
        let geo = GeodeticCoords::from_ecef(&Vector3::new(x, y, 0.0));
        assert!(
            (geo.longitude_deg - expected_deg).abs() < 1.0E-9,
            "wrong longitude for ({}, {}): {}",
            x,
            y,
            geo.longitude_deg
        );
    }
}
