use crate::{
    cfg::Config,
    solver::{NavigationSolver, SolverError},
    tests::init_logger,
};

use nalgebra::Vector3;

/// Regular tetrahedron vertices scaled to GPS orbit radius (26 600 km).
fn tetrahedron_constellation() -> Vec<Vector3<f64>> {
    let radius_m = 26_600_000.0;
    let scale = radius_m / 3.0_f64.sqrt();

    vec![
        Vector3::new(1.0, 1.0, 1.0) * scale,
        Vector3::new(1.0, -1.0, -1.0) * scale,
        Vector3::new(-1.0, 1.0, -1.0) * scale,
        Vector3::new(-1.0, -1.0, 1.0) * scale,
    ]
}

fn ranges_from(receiver_m: &Vector3<f64>, sats: &[Vector3<f64>]) -> Vec<f64> {
    sats.iter().map(|sat| (sat - receiver_m).norm()).collect()
}

#[test]
fn tetrahedron_regression() {
    init_logger();

    let solver = NavigationSolver::new(&Config::default());
    let sats = tetrahedron_constellation();

    // receiver on the equator, shifted east by 0 m, 10 m, 1 km
    for offset_m in [0.0, 10.0, 1_000.0] {
        let receiver_m = Vector3::new(6_378_137.0 + offset_m, 0.0, 0.0);
        let pseudoranges_m = ranges_from(&receiver_m, &sats);

        let solution = solver
            .resolve(159_000_000.0, &sats, &pseudoranges_m)
            .unwrap();

        let error_m = (solution.ecef_m - receiver_m).norm();

        assert!(
            error_m < 0.01,
            "solver off by {}m for offset {}m",
            error_m,
            offset_m
        );

        // exact ranges carry no clock bias
        assert!(solution.clock_bias_m.abs() < 0.01);
        assert_eq!(solution.n_satellites, 4);
    }
}

#[test]
fn receiver_clock_bias_is_recovered() {
    let solver = NavigationSolver::new(&Config::default());
    let sats = tetrahedron_constellation();

    let receiver_m = Vector3::new(6_378_137.0, 0.0, 0.0);
    let bias_m = 4_500.0; // 15 µs receiver clock offset

    let pseudoranges_m: Vec<f64> = ranges_from(&receiver_m, &sats)
        .iter()
        .map(|range_m| range_m + bias_m)
        .collect();

    let solution = solver
        .resolve(159_000_000.0, &sats, &pseudoranges_m)
        .unwrap();

    assert!((solution.ecef_m - receiver_m).norm() < 0.01);
    assert!((solution.clock_bias_m - bias_m).abs() < 0.01);
}

#[test]
fn geodetic_conversion_is_attached() {
    let solver = NavigationSolver::new(&Config::default());
    let sats = tetrahedron_constellation();

    let receiver_m = Vector3::new(6_378_137.0, 0.0, 0.0);
    let pseudoranges_m = ranges_from(&receiver_m, &sats);

    let solution = solver
        .resolve(159_000_000.0, &sats, &pseudoranges_m)
        .unwrap();

    assert!(solution.geodetic.latitude_deg.abs() < 1.0E-6);
    assert!(solution.geodetic.longitude_deg.abs() < 1.0E-6);
    assert!(solution.geodetic.altitude_m.abs() < 0.1);
}

#[test]
fn dilution_of_precision_is_coherent() {
    let solver = NavigationSolver::new(&Config::default());
    let sats = tetrahedron_constellation();

    let receiver_m = Vector3::new(6_378_137.0, 0.0, 0.0);
    let pseudoranges_m = ranges_from(&receiver_m, &sats);

    let solution = solver
        .resolve(159_000_000.0, &sats, &pseudoranges_m)
        .unwrap();

    assert!(solution.gdop.is_finite() && solution.gdop > 0.0);
    assert!(solution.pdop.is_finite() && solution.pdop > 0.0);
    assert!(solution.tdop.is_finite() && solution.tdop > 0.0);
    assert!(solution.gdop >= solution.pdop);
}

#[test]
fn three_satellites_are_not_enough() {
    let solver = NavigationSolver::new(&Config::default());
    let constellation = tetrahedron_constellation();
    let sats = &constellation[..3];

    let receiver_m = Vector3::new(6_378_137.0, 0.0, 0.0);
    let pseudoranges_m = ranges_from(&receiver_m, sats);

    assert_eq!(
        solver.resolve(159_000_000.0, sats, &pseudoranges_m),
        Err(SolverError::NotEnoughSatellites(3)),
    );
}

#[test]
fn degenerate_geometry_is_singular() {
    let solver = NavigationSolver::new(&Config::default());

    // four co-located satellites: the geometry matrix has rank 1
    let sat = Vector3::new(26_600_000.0, 0.0, 0.0);
    let sats = vec![sat, sat, sat, sat];
    let pseudoranges_m = vec![2.0E7; 4];

    assert_eq!(
        solver.resolve(159_000_000.0, &sats, &pseudoranges_m),
        Err(SolverError::SingularGeometry),
    );
}

#[test]
fn pathological_ranges_stay_bounded() {
    init_logger();

    let solver = NavigationSolver::new(&Config::default());
    let sats = tetrahedron_constellation();

    // nonsense pseudoranges: the fixed iteration budget must still
    // return a finite estimate (or reject the epoch), never hang or
    // overflow
    for pseudoranges_m in [
        vec![1_000.0, 1_000.0, 1_000.0, 1_000.0],
        vec![1.0, 2.0E7, 3.0E7, 5.0E5],
        vec![-1.0E7, 2.0E7, 2.0E7, 2.0E7],
    ] {
        match solver.resolve(159_000_000.0, &sats, &pseudoranges_m) {
            Ok(solution) => {
                assert!(solution.ecef_m[0].is_finite());
                assert!(solution.ecef_m[1].is_finite());
                assert!(solution.ecef_m[2].is_finite());
                assert!(solution.clock_bias_m.is_finite());
            },
            Err(error) => {
                // rejection is acceptable, divergence to non finite is not
                assert_eq!(error, SolverError::SingularGeometry);
            },
        }
    }
}
