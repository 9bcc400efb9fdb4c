use crate::{
    navigation::{Ephemeris, GpsHealth},
    prelude::Message,
};

use hifitime::{Epoch, TimeScale};

#[test]
fn toe_as_gpst_epoch() {
    let eph = Ephemeris {
        week: 2300,
        toe_s: 158_400.0,
        toc_s: 158_400.0,
        ..Default::default()
    };

    let expected = Epoch::from_time_of_week(2300, 158_400_000_000_000, TimeScale::GPST);
    assert_eq!(eph.toe_gpst(), expected);
    assert_eq!(eph.toc_gpst(), expected);
}

#[test]
fn broadcast_clock_polynomial() {
    let eph = Ephemeris {
        toc_s: 100_000.0,
        af0_s: 1.0E-4,
        af1_s_s: 1.0E-11,
        af2_s_s2: 0.0,
        ..Default::default()
    };

    // at ToC the offset is af0 (the dt refinement has nothing to bite on)
    let dt_s = eph.clock_correction(100_000.0, 2);
    assert!((dt_s - 1.0E-4).abs() < 1.0E-12);

    // one hour later the drift term contributes 3.6e-8 s
    let dt_s = eph.clock_correction(103_600.0, 2);
    assert!((dt_s - (1.0E-4 + 3_600.0 * 1.0E-11)).abs() < 1.0E-12);
}

#[test]
fn user_range_accuracy_table() {
    let mut eph = Ephemeris::default();

    for (index, expected_m) in [(0, 2.4), (6, 24.0), (7, 48.0), (14, 6144.0)] {
        eph.ura_index = index;
        assert_eq!(eph.ura_m(), expected_m);
    }

    eph.ura_index = 15;
    assert!(eph.ura_m().is_infinite());
}

#[test]
fn health_word_interpretation() {
    // DF102=32: summary bit raised
    let line = "<RTCM(1019, DF002=1019, DF009=11, DF076=60, DF092=5153.79, DF102=32)>";

    let eph = match Message::decode(line).unwrap().unwrap() {
        Message::Ephemeris(eph) => eph,
        message => panic!("wrong message decoded: {:?}", message),
    };

    assert!(eph.health.contains(GpsHealth::UNHEALTHY));
    assert!(!eph.satellite_is_healthy());
}

#[test]
fn fit_interval_validity_window() {
    let eph = Ephemeris {
        toe_s: 158_400.0,
        fit_interval: 0,
        ..Default::default()
    };

    assert!(eph.is_valid(158_400.0));
    assert!(eph.is_valid(158_400.0 + 7_100.0));
    assert!(!eph.is_valid(158_400.0 + 7_300.0));
    assert!(eph.is_valid(158_400.0 - 7_100.0));
}
