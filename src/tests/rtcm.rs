use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::Message,
    rtcm::RtcmError,
    tests::init_logger,
};

use std::f64::consts::PI;

#[test]
fn gps_ephemeris_1019() {
    init_logger();

    let line = "<RTCM(1019, DF002=1019, DF009=5, DF076=60, DF077=0, DF078=1, \
                DF079=-1.2e-10, DF071=45, DF081=165600, DF082=0.0, DF083=-5.2e-12, \
                DF084=0.000345, DF085=45, DF086=-12.5, DF087=1.5e-09, DF088=0.5, \
                DF089=-6.5e-07, DF090=4096, DF091=7.8e-06, DF092=5153.79, \
                DF093=165600, DF094=-1.1e-07, DF095=0.25, DF096=9.3e-08, \
                DF097=0.3, DF098=210.8, DF099=-0.75, DF100=-2.6e-09, \
                DF101=4.6e-09, DF102=0, DF137=1)>";

    let message = Message::decode(line).unwrap().unwrap();

    let eph = match message {
        Message::Ephemeris(eph) => eph,
        message => panic!("wrong message decoded: {:?}", message),
    };

    assert_eq!(eph.satellite.prn, 5);
    assert_eq!(eph.week, 60);
    assert_eq!(eph.iode, 45);
    assert_eq!(eph.iodc, 45);
    assert_eq!(eph.toc_s, 165_600.0);
    assert_eq!(eph.toe_s, 165_600.0);

    // semicircle fields are rescaled by π at decode time
    assert!((eph.ma_rad - 0.5 * PI).abs() < 1e-12);
    assert!((eph.longan_rad - 0.25 * PI).abs() < 1e-12);
    assert!((eph.inc_rad - 0.3 * PI).abs() < 1e-12);
    assert!((eph.aop_rad - (-0.75 * PI)).abs() < 1e-12);

    // eccentricity is a raw 2⁻³³ scaled integer
    assert!((eph.ecc - 4096.0 / 8_589_934_592.0).abs() < 1e-18);

    // semi major axis is the squared broadcast sqrt(A)
    assert!((eph.sma_m - 5153.79 * 5153.79).abs() < 1e-6);

    assert!((eph.af0_s - 0.000345).abs() < 1e-12);
    assert!((eph.af1_s_s - (-5.2e-12)).abs() < 1e-20);
    assert_eq!(eph.af2_s_s2, 0.0);
    assert!((eph.tgd_s - 4.6e-09).abs() < 1e-15);

    assert!(eph.satellite_is_healthy());
    assert_eq!(eph.fit_interval, 1);
}

#[test]
fn msm4_1074_l1ca_filter_and_recomposition() {
    init_logger();

    // cell 2 is an L2 signal: it must not survive the filter
    let line = "<RTCM(1074, DF002=1074, DF003=0, DF004=159000000, NSat=2, \
                PRN_01=5, PRN_02=12, DF397_01=77, DF397_02=81, \
                DF398_01=0.000654, DF398_02=0.000112, NCell=3, \
                CELLPRN_01=5, CELLSIG_01=1C, CELLPRN_02=5, CELLSIG_02=2W, \
                CELLPRN_03=12, CELLSIG_03=1C, \
                DF400_01=3.1e-07, DF400_02=1.5e-07, DF400_03=-2.0e-07, \
                DF401_01=0.0001, DF401_02=0.0002, DF401_03=0.0003, \
                DF402_01=500, DF402_02=500, DF402_03=420, \
                DF403_01=45.0, DF403_02=41.0, DF403_03=39.0, \
                DF420_01=0, DF420_02=0, DF420_03=1)>";

    let message = Message::decode(line).unwrap().unwrap();

    let obs = match message {
        Message::Msm4Observations(obs) => obs,
        message => panic!("wrong message decoded: {:?}", message),
    };

    assert_eq!(obs.tow_ms, 159_000_000.0);
    assert_eq!(obs.prns, vec![5, 12]);

    // cell count rewritten to the L1-only count
    assert_eq!(obs.n_cell, 2);
    assert_eq!(obs.cells.len(), 2);
    assert_eq!(obs.cells[0].prn, 5);
    assert_eq!(obs.cells[1].prn, 12);

    // full pseudorange: c·(ms·1e-3) + mod1s + fine
    let expected_g05 = SPEED_OF_LIGHT_M_S * 0.077 + 0.000654 + 3.1e-07;
    let expected_g12 = SPEED_OF_LIGHT_M_S * 0.081 + 0.000112 - 2.0e-07;

    assert!((obs.cells[0].pseudorange_m - expected_g05).abs() < 1e-6);
    assert!((obs.cells[1].pseudorange_m - expected_g12).abs() < 1e-6);

    assert_eq!(obs.pseudorange_m(5), Some(obs.cells[0].pseudorange_m));
    assert_eq!(obs.pseudorange_m(12), Some(obs.cells[1].pseudorange_m));
    assert_eq!(obs.pseudorange_m(7), None);

    assert_eq!(obs.cells[1].lock_time, 420.0);
    assert_eq!(obs.cells[1].cnr_dbhz, 39.0);
    assert!(obs.cells[1].half_cycle_ambiguity);
    assert!(!obs.cells[0].half_cycle_ambiguity);
}

#[test]
fn msm4_invalid_components_are_marked() {
    // PRN 9 carries no rough range: its cell cannot be recomposed
    let line = "<RTCM(1074, DF002=1074, DF004=159000000, \
                PRN_01=9, DF398_01=0.000654, \
                CELLPRN_01=9, CELLSIG_01=1C, DF400_01=3.1e-07)>";

    let message = Message::decode(line).unwrap().unwrap();

    let obs = match message {
        Message::Msm4Observations(obs) => obs,
        message => panic!("wrong message decoded: {:?}", message),
    };

    assert_eq!(obs.n_cell, 1);
    assert_eq!(obs.cells[0].pseudorange_m, -1.0);
    assert_eq!(obs.pseudorange_m(9), None);
}

#[test]
fn legacy_1002() {
    init_logger();

    let line = "<RTCM(1002, DF002=1002, DF003=0, DF004=159000000, DF006=2, \
                DF009_01=5, DF011_01=1234.5, DF012_01=0.25, DF013_01=120, \
                DF014_01=77, DF015_01=45.0, \
                DF009_02=12, DF011_02=98765.4, DF012_02=-0.5, DF013_02=127, \
                DF014_02=81, DF015_02=41.5)>";

    let message = Message::decode(line).unwrap().unwrap();

    let obs = match message {
        Message::LegacyObservations(obs) => obs,
        message => panic!("wrong message decoded: {:?}", message),
    };

    assert_eq!(obs.tow_ms, 159_000_000.0);
    assert_eq!(obs.satellites.len(), 2);

    // full pseudorange: ambiguity · c/1000 + remainder
    let expected_g05 = 77.0 * SPEED_OF_LIGHT_M_S * 1.0E-3 + 1234.5;
    let expected_g12 = 81.0 * SPEED_OF_LIGHT_M_S * 1.0E-3 + 98_765.4;

    assert_eq!(obs.satellites[0].prn, 5);
    assert!((obs.satellites[0].pseudorange_m - expected_g05).abs() < 1e-6);
    assert_eq!(obs.satellites[1].prn, 12);
    assert!((obs.satellites[1].pseudorange_m - expected_g12).abs() < 1e-6);

    assert_eq!(obs.pseudorange_m(5), Some(obs.satellites[0].pseudorange_m));
    assert_eq!(obs.pseudorange_m(30), None);
}

#[test]
fn unsupported_types_are_skipped() {
    assert_eq!(Message::decode("<RTCM(1005, DF002=1005, DF003=0)>").unwrap(), None);
    assert_eq!(Message::decode("<RTCM(1020, DF002=1020)>").unwrap(), None);
    assert_eq!(Message::decode("").unwrap(), None);
    assert_eq!(Message::decode("   ").unwrap(), None);
    assert_eq!(Message::decode("# comment line").unwrap(), None);
}

#[test]
fn malformed_lines_are_rejected() {
    // no message type at all
    assert_eq!(
        Message::decode("<RTCM(DF003=0, DF004=1234)>"),
        Err(RtcmError::MissingMessageType),
    );

    // ephemeris without a satellite identifier
    assert_eq!(
        Message::decode("<RTCM(1019, DF002=1019, DF076=60)>"),
        Err(RtcmError::Malformed(1019)),
    );

    // out of range PRN
    assert_eq!(
        Message::decode("<RTCM(1019, DF002=1019, DF009=47)>"),
        Err(RtcmError::Malformed(1019)),
    );
}
