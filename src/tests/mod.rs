//! integrated tests
mod coords;
mod navigation;
mod rtcm;
mod solver;

use log::LevelFilter;

use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}
