//! Logger setup for applications and tests using the crate.
//! The crate itself only writes through the `log` macros; nothing is printed until a logger is
//! installed.
use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Install a `SimpleLogger` writing to the terminal. Only the first call installs the logger;
/// returns false if a logger was already set.
pub fn init_logger(level: LevelFilter) -> bool {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .build();
    SimpleLogger::init(level, config).is_ok()
}
