//! Logging utilities

pub use log::{debug, info, warn, error, trace};

use log::LevelFilter;

/// Initialize the logging system.
///
/// `RUST_LOG` wins when it is set; otherwise `level` (as written in the
/// config file, e.g. `"info"` or `"debug"`) becomes the global filter.
/// Unknown level names fall back to `info`.
pub fn init(level: &str) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(parse_level(level));
    }
    if let Err(e) = builder.try_init() {
        log::debug!("Logger already installed, keeping it: {}", e);
    }
}

/// Parse a config log level name
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn second_init_keeps_the_first_logger() {
        init("warn");
        let max = log::max_level();
        init("trace");
        assert_eq!(log::max_level(), max);
    }
}
