use env_logger::Builder;
use log::LevelFilter;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging with appropriate log level
///
/// Logs stay at Error unless LOG_LEVEL asks for more.
/// Usage: Call init_test_logging() at the beginning of each test file.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let level_filter = match std::env::var("LOG_LEVEL")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Error,
        };

        // try_init: another test binary helper may already own the logger
        let _ = Builder::from_default_env()
            .filter_level(level_filter)
            .is_test(true)
            .try_init();
    });
}
