//! Terminal logging for the binaries.

use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Runtime and test dependencies that flood Debug output. Shown only at Trace.
const NOISY_DEPENDENCIES: &[&str] = &["tokio", "mio", "dashmap", "mockall"];

pub struct Logger;

impl Logger {
    /// Installs a terminal logger at the configured level.
    ///
    /// Fails if a global logger is already set.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        TermLogger::init(
            level,
            Self::log_config(level),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    fn hides_dependencies(level: LevelFilter) -> bool {
        level < LevelFilter::Trace
    }

    fn log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if Self::hides_dependencies(level) {
            for dependency in NOISY_DEPENDENCIES {
                builder.add_filter_ignore_str(dependency);
            }
        }

        builder.build()
    }
}
