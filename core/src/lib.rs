use log::{LevelFilter, SetLoggerError};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use thiserror::Error;

pub mod constants;
pub mod equip_slot;
pub mod shortcuts;
pub mod types;
pub mod wire_cursor;

/// Failures while wiring up the log4rs backend.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid logger configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),

    #[error("logger already initialised: {0}")]
    AlreadySet(#[from] SetLoggerError),
}

/// Timestamp, level, emitting module and message, e.g.
/// `12:01:33.070 WARN  kitbag_client::sync::handler - Ignoring ...`.
const LOG_PATTERN: &str = "{d(%H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

fn log_encoder() -> Box<PatternEncoder> {
    Box::new(PatternEncoder::new(LOG_PATTERN))
}

/// Installs the process-wide logger.
///
/// Records at `log_level` and above go to stderr. When `file_path` is given,
/// the same records are also appended to that file.
///
/// # Arguments
/// * `log_level` - Threshold applied to the root logger and the stderr appender.
/// * `file_path` - Optional log file to append to.
///
/// # Returns
/// * `Ok(())` once the logger is installed, or the reason it could not be.
pub fn initialize_logger(log_level: LevelFilter, file_path: Option<&str>) -> Result<(), LoggerError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(log_encoder())
        .build();

    let mut config_builder = Config::builder();
    let mut root_builder = Root::builder();

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            .encoder(log_encoder())
            .build(path)
            .map_err(|source| LoggerError::File {
                path: path.to_string(),
                source,
            })?;

        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root_builder = root_builder.appender("logfile");
    }

    let config = config_builder
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(root_builder.appender("stderr").build(log_level))?;

    let _handle = log4rs::init_config(config)?;

    Ok(())
}

/// Parses a textual level ("info", "DEBUG", ...) into a filter.
///
/// Unknown strings fall back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_any_case() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
    }

    #[test]
    fn unusable_log_file_is_reported() {
        let blocker = std::env::temp_dir().join(format!("kitbag-log-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();
        let path = blocker.join("sync.log");

        let result = initialize_logger(LevelFilter::Info, path.to_str());
        assert!(matches!(result, Err(LoggerError::File { .. })));
        let _ = std::fs::remove_file(&blocker);
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
        assert_eq!(parse_level(""), LevelFilter::Info);
    }
}
