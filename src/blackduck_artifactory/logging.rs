//! Process-wide logger bootstrap.
//!
//! The library only emits through the `log` facade; binaries call
//! [`init_logging`] once to route records to stderr via `flexi_logger`.
//!
//! # Invariants
//! - Repeated calls with the same level are no-ops.
//! - A different level after initialization is rejected.

use crate::error::{BlackDuckError, Result};
use flexi_logger::{Logger, LoggerHandle};
use once_cell::sync::OnceCell;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

pub fn init_logging(level: &str) -> Result<()> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| BlackDuckError::Logging(format!("invalid log level `{level}`: {err}")))?
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start()
            .map_err(|err| BlackDuckError::Logging(format!("failed to start logger: {err}")))?;
        Ok(LoggingState {
            level,
            _logger: logger,
        })
    })?;

    if state.level != level {
        return Err(BlackDuckError::Logging(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        )));
    }
    Ok(())
}

pub fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(BlackDuckError::Logging(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("TRACE").unwrap(), "trace");
        assert_eq!(normalize_level(" info ").unwrap(), "info");
        assert_eq!(normalize_level("warning").unwrap(), "warn");
        assert_eq!(normalize_level("off").unwrap(), "off");
    }

    #[test]
    fn normalize_level_rejects_unknown_values() {
        assert!(matches!(
            normalize_level("verbose"),
            Err(BlackDuckError::Logging(_))
        ));
    }

    #[test]
    fn init_is_idempotent_and_rejects_level_switch() {
        init_logging("warn").unwrap();
        init_logging("WARN").unwrap();
        init_logging("warning").unwrap();
        assert!(init_logging("debug").is_err());
    }
}
