//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the config and CLI flags are resolved.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// `level` is either a bare level (`"info"`) or a full filter directive
/// (`"gaou_bot=debug,serenity=warn"`). It always wins over `RUST_LOG`, which
/// is only consulted when `level` does not parse.
pub fn init(level: &str) -> Result<(), AppError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    EnvFilter::try_new(level).or_else(|level_err| match rust_log {
        Some(directives) => EnvFilter::try_new(directives).map_err(|env_err| {
            AppError::Logger(format!(
                "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
            ))
        }),
        None => Err(AppError::Logger(format!("invalid log level '{level}': {level_err}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn resolved_level_beats_rust_log() {
        let filter = build_filter("debug", Some("warn")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn directive_level_is_accepted() {
        let filter = build_filter("gaou_bot=trace,serenity=warn", None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn rust_log_is_the_fallback_for_a_bad_level() {
        let filter = build_filter("gaou_bot=loud", Some("error")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn bad_level_without_fallback_errors() {
        let err = build_filter("gaou_bot=loud", None).unwrap_err();
        assert!(err.to_string().contains("gaou_bot=loud"));
        assert!(build_filter("gaou_bot=loud", Some("also=bad")).is_err());
    }

    #[test]
    fn init_succeeds_or_already_init() {
        // Another test in this process may have installed a subscriber already.
        match init("info") {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
