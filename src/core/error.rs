//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("discord error: {0}")]
    Discord(String),

    #[error("http server error: {0}")]
    Http(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("DISCORD_BOT_TOKEN is not set".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("DISCORD_BOT_TOKEN"));
    }

    #[test]
    fn discord_error_display() {
        let e = AppError::Discord("gateway closed".into());
        assert_eq!(e.to_string(), "discord error: gateway closed");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
