//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies the `GAOU_LOG_LEVEL` override and reads secrets
//! (`DISCORD_BOT_TOKEN`, provider API keys) from the environment.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs consumed by the services
//!   (`Config`, `LlmConfig`, `BotConfig`, `HttpConfig`, …).
//! - **raw** — Raw TOML deserialization types. These mirror the file shape
//!   and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`.

mod load;
mod raw;
mod types;

pub use load::{DEFAULT_CONFIG_PATH, DISCORD_TOKEN_ENV, LOG_LEVEL_ENV, load, load_from};
pub use types::*;

#[cfg(test)]
impl Config {
    /// Defaults with a fake key for every provider and no bot token.
    pub fn test_default() -> Self {
        load::resolve_defaults(&|key: &str| key.ends_with("_API_KEY").then(|| "test-key".to_string()))
            .expect("built-in defaults are valid")
    }
}
