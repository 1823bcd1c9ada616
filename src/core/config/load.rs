//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies the `GAOU_LOG_LEVEL` override. Secrets (bot token, provider
//! API keys) are read from the environment only.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;
use crate::extract::JokeOptions;
use crate::llm::ModelId;

use super::raw::{self, RawConfig, RawProvider};
use super::types::*;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub const LOG_LEVEL_ENV: &str = "GAOU_LOG_LEVEL";
pub const DISCORD_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// Deep-merge two TOML values.
/// Tables are merged recursively; for every other type the overlay value
/// replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow its `[meta] base` chain, and return the merged
/// value. `visited` holds canonical paths already seen so cycles are caught.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay: toml::Value = toml::from_str(&text)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let base = overlay
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
        .map(|b| {
            if Path::new(b).is_absolute() {
                PathBuf::from(b)
            } else {
                path.parent().unwrap_or(Path::new(".")).join(b)
            }
        });

    match base {
        Some(base_path) => Ok(merge_toml(load_raw_merged(&base_path, visited)?, overlay)),
        None => Ok(overlay),
    }
}

/// Load config from `config_path`, or `config/default.toml` when present,
/// or built-in defaults otherwise. Reads secrets from the process environment.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let lookup = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

    if let Some(path) = config_path {
        return load_from(Path::new(path), &lookup);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &lookup)
    } else {
        resolve(RawConfig::default(), &lookup)
    }
}

/// Internal loader. `lookup` stands in for the process environment so tests
/// never mutate real env vars.
pub fn load_from(path: &Path, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Config, AppError> {
    let merged = load_raw_merged(path, &mut HashSet::new())?;
    let parsed: RawConfig = merged
        .try_into()
        .map_err(|e| AppError::Config(format!("invalid config in {}: {e}", path.display())))?;
    resolve(parsed, lookup)
}

fn resolve(raw: RawConfig, lookup: &dyn Fn(&str) -> Option<String>) -> Result<Config, AppError> {
    let log_level = lookup(LOG_LEVEL_ENV).unwrap_or(raw.service.log_level);

    let llm = LlmConfig {
        openai: resolve_provider(
            raw.llm.openai,
            raw::OPENAI_API_BASE_URL,
            raw::OPENAI_API_KEY_ENV,
            lookup,
        ),
        groq: resolve_provider(raw.llm.groq, raw::GROQ_API_BASE_URL, raw::GROQ_API_KEY_ENV, lookup),
        anthropic: {
            let a = raw.llm.anthropic;
            AnthropicConfig {
                endpoint: resolve_provider(
                    RawProvider {
                        api_base_url: a.api_base_url,
                        timeout_seconds: a.timeout_seconds,
                        api_key_env: a.api_key_env,
                    },
                    raw::ANTHROPIC_API_BASE_URL,
                    raw::ANTHROPIC_API_KEY_ENV,
                    lookup,
                ),
                api_version: a.api_version.unwrap_or_else(|| raw::ANTHROPIC_API_VERSION.to_string()),
                default_max_tokens: a.default_max_tokens.unwrap_or(raw::ANTHROPIC_DEFAULT_MAX_TOKENS),
            }
        },
    };

    let b = raw.bot;
    let jokes = b.jokes;
    if jokes.interval_minutes == 0 {
        return Err(AppError::Config("bot.jokes.interval_minutes must be greater than 0".into()));
    }
    let interval_secs = jokes.interval_minutes.checked_mul(60).ok_or_else(|| {
        AppError::Config(format!("bot.jokes.interval_minutes is too large: {}", jokes.interval_minutes))
    })?;
    let joke_options = JokeOptions::new(jokes.temperature, jokes.max_output_tokens)
        .map_err(|e| AppError::Config(format!("bot.jokes: {e}")))?;

    if b.moderation.warnings.is_empty() {
        return Err(AppError::Config("bot.moderation.warnings must hold at least one message".into()));
    }

    let bot = BotConfig {
        command_prefix: b.command_prefix,
        model: parse_model("bot.model", &b.model)?,
        message_trigger: TriggerConfig { on: b.message_trigger.on, reply: b.message_trigger.reply },
        edit_trigger: TriggerConfig { on: b.edit_trigger.on, reply: b.edit_trigger.reply },
        cleanup_delay: Duration::from_millis(b.cleanup_delay_ms),
        moderation: ModerationConfig {
            banned_words: b
                .moderation
                .banned_words
                .into_iter()
                .map(|w| w.to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            warnings: b.moderation.warnings,
            delay: Duration::from_secs(b.moderation.delay_seconds),
        },
        jokes: JokeLoopConfig {
            enabled: jokes.enabled,
            interval: Duration::from_secs(interval_secs),
            channel_name: jokes.channel_name,
            member_filters: jokes
                .member_filters
                .into_iter()
                .map(|f| f.to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
            pause: Duration::from_secs(jokes.pause_seconds),
            presence: jokes.presence,
            options: joke_options,
        },
    };

    let http = HttpConfig {
        bind: raw.http.bind,
        model: parse_model("http.model", &raw.http.model)?,
        debug: raw.http.debug,
    };

    Ok(Config {
        service_name: raw.service.name,
        log_level,
        llm,
        bot,
        http,
        discord_token: lookup(DISCORD_TOKEN_ENV),
    })
}

fn resolve_provider(
    raw: RawProvider,
    default_url: &str,
    default_key_env: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> ProviderConfig {
    let api_key_env = raw.api_key_env.unwrap_or_else(|| default_key_env.to_string());
    ProviderConfig {
        api_base_url: raw.api_base_url.unwrap_or_else(|| default_url.to_string()),
        timeout_seconds: raw.timeout_seconds.unwrap_or(raw::PROVIDER_TIMEOUT_SECONDS),
        api_key: lookup(&api_key_env),
        api_key_env,
    }
}

fn parse_model(field: &str, value: &str) -> Result<ModelId, AppError> {
    value
        .parse::<ModelId>()
        .map_err(|e| AppError::Config(format!("{field}: {e}")))
}

#[cfg(test)]
pub(super) fn resolve_defaults(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Config, AppError> {
    resolve(RawConfig::default(), lookup)
}
