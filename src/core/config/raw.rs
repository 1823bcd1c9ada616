//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub service: RawService,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub bot: RawBot,
    #[serde(default)]
    pub http: RawHttp,
}

#[derive(Deserialize)]
pub(super) struct RawService {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self { name: default_service_name(), log_level: default_log_level() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawLlm {
    #[serde(default)]
    pub openai: RawProvider,
    #[serde(default)]
    pub groq: RawProvider,
    #[serde(default)]
    pub anthropic: RawAnthropic,
}

/// One provider endpoint. Fields left out of the TOML keep the provider's own
/// default, so a section may override only `timeout_seconds`.
#[derive(Deserialize, Default)]
pub(super) struct RawProvider {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub api_key_env: Option<String>,
}

#[derive(Deserialize, Default)]
pub(super) struct RawAnthropic {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub api_key_env: Option<String>,
    pub api_version: Option<String>,
    pub default_max_tokens: Option<u32>,
}

pub(super) const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub(super) const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub(super) const GROQ_API_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub(super) const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub(super) const ANTHROPIC_API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
pub(super) const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub(super) const ANTHROPIC_API_VERSION: &str = "2023-06-01";
pub(super) const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4096;
pub(super) const PROVIDER_TIMEOUT_SECONDS: u64 = 60;

// ── Bot ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawBot {
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_bot_model")]
    pub model: String,
    #[serde(default = "RawTrigger::message")]
    pub message_trigger: RawTrigger,
    #[serde(default = "RawTrigger::edit")]
    pub edit_trigger: RawTrigger,
    #[serde(default = "default_cleanup_delay_ms")]
    pub cleanup_delay_ms: u64,
    #[serde(default)]
    pub moderation: RawModeration,
    #[serde(default)]
    pub jokes: RawJokes,
}

impl Default for RawBot {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            model: default_bot_model(),
            message_trigger: RawTrigger::message(),
            edit_trigger: RawTrigger::edit(),
            cleanup_delay_ms: default_cleanup_delay_ms(),
            moderation: RawModeration::default(),
            jokes: RawJokes::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawTrigger {
    pub on: String,
    pub reply: String,
}

impl RawTrigger {
    fn message() -> Self {
        Self { on: "pingGG".into(), reply: "pongGG".into() }
    }

    fn edit() -> Self {
        Self { on: "ping".into(), reply: "pong".into() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawModeration {
    #[serde(default = "default_banned_words")]
    pub banned_words: Vec<String>,
    #[serde(default = "default_warnings")]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub delay_seconds: u64,
}

impl Default for RawModeration {
    fn default() -> Self {
        Self {
            banned_words: default_banned_words(),
            warnings: default_warnings(),
            delay_seconds: 0,
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawJokes {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_joke_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_joke_channel")]
    pub channel_name: String,
    #[serde(default)]
    pub member_filters: Vec<String>,
    #[serde(default = "default_joke_pause_seconds")]
    pub pause_seconds: u64,
    #[serde(default = "default_presence")]
    pub presence: String,
    #[serde(default = "default_joke_temperature")]
    pub temperature: f32,
    #[serde(default = "default_joke_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for RawJokes {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: default_joke_interval_minutes(),
            channel_name: default_joke_channel(),
            member_filters: Vec::new(),
            pause_seconds: default_joke_pause_seconds(),
            presence: default_presence(),
            temperature: default_joke_temperature(),
            max_output_tokens: default_joke_max_output_tokens(),
        }
    }
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_http_bind")]
    pub bind: String,
    #[serde(default = "default_http_model")]
    pub model: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for RawHttp {
    fn default() -> Self {
        Self { bind: default_http_bind(), model: default_http_model(), debug: false }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_service_name() -> String { "gaou".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_command_prefix() -> String { "?".to_string() }
fn default_bot_model() -> String { "gpt-4o".to_string() }
fn default_cleanup_delay_ms() -> u64 { 1000 }
fn default_banned_words() -> Vec<String> {
    vec!["slur1".into(), "slur2".into(), "swear1".into()]
}
fn default_warnings() -> Vec<String> {
    vec!["{mention} Please do not use that word.".into()]
}
fn default_joke_interval_minutes() -> u64 { 16 }
fn default_joke_channel() -> String { "botexperiments".to_string() }
fn default_joke_pause_seconds() -> u64 { 10 }
fn default_presence() -> String { "with Gaous".to_string() }
fn default_joke_temperature() -> f32 { 1.0 }
fn default_joke_max_output_tokens() -> u32 { 1024 }
pub(super) fn default_http_bind() -> String { "0.0.0.0:8000".to_string() }
fn default_http_model() -> String { "llama3-70b-8192".to_string() }
