//! Resolved configuration types consumed by the services.

use std::time::Duration;

use crate::extract::JokeOptions;
use crate::llm::ModelId;

/// Connection settings for one provider endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Full endpoint URL (`.../chat/completions` or `.../v1/messages`).
    pub api_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Name of the environment variable the API key was read from.
    pub api_key_env: String,
    /// API key, read from `api_key_env` at load time. Never sourced from TOML.
    pub api_key: Option<String>,
}

/// Anthropic messages API settings (`[llm.anthropic]`).
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub endpoint: ProviderConfig,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    /// `max_tokens` is mandatory for this API; used when a request sets none.
    pub default_max_tokens: u32,
}

/// Provider sections under `[llm]`.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai: ProviderConfig,
    pub groq: ProviderConfig,
    pub anthropic: AnthropicConfig,
}

/// An exact-match text trigger and its fixed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub on: String,
    pub reply: String,
}

/// Banned-word moderation (`[bot.moderation]`).
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Already lower-cased.
    pub banned_words: Vec<String>,
    /// Warning templates; `{mention}` is replaced with the author mention.
    pub warnings: Vec<String>,
    /// Pause before deleting and before warning.
    pub delay: Duration,
}

/// Periodic joke posting (`[bot.jokes]`).
#[derive(Debug, Clone)]
pub struct JokeLoopConfig {
    pub enabled: bool,
    pub interval: Duration,
    /// Text channels with exactly this name are visited.
    pub channel_name: String,
    /// Lower-cased substrings matched against member display names.
    pub member_filters: Vec<String>,
    /// Pause between two jokes of the same round.
    pub pause: Duration,
    /// "Playing …" presence set at the start of each round.
    pub presence: String,
    pub options: JokeOptions,
}

/// Chat-bot surface (`[bot]`).
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub command_prefix: String,
    /// Model used by `new_gaou` and the joke loop.
    pub model: ModelId,
    /// Fixed reply to a new message.
    pub message_trigger: TriggerConfig,
    /// Fixed reply to an edited message.
    pub edit_trigger: TriggerConfig,
    /// Pause before each deletion during cleanup.
    pub cleanup_delay: Duration,
    pub moderation: ModerationConfig,
    pub jokes: JokeLoopConfig,
}

/// HTTP surface (`[http]`).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind: String,
    pub model: ModelId,
    /// Expose adapter error text in 500 responses.
    pub debug: bool,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    pub llm: LlmConfig,
    pub bot: BotConfig,
    pub http: HttpConfig,
    /// From `DISCORD_BOT_TOKEN`; required only by the bot binary.
    pub discord_token: Option<String>,
}
