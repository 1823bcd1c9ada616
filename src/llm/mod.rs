//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations and
//! `providers::ProviderRegistry` maps each [`ModelId`] to the constructor of
//! its provider. Every provider answers a single structured round trip: the
//! model is forced to reply through one tool whose parameters are the target
//! JSON Schema, and the raw JSON arguments are handed back to the caller.
//!
//! Provider instances are built per request and dropped afterwards.

pub mod providers;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),
    #[error("missing credential for {provider}: set {env_var}")]
    MissingCredential { provider: &'static str, env_var: String },
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("{message}")]
    Status { status: reqwest::StatusCode, message: String },
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Model identifiers ─────────────────────────────────────────────────────────

/// The closed set of models a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelId {
    /// Anthropic `claude-3-opus-20240229`.
    Claude3Opus,
    /// OpenAI `gpt-4o`.
    Gpt4o,
    /// Groq-hosted `llama3-70b-8192`.
    Llama3_70b,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Claude3Opus, ModelId::Gpt4o, ModelId::Llama3_70b];

    /// Name sent to the provider in the request body.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Claude3Opus => "claude-3-opus-20240229",
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Llama3_70b => "llama3-70b-8192",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ProviderError::UnsupportedModel(s.to_string()))
    }
}

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Sampling knobs. `None` leaves the provider default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// Shape the provider must answer with, presented to it as a single tool.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema of the tool parameters.
    pub schema: serde_json::Value,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch keeps `complete_structured` an inherent `async fn`; adding a
/// backend means a new module, a new variant and a new match arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
    Anthropic(providers::anthropic::AnthropicProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// One structured round trip. Returns the raw JSON the model produced for
    /// `schema`, or `None` when it answered without using the tool.
    pub async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        options: &CompletionOptions,
    ) -> Result<Option<String>, ProviderError> {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.complete_structured(messages, schema, options).await,
            LlmProvider::Anthropic(p) => p.complete_structured(messages, schema, options).await,
            LlmProvider::Dummy(p) => p.complete_structured(messages, schema, options).await,
        }
    }

    /// Wire name of the backend, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(p) => p.label(),
            LlmProvider::Anthropic(_) => "anthropic",
            LlmProvider::Dummy(_) => "dummy",
        }
    }
}
