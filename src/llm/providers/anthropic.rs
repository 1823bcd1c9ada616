//! Anthropic messages provider (`/v1/messages`).
//!
//! System messages are lifted into the top-level `system` field; the target
//! shape is offered as the only tool and `tool_choice` pins it, so the reply
//! arrives as a `tool_use` block whose `input` is the structured record.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::config::AnthropicConfig;
use crate::llm::{ChatMessage, CompletionOptions, ModelId, OutputSchema, ProviderError, Role};

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_base_url: String,
    api_version: String,
    default_max_tokens: u32,
    model: ModelId,
    api_key: String,
}

impl AnthropicProvider {
    pub fn new(config: &AnthropicConfig, api_key: String, model: ModelId) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.endpoint.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config.endpoint.api_base_url.clone(),
            api_version: config.api_version.clone(),
            default_max_tokens: config.default_max_tokens,
            model,
            api_key,
        })
    }

    pub async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        options: &CompletionOptions,
    ) -> Result<Option<String>, ProviderError> {
        let payload = self.request_body(messages, schema, options);

        debug!(
            model = %self.model,
            tool = schema.name,
            max_tokens = payload.max_tokens,
            "sending structured LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| format!("{}: {}", env.error.kind, env.error.message))
                .unwrap_or(body);
            let message = format!("anthropic HTTP {status}: {detail}");
            error!(%status, %message, "LLM request returned HTTP error");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
                _ => ProviderError::Status { status, message },
            });
        }

        let parsed = response.json::<MessagesResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(stop_reason = ?parsed.stop_reason, blocks = parsed.content.len(), "received LLM response");

        Ok(parsed.content.into_iter().find_map(|block| match block {
            ContentBlock::ToolUse { name, input } if name == schema.name => Some(input.to_string()),
            _ => None,
        }))
    }

    fn request_body<'a>(
        &self,
        messages: &'a [ChatMessage],
        schema: &'a OutputSchema,
        options: &CompletionOptions,
    ) -> MessagesRequest<'a> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        MessagesRequest {
            model: self.model.as_str(),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| WireMessage { role: m.role, content: &m.content })
                .collect(),
            tools: [ToolDef {
                name: schema.name,
                description: schema.description,
                input_schema: &schema.schema,
            }],
            tool_choice: ToolChoice { kind: "tool", name: schema.name },
            max_tokens: options.max_output_tokens.unwrap_or(self.default_max_tokens),
            temperature: options.temperature,
        }
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage<'a>>,
    tools: [ToolDef<'a>; 1],
    tool_choice: ToolChoice<'a>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolDef<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}
