//! OpenAI-compatible chat completion provider (`/chat/completions`).
//!
//! Serves both OpenAI and Groq, which expose the same wire format. The target
//! shape is sent as a single function tool and `tool_choice` forces the model
//! to call it; the function arguments are the structured reply. All wire
//! types are private to this module.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::config::ProviderConfig;
use crate::llm::{ChatMessage, CompletionOptions, ModelId, OutputSchema, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    label: &'static str,
    client: Client,
    api_base_url: String,
    model: ModelId,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    /// `label` names the backend in logs and errors (`"openai"`, `"groq"`).
    pub fn new(
        label: &'static str,
        endpoint: &ProviderConfig,
        api_key: String,
        model: ModelId,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            label,
            client,
            api_base_url: endpoint.api_base_url.clone(),
            model,
            api_key,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        options: &CompletionOptions,
    ) -> Result<Option<String>, ProviderError> {
        let payload = ChatCompletionRequest {
            model: self.model.as_str(),
            messages,
            tools: [Tool {
                kind: "function",
                function: FunctionDef {
                    name: schema.name,
                    description: schema.description,
                    parameters: &schema.schema,
                },
            }],
            tool_choice: ToolChoice {
                kind: "function",
                function: ToolChoiceFunction { name: schema.name },
            },
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
        };

        debug!(
            provider = self.label,
            model = %self.model,
            tool = schema.name,
            messages = messages.len(),
            temperature = ?options.temperature,
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
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.label, url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(self.label, response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(provider = self.label, error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(response = %json, "full LLM response payload");
        }

        let Some(message) = parsed.choices.into_iter().next().map(|c| c.message) else {
            debug!(provider = self.label, "response carried no choices");
            return Ok(None);
        };

        let from_tool = message
            .tool_calls
            .into_iter()
            .find(|call| call.function.name == schema.name)
            .map(|call| call.function.arguments);

        // Some compatible servers ignore `tool_choice` and answer in plain
        // content; that text is still handed to the decoder.
        let reply = from_tool.or_else(|| {
            message
                .content
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        });

        debug!(provider = self.label, structured = reply.is_some(), "received LLM response");
        Ok(reply)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'static str,
    messages: &'a [ChatMessage],
    tools: [Tool<'a>; 1],
    tool_choice: ToolChoice<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDef<'a>,
}

#[derive(Debug, Serialize)]
struct FunctionDef<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ToolCallFunction {
    name: String,
    /// JSON text, not an object.
    arguments: String,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<Value>,
}

/// Pass a successful response through, or map the HTTP error to a
/// [`ProviderError`] carrying the provider's own message.
async fn check_status(label: &str, response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(env) => {
            let code = env
                .error
                .code
                .map(|v| match v {
                    Value::String(s) => format!(" [code={s}]"),
                    other => format!(" [code={other}]"),
                })
                .unwrap_or_default();
            format!("{label} HTTP {status}{code}: {}", env.error.message)
        }
        Err(_) => format!("{label} HTTP {status}: {body}"),
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        _ => ProviderError::Status { status, message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(url: &str) -> ProviderConfig {
        ProviderConfig {
            api_base_url: url.to_string(),
            timeout_seconds: 5,
            api_key_env: "OPENAI_API_KEY".into(),
            api_key: Some("sk-test".into()),
        }
    }

    fn schema() -> OutputSchema {
        OutputSchema {
            name: "Thing",
            description: "a thing",
            schema: serde_json::json!({"type": "object", "properties": {"x": {"type": "integer"}}}),
        }
    }

    #[test]
    fn request_forces_the_tool() {
        let s = schema();
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let payload = ChatCompletionRequest {
            model: ModelId::Gpt4o.as_str(),
            messages: &messages,
            tools: [Tool {
                kind: "function",
                function: FunctionDef { name: s.name, description: s.description, parameters: &s.schema },
            }],
            tool_choice: ToolChoice { kind: "function", function: ToolChoiceFunction { name: s.name } },
            temperature: None,
            max_tokens: Some(1024),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "Thing");
        assert_eq!(json["tool_choice"]["function"]["name"], "Thing");
        assert_eq!(json["max_tokens"], 1024);
        assert!(json.get("temperature").is_none());
    }

    #[tokio::test]
    async fn tool_arguments_are_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"content":null,"tool_calls":[
                    {"id":"c1","type":"function","function":{"name":"Thing","arguments":"{\"x\":3}"}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let url = format!("{}/v1/chat/completions", server.url());
        let p = OpenAiCompatibleProvider::new("openai", &endpoint(&url), "sk-test".into(), ModelId::Gpt4o).unwrap();
        let reply = p
            .complete_structured(&[ChatMessage::user("hi")], &schema(), &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some(r#"{"x":3}"#));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_content_is_a_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"  {\"x\":1}  "}}]}"#)
            .create_async()
            .await;

        let url = format!("{}/chat", server.url());
        let p = OpenAiCompatibleProvider::new("groq", &endpoint(&url), "k".into(), ModelId::Llama3_70b).unwrap();
        let reply = p
            .complete_structured(&[ChatMessage::user("hi")], &schema(), &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some(r#"{"x":1}"#));
    }

    #[tokio::test]
    async fn http_errors_are_classified() {
        let mut server = mockito::Server::new_async().await;
        let _auth = server
            .mock("POST", "/auth")
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#)
            .create_async()
            .await;
        let _limit = server
            .mock("POST", "/limit")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;
        let _down = server
            .mock("POST", "/down")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let call = |path: &str| {
            let url = format!("{}{path}", server.url());
            async move {
                let p = OpenAiCompatibleProvider::new("openai", &endpoint(&url), "k".into(), ModelId::Gpt4o).unwrap();
                p.complete_structured(&[ChatMessage::user("hi")], &schema(), &CompletionOptions::default())
                    .await
            }
        };

        match call("/auth").await {
            Err(ProviderError::Auth(msg)) => {
                assert!(msg.contains("bad key"));
                assert!(msg.contains("invalid_api_key"));
            }
            other => panic!("expected Auth, got {other:?}"),
        }
        assert!(matches!(call("/limit").await, Err(ProviderError::RateLimited(_))));
        match call("/down").await {
            Err(ProviderError::Status { status, message }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(message.contains("upstream unavailable"), "{message}");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
