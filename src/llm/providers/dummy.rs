//! Dummy LLM provider. Answers every request with a scripted reply.
//! Used for exercising the extraction and service layers without an API key.

use std::sync::{Arc, Mutex};

use crate::llm::{ChatMessage, CompletionOptions, OutputSchema, ProviderError};

/// A request as the dummy provider saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool: &'static str,
    pub options: CompletionOptions,
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    NoToolCall,
    Fail(String),
}

/// Clones share the request log, so a test can keep one handle and hand
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct DummyProvider {
    script: Script,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl DummyProvider {
    /// Reply with `json` as the tool arguments.
    pub fn replying(json: impl Into<String>) -> Self {
        Self::with_script(Script::Reply(json.into()))
    }

    /// Answer without calling the tool.
    pub fn without_tool_call() -> Self {
        Self::with_script(Script::NoToolCall)
    }

    /// Fail every request with a transport error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Fail(message.into()))
    }

    fn with_script(script: Script) -> Self {
        Self { script, requests: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub async fn complete_structured(
        &self,
        messages: &[ChatMessage],
        schema: &OutputSchema,
        options: &CompletionOptions,
    ) -> Result<Option<String>, ProviderError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(RecordedRequest {
                messages: messages.to_vec(),
                tool: schema.name,
                options: *options,
            });
        }
        match &self.script {
            Script::Reply(json) => Ok(Some(json.clone())),
            Script::NoToolCall => Ok(None),
            Script::Fail(message) => Err(ProviderError::Request(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> OutputSchema {
        OutputSchema { name: "Thing", description: "", schema: json!({}) }
    }

    #[tokio::test]
    async fn replies_and_records() {
        let p = DummyProvider::replying(r#"{"x":1}"#);
        let handle = p.clone();
        let reply = p
            .complete_structured(&[ChatMessage::user("hello")], &schema(), &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some(r#"{"x":1}"#));
        let seen = handle.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tool, "Thing");
        assert_eq!(seen[0].messages, vec![ChatMessage::user("hello")]);
    }

    #[tokio::test]
    async fn failing_returns_request_error() {
        let p = DummyProvider::failing("boom");
        let err = p
            .complete_structured(&[], &schema(), &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn without_tool_call_returns_none() {
        let p = DummyProvider::without_tool_call();
        let reply = p
            .complete_structured(&[], &schema(), &CompletionOptions::default())
            .await
            .unwrap();
        assert!(reply.is_none());
    }
}
