//! Structured extraction: the LLM adapter shared by the bot and the HTTP API.
//!
//! [`LlmAdapter`] turns a [`ModelId`] into a [`StructuredClient`] (or its
//! blocking twin) through the provider registry. A client sends role-tagged
//! messages together with the JSON Schema of a [`StructuredOutput`] type and
//! decodes the reply into that type; a reply that does not fit is an
//! [`ExtractionError`], never a partial record.
//!
//! Nothing here retries, caches or pools: every client is built for one
//! request and dropped afterwards.

pub mod joke;
pub mod person;

pub use joke::{JokeOptions, JokeOptionsError, JokeRecord, LanguageTag, extract_joke_record};
pub use person::{
    PersonDescriptor, extract_person_descriptor, extract_person_descriptor_blocking,
};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::llm::providers::ProviderRegistry;
use crate::llm::{ChatMessage, CompletionOptions, LlmProvider, ModelId, OutputSchema, ProviderError};

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model returned no structured {target} reply")]
    NoStructuredReply { target: &'static str },
    #[error("reply does not match {target}: {source}")]
    InvalidShape {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

// ── Target shapes ────────────────────────────────────────────────────────────

/// A record a model can be asked to produce.
pub trait StructuredOutput: DeserializeOwned + Serialize {
    /// Tool name presented to the model.
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    /// JSON Schema of the record.
    fn json_schema() -> serde_json::Value;

    fn output_schema() -> OutputSchema {
        OutputSchema {
            name: Self::NAME,
            description: Self::DESCRIPTION,
            schema: Self::json_schema(),
        }
    }
}

/// Decode a raw provider reply into `T`.
pub fn decode<T: StructuredOutput>(raw: Option<String>) -> Result<T, ExtractionError> {
    let raw = raw.ok_or(ExtractionError::NoStructuredReply { target: T::NAME })?;
    serde_json::from_str(&raw).map_err(|source| {
        warn!(target_shape = T::NAME, error = %source, "structured reply rejected");
        ExtractionError::InvalidShape { target: T::NAME, source }
    })
}

// ── Adapter ──────────────────────────────────────────────────────────────────

/// Selects and builds provider clients. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct LlmAdapter {
    registry: ProviderRegistry,
    config: LlmConfig,
}

impl LlmAdapter {
    pub fn new(registry: ProviderRegistry, config: LlmConfig) -> Self {
        Self { registry, config }
    }

    /// Adapter over the default registry.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(ProviderRegistry::with_defaults(), config.clone())
    }

    /// Async client for `model`.
    pub fn client(&self, model: ModelId) -> Result<StructuredClient, AdapterError> {
        let provider = self.registry.build(model, &self.config)?;
        Ok(StructuredClient { provider, model })
    }

    /// Synchronous client for `model`. Must not be called from inside an
    /// async runtime.
    pub fn blocking_client(&self, model: ModelId) -> Result<BlockingStructuredClient, AdapterError> {
        let inner = self.client(model)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to start client runtime: {e}")))?;
        Ok(BlockingStructuredClient { inner, runtime })
    }
}

/// A provider client wrapped with structured extraction.
#[derive(Debug, Clone)]
pub struct StructuredClient {
    provider: LlmProvider,
    model: ModelId,
}

impl StructuredClient {
    pub fn new(provider: LlmProvider, model: ModelId) -> Self {
        Self { provider, model }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Ask the model for a `T`.
    pub async fn create<T: StructuredOutput>(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<T, AdapterError> {
        let schema = T::output_schema();
        debug!(model = %self.model, target_shape = T::NAME, "structured request");
        let raw = self.provider.complete_structured(messages, &schema, options).await?;
        Ok(decode(raw)?)
    }
}

/// Blocking twin of [`StructuredClient`], driving it on a private
/// current-thread runtime.
#[derive(Debug)]
pub struct BlockingStructuredClient {
    inner: StructuredClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingStructuredClient {
    pub fn model(&self) -> ModelId {
        self.inner.model
    }

    pub fn create<T: StructuredOutput>(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<T, AdapterError> {
        self.runtime.block_on(self.inner.create(messages, options))
    }
}
