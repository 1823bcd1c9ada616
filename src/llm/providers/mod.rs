//! LLM provider implementations and the model registry.
//!
//! [`ProviderRegistry::with_defaults`] is the factory table used at startup:
//! one constructor per [`ModelId`]. Adding a provider = new module + one
//! `register` line.

pub mod anthropic;
pub mod dummy;
pub mod openai_compatible;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{LlmConfig, ProviderConfig};
use crate::llm::{LlmProvider, ModelId, ProviderError};

/// Constructor registered for a model.
pub type ProviderFactory =
    Arc<dyn Fn(ModelId, &LlmConfig) -> Result<LlmProvider, ProviderError> + Send + Sync>;

/// Maps each model identifier to the constructor of its provider client.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<ModelId, ProviderFactory>,
}

impl ProviderRegistry {
    /// An empty registry; every `build` fails until models are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claude → Anthropic, GPT → OpenAI, Llama → Groq.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(ModelId::Claude3Opus, build_anthropic)
            .register(ModelId::Gpt4o, build_openai)
            .register(ModelId::Llama3_70b, build_groq);
        registry
    }

    /// Register (or replace) the constructor for `model`.
    pub fn register<F>(&mut self, model: ModelId, factory: F) -> &mut Self
    where
        F: Fn(ModelId, &LlmConfig) -> Result<LlmProvider, ProviderError> + Send + Sync + 'static,
    {
        self.factories.insert(model, Arc::new(factory));
        self
    }

    pub fn contains(&self, model: ModelId) -> bool {
        self.factories.contains_key(&model)
    }

    /// Construct a fresh provider client for `model`.
    pub fn build(&self, model: ModelId, config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
        let factory = self
            .factories
            .get(&model)
            .ok_or_else(|| ProviderError::UnsupportedModel(model.to_string()))?;
        let provider = factory(model, config)?;
        debug!(%model, provider = provider.kind(), "provider client built");
        Ok(provider)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut models: Vec<&str> = self.factories.keys().map(|m| m.as_str()).collect();
        models.sort_unstable();
        f.debug_struct("ProviderRegistry").field("models", &models).finish()
    }
}

fn build_openai(model: ModelId, config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
    let key = require_key("openai", &config.openai)?;
    openai_compatible::OpenAiCompatibleProvider::new("openai", &config.openai, key, model)
        .map(LlmProvider::OpenAiCompatible)
}

fn build_groq(model: ModelId, config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
    let key = require_key("groq", &config.groq)?;
    openai_compatible::OpenAiCompatibleProvider::new("groq", &config.groq, key, model)
        .map(LlmProvider::OpenAiCompatible)
}

fn build_anthropic(model: ModelId, config: &LlmConfig) -> Result<LlmProvider, ProviderError> {
    let key = require_key("anthropic", &config.anthropic.endpoint)?;
    anthropic::AnthropicProvider::new(&config.anthropic, key, model).map(LlmProvider::Anthropic)
}

fn require_key(provider: &'static str, endpoint: &ProviderConfig) -> Result<String, ProviderError> {
    endpoint.api_key.clone().ok_or_else(|| ProviderError::MissingCredential {
        provider,
        env_var: endpoint.api_key_env.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn defaults_cover_every_model() {
        let registry = ProviderRegistry::with_defaults();
        let config = Config::test_default();
        for model in ModelId::ALL {
            assert!(registry.contains(model));
            assert!(registry.build(model, &config.llm).is_ok(), "{model} should build");
        }
    }

    #[test]
    fn default_routing_by_provider() {
        let registry = ProviderRegistry::with_defaults();
        let config = Config::test_default();
        let kind = |m| registry.build(m, &config.llm).unwrap().kind();
        assert_eq!(kind(ModelId::Claude3Opus), "anthropic");
        assert_eq!(kind(ModelId::Gpt4o), "openai");
        assert_eq!(kind(ModelId::Llama3_70b), "groq");
    }

    #[test]
    fn unregistered_model_is_unsupported() {
        let registry = ProviderRegistry::new();
        let config = Config::test_default();
        match registry.build(ModelId::Gpt4o, &config.llm) {
            Err(ProviderError::UnsupportedModel(name)) => assert_eq!(name, "gpt-4o"),
            other => panic!("expected UnsupportedModel, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_reported_with_env_var() {
        let registry = ProviderRegistry::with_defaults();
        let mut config = Config::test_default();
        config.llm.groq.api_key = None;
        match registry.build(ModelId::Llama3_70b, &config.llm) {
            Err(ProviderError::MissingCredential { provider, env_var }) => {
                assert_eq!(provider, "groq");
                assert_eq!(env_var, "GROQ_API_KEY");
            }
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn register_replaces_constructor() {
        let mut registry = ProviderRegistry::with_defaults();
        registry.register(ModelId::Gpt4o, |_, _| {
            Ok(LlmProvider::Dummy(dummy::DummyProvider::replying("{}")))
        });
        let config = Config::test_default();
        assert_eq!(registry.build(ModelId::Gpt4o, &config.llm).unwrap().kind(), "dummy");
    }

    #[test]
    fn debug_lists_models() {
        let text = format!("{:?}", ProviderRegistry::with_defaults());
        assert!(text.contains("gpt-4o"));
        assert!(text.contains("llama3-70b-8192"));
    }
}
