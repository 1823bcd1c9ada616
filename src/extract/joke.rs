//! Multilingual "Gaou" joke extraction, used by the bot's joke loop.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use super::{AdapterError, StructuredClient, StructuredOutput};
use crate::llm::{ChatMessage, CompletionOptions};

/// Languages a joke may be told in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageTag {
    Nouchi,
    #[serde(rename = "Mooré")]
    Moore,
    Lingala,
    English,
    French,
    #[serde(rename = "Créole")]
    Creole,
    Spanish,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 7] = [
        LanguageTag::Nouchi,
        LanguageTag::Moore,
        LanguageTag::Lingala,
        LanguageTag::English,
        LanguageTag::French,
        LanguageTag::Creole,
        LanguageTag::Spanish,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LanguageTag::Nouchi => "Nouchi",
            LanguageTag::Moore => "Mooré",
            LanguageTag::Lingala => "Lingala",
            LanguageTag::English => "English",
            LanguageTag::French => "French",
            LanguageTag::Creole => "Créole",
            LanguageTag::Spanish => "Spanish",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeRecord {
    #[serde(alias = "friend_gaou_joke")]
    pub joke_text: String,
    pub language: LanguageTag,
}

const JOKE_FIELD_DESCRIPTION: &str = "The joke that qualifies the friend as a Gaou. The joke \
should be light and humorous as well as alternate between Nouchi, Mooré, Lingala, English, \
French, Créole and Spanish.";

impl StructuredOutput for JokeRecord {
    const NAME: &'static str = "JokeRecord";
    const DESCRIPTION: &'static str = "A light joke about a friend and the language it is told in.";

    fn json_schema() -> serde_json::Value {
        let languages: Vec<&str> = LanguageTag::ALL.iter().map(|l| l.label()).collect();
        json!({
            "title": "JokeRecord",
            "type": "object",
            "properties": {
                "joke_text": { "type": "string", "description": JOKE_FIELD_DESCRIPTION },
                "language": { "type": "string", "enum": languages }
            },
            "required": ["joke_text", "language"]
        })
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JokeOptionsError {
    #[error("temperature must be within [0, 2], got {0}")]
    Temperature(f32),
    #[error("max_output_tokens must be greater than 0")]
    MaxOutputTokens,
}

/// Sampling for joke requests: high variability, bounded length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JokeOptions {
    temperature: f32,
    pub max_output_tokens: u32,
}

impl JokeOptions {
    pub fn new(temperature: f32, max_output_tokens: u32) -> Result<Self, JokeOptionsError> {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(JokeOptionsError::Temperature(temperature));
        }
        if max_output_tokens == 0 {
            return Err(JokeOptionsError::MaxOutputTokens);
        }
        Ok(Self { temperature, max_output_tokens })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    fn completion(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_output_tokens),
        }
    }
}

impl Default for JokeOptions {
    fn default() -> Self {
        Self { temperature: 1.0, max_output_tokens: 1024 }
    }
}

// ── Request ──────────────────────────────────────────────────────────────────

/// System prompt for a joke about `subject`.
pub fn joke_system_prompt(subject: &str) -> String {
    format!(
        "The term 'Gaou' is a funny term, used only amongst friends. For example, {subject} is so Gaou!.\n\
         You will assist in qualifying a friend as a Gaou, based on the following criteria:\n\
         - The friend's name\n\
         - Make up a light joke which always ends up qualifying the friend as a Gaou\n\
         - Mix in some humor and sarcasm\n\
         - In a way Gaou means someone who is naive, gullible, or easily fooled but in a friendly way\n\
         - Use different languages out of one of the following: Mooré, English, French, Créole, Spanish etc."
    )
}

/// Ask the model for a [`JokeRecord`] about `subject`.
pub async fn extract_joke_record(
    client: &StructuredClient,
    subject: &str,
    options: &JokeOptions,
) -> Result<JokeRecord, AdapterError> {
    let messages = [ChatMessage::system(joke_system_prompt(subject)), ChatMessage::user(subject)];
    let joke: JokeRecord = client.create(&messages, &options.completion()).await?;
    info!(model = %client.model(), %subject, language = %joke.language, "joke extracted");
    Ok(joke)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionError;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::{LlmProvider, ModelId};

    fn client(provider: &DummyProvider) -> StructuredClient {
        StructuredClient::new(LlmProvider::Dummy(provider.clone()), ModelId::Gpt4o)
    }

    #[test]
    fn labels_match_wire_names() {
        for tag in LanguageTag::ALL {
            let wire = serde_json::to_value(tag).unwrap();
            assert_eq!(wire, tag.label());
            let back: LanguageTag = serde_json::from_value(wire).unwrap();
            assert_eq!(back, tag);
        }
    }

    #[test]
    fn unaccented_label_is_not_a_language() {
        assert!(serde_json::from_str::<LanguageTag>(r#""Moore""#).is_err());
    }

    #[test]
    fn options_bounds() {
        assert!(JokeOptions::new(0.0, 1).is_ok());
        assert!(JokeOptions::new(2.0, 1024).is_ok());
        assert_eq!(JokeOptions::new(-0.1, 1024), Err(JokeOptionsError::Temperature(-0.1)));
        assert!(JokeOptions::new(f32::NAN, 1024).is_err());
        assert_eq!(JokeOptions::new(1.0, 0), Err(JokeOptionsError::MaxOutputTokens));
        let d = JokeOptions::default();
        assert_eq!((d.temperature(), d.max_output_tokens), (1.0, 1024));
    }

    #[tokio::test]
    async fn joke_with_known_language() {
        let dummy = DummyProvider::replying(r#"{"joke_text":"Awa est tellement Gaou!","language":"French"}"#);
        let joke = extract_joke_record(&client(&dummy), "Awa", &JokeOptions::default())
            .await
            .unwrap();
        assert_eq!(joke.language, LanguageTag::French);
        assert!(joke.joke_text.contains("Awa"));
    }

    #[tokio::test]
    async fn original_field_name_is_accepted() {
        let dummy = DummyProvider::replying(r#"{"friend_gaou_joke":"Ka yaa Gaou","language":"Mooré"}"#);
        let joke = extract_joke_record(&client(&dummy), "Issa", &JokeOptions::default())
            .await
            .unwrap();
        assert_eq!(joke.language, LanguageTag::Moore);
        assert_eq!(joke.joke_text, "Ka yaa Gaou");
    }

    #[tokio::test]
    async fn out_of_set_language_fails() {
        let dummy = DummyProvider::replying(r#"{"joke_text":"Ha","language":"Klingon"}"#);
        let err = extract_joke_record(&client(&dummy), "Awa", &JokeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Extraction(ExtractionError::InvalidShape { .. })));
    }

    #[tokio::test]
    async fn request_carries_prompt_and_sampling() {
        let dummy = DummyProvider::replying(r#"{"joke_text":"x","language":"Spanish"}"#);
        let options = JokeOptions::new(2.0, 256).unwrap();
        extract_joke_record(&client(&dummy), "Kofi", &options).await.unwrap();

        let seen = dummy.requests();
        let request = &seen[0];
        assert_eq!(request.tool, "JokeRecord");
        assert!(request.messages[0].content.contains("Kofi is so Gaou!"));
        assert_eq!(request.messages[1], ChatMessage::user("Kofi"));
        assert_eq!(request.options.temperature, Some(2.0));
        assert_eq!(request.options.max_output_tokens, Some(256));
    }

    #[test]
    fn schema_enumerates_languages() {
        let schema = JokeRecord::json_schema();
        let values = schema["properties"]["language"]["enum"].as_array().unwrap();
        assert_eq!(values.len(), LanguageTag::ALL.len());
        assert!(values.iter().any(|v| v == "Créole"));
    }
}
