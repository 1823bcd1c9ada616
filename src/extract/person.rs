//! Person description extraction (`new_gaou`, `POST /gaou/{parametre}`).

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{AdapterError, BlockingStructuredClient, StructuredClient, StructuredOutput};
use crate::llm::{ChatMessage, CompletionOptions};

/// Told to the model before the user's text.
pub const LANGUAGE_HINT: &str = "The user may provide a prompt in their language of choice \
(such as english, french, creol, spanish etc.), so take that fact into account.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDescriptor {
    pub name: String,
    pub age: i64,
    pub is_teenager: bool,
    pub is_intelligent: bool,
}

impl StructuredOutput for PersonDescriptor {
    const NAME: &'static str = "PersonDescriptor";
    const DESCRIPTION: &'static str = "Description of the person the user talks about.";

    fn json_schema() -> serde_json::Value {
        json!({
            "title": "PersonDescriptor",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" },
                "is_teenager": { "type": "boolean" },
                "is_intelligent": { "type": "boolean" }
            },
            "required": ["name", "age", "is_teenager", "is_intelligent"]
        })
    }
}

/// Extract a [`PersonDescriptor`] from free text written in any language.
pub async fn extract_person_descriptor(
    client: &StructuredClient,
    free_text: &str,
) -> Result<PersonDescriptor, AdapterError> {
    let messages = [ChatMessage::system(LANGUAGE_HINT), ChatMessage::user(free_text)];
    let person: PersonDescriptor = client.create(&messages, &CompletionOptions::default()).await?;
    info!(model = %client.model(), name = %person.name, age = person.age, "person descriptor extracted");
    Ok(person)
}

/// Synchronous variant; sends the user's text alone, without the language hint.
pub fn extract_person_descriptor_blocking(
    client: &BlockingStructuredClient,
    free_text: &str,
) -> Result<PersonDescriptor, AdapterError> {
    client.create(&[ChatMessage::user(free_text)], &CompletionOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionError;
    use crate::llm::providers::dummy::DummyProvider;
    use crate::llm::{LlmProvider, ModelId, Role};

    fn client(provider: &DummyProvider) -> StructuredClient {
        StructuredClient::new(LlmProvider::Dummy(provider.clone()), ModelId::Gpt4o)
    }

    #[tokio::test]
    async fn matching_reply_becomes_a_record() {
        let dummy = DummyProvider::replying(
            r#"{"name":"Lambert","age":15,"is_teenager":true,"is_intelligent":true}"#,
        );
        let person = extract_person_descriptor(&client(&dummy), "Je suis Lambert, 15 ans.")
            .await
            .unwrap();
        assert_eq!(
            person,
            PersonDescriptor {
                name: "Lambert".into(),
                age: 15,
                is_teenager: true,
                is_intelligent: true,
            }
        );
    }

    #[tokio::test]
    async fn language_hint_precedes_user_text() {
        let dummy = DummyProvider::replying(
            r#"{"name":"A","age":1,"is_teenager":false,"is_intelligent":false}"#,
        );
        extract_person_descriptor(&client(&dummy), "hola").await.unwrap();
        let seen = dummy.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tool, "PersonDescriptor");
        assert_eq!(seen[0].messages[0].role, Role::System);
        assert_eq!(seen[0].messages[0].content, LANGUAGE_HINT);
        assert_eq!(seen[0].messages[1], ChatMessage::user("hola"));
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let dummy = DummyProvider::replying(r#"{"name":"Lambert","age":15,"is_teenager":true}"#);
        let err = extract_person_descriptor(&client(&dummy), "Lambert").await.unwrap_err();
        match err {
            AdapterError::Extraction(ExtractionError::InvalidShape { target, source }) => {
                assert_eq!(target, "PersonDescriptor");
                assert!(source.to_string().contains("is_intelligent"));
            }
            other => panic!("expected InvalidShape, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_rejected() {
        let dummy = DummyProvider::replying(
            r#"{"name":"Lambert","age":"fifteen","is_teenager":true,"is_intelligent":true}"#,
        );
        let err = extract_person_descriptor(&client(&dummy), "Lambert").await.unwrap_err();
        assert!(matches!(err, AdapterError::Extraction(_)));
    }

    #[tokio::test]
    async fn provider_failure_is_not_an_extraction_error() {
        let dummy = DummyProvider::failing("connection reset");
        let err = extract_person_descriptor(&client(&dummy), "Lambert").await.unwrap_err();
        assert!(matches!(err, AdapterError::Provider(_)));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(dummy.requests().len(), 1, "no retry");
    }

    #[test]
    fn schema_requires_every_field() {
        let schema = PersonDescriptor::json_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
        assert_eq!(schema["properties"]["age"]["type"], "integer");
    }
}
