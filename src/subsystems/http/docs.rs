//! Self-describing API: an OpenAPI 3.1 document and a RapiDoc page that
//! renders it.

use axum::Json;
use axum::response::Html;
use serde_json::{Value, json};

use crate::extract::{PersonDescriptor, StructuredOutput};

pub const API_TITLE: &str = "Gaou API";
pub const API_DESCRIPTION: &str = "API pour créer des Gaous";
pub const API_VERSION: &str = "0.1.0";

const RAPIDOC_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Gaou API</title>
  <script type="module" src="https://unpkg.com/rapidoc/dist/rapidoc-min.js"></script>
</head>
<body>
  <rapi-doc spec-url="/docs/openapi.json" render-style="read" show-header="false"></rapi-doc>
</body>
</html>
"#;

/// GET /docs
pub(super) async fn page() -> Html<&'static str> {
    Html(RAPIDOC_PAGE)
}

/// GET /docs/openapi.json
pub(super) async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

/// OpenAPI document; the person schema is the one sent to the model.
pub fn openapi_document() -> Value {
    let error_schema = json!({
        "type": "object",
        "properties": {
            "status_code": { "type": "integer" },
            "detail": { "type": "string" }
        },
        "required": ["status_code", "detail"]
    });

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "description": API_DESCRIPTION,
            "version": API_VERSION
        },
        "paths": {
            "/": {
                "get": {
                    "operationId": "ReadRoot",
                    "summary": "ReadRoot",
                    "responses": {
                        "200": {
                            "description": "Request fulfilled, document follows",
                            "content": { "application/json": { "schema": { "type": "object" } } }
                        }
                    }
                }
            },
            "/gaou/{parametre}": {
                "post": {
                    "operationId": "CreerGaou",
                    "summary": "CreerGaou",
                    "parameters": [{
                        "name": "parametre",
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": {
                            "description": "Person described by the parameter",
                            "content": { "application/json": {
                                "schema": { "$ref": "#/components/schemas/PersonDescriptor" }
                            } }
                        },
                        "500": {
                            "description": "Extraction failed",
                            "content": { "application/json": {
                                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                            } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                (PersonDescriptor::NAME): PersonDescriptor::json_schema(),
                "ErrorResponse": error_schema
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_describes_both_routes() {
        let doc = openapi_document();
        assert_eq!(doc["openapi"], "3.1.0");
        assert_eq!(doc["info"]["title"], "Gaou API");
        assert_eq!(doc["info"]["version"], "0.1.0");
        assert!(doc["paths"]["/"]["get"].is_object());
        assert_eq!(doc["paths"]["/gaou/{parametre}"]["post"]["parameters"][0]["in"], "path");
    }

    #[test]
    fn person_schema_is_shared_with_extraction() {
        let doc = openapi_document();
        assert_eq!(doc["components"]["schemas"]["PersonDescriptor"], PersonDescriptor::json_schema());
    }

    #[test]
    fn page_points_at_the_document() {
        assert!(RAPIDOC_PAGE.contains(r#"spec-url="/docs/openapi.json""#));
    }
}
