//! Handlers for the API routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::ApiState;
use crate::extract::{AdapterError, PersonDescriptor, extract_person_descriptor};

/// Body detail of a 500 when debug output is off.
const GENERIC_DETAIL: &str = "Internal Server Error";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(super) struct ApiError {
    detail: String,
}

impl ApiError {
    fn from_adapter(error: AdapterError, debug: bool) -> Self {
        warn!(error = %error, "gaou creation failed");
        let detail = if debug { error.to_string() } else { GENERIC_DETAIL.to_string() };
        Self { detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = json!({ "status_code": status.as_u16(), "detail": self.detail });
        (status, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

/// POST /gaou/{parametre}
pub(super) async fn create_gaou(
    State(state): State<ApiState>,
    Path(parametre): Path<String>,
) -> Result<Json<PersonDescriptor>, ApiError> {
    let result = async {
        let client = state.adapter.client(state.model)?;
        extract_person_descriptor(&client, &parametre).await
    }
    .await;

    let person = result.map_err(|e| ApiError::from_adapter(e, state.debug))?;
    info!(%parametre, name = %person.name, age = person.age, "new gaou created");
    Ok(Json(person))
}
