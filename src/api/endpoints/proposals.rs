//! Proposal generation and edit triggers.
//!
//! Unlike the document stages these run synchronously inside the
//! invocation: generation persists its terminal status before responding,
//! and edits return their outcome directly. Generation answers 200 even on
//! failure (the error already lives in `content.error`, which is what the
//! UI renders), while edits answer 400 with an error payload and leave the
//! row untouched.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::types::ApiContext;
use crate::pipeline::editing::{self, TargetElement};
use crate::pipeline::generation::{self, GenerationOptions};

#[derive(Deserialize)]
pub struct GenerateProposalRequest {
    pub proposal_id: Uuid,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

/// `POST /generate-proposal`.
pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(payload): Json<GenerateProposalRequest>,
) -> impl IntoResponse {
    let options = payload.options.unwrap_or_default();
    match generation::run(&ctx.pipeline, payload.proposal_id, options).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        ),
        Err(error) => (
            StatusCode::OK,
            Json(serde_json::json!({ "error": error.to_string() })),
        ),
    }
}

#[derive(Deserialize)]
pub struct EditProposalRequest {
    pub proposal_id: Uuid,
    pub instruction: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub target_element: Option<TargetElement>,
}

/// `POST /edit-proposal`.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Json(payload): Json<EditProposalRequest>,
) -> impl IntoResponse {
    if payload.instruction.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Missing instruction" })),
        );
    }

    match editing::run(
        &ctx.pipeline,
        payload.proposal_id,
        &payload.instruction,
        &payload.images,
        payload.target_element.as_ref(),
    )
    .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        ),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": error.to_string() })),
        ),
    }
}
