//! Document processing triggers.
//!
//! Both endpoints follow the same contract: validate, take the per-document
//! lease, flip the row to `processing`, acknowledge with 202, and continue
//! the actual model-calling work in a background task. Callers never block
//! on generation latency; they subscribe to row changes instead.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{extraction, scan};
use crate::store::DocumentState;

#[derive(Deserialize)]
pub struct ProcessDocumentRequest {
    pub document_id: Uuid,
    pub storage_path: String,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub additional_context: Option<String>,
}

/// `POST /process-document` — start the catalog scan (stage 1).
pub async fn process_document(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ProcessDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.storage_path.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing storage_path".into()));
    }

    let lease = ctx.leases.clone().acquire(payload.document_id).ok_or_else(|| {
        ApiError::Conflict(format!(
            "Document {} is already being processed",
            payload.document_id
        ))
    })?;

    // The row flips to processing before the ack so a subscriber created
    // right after upload sees the stage start.
    ctx.pipeline
        .store
        .update_document(
            payload.document_id,
            DocumentState::processing("webhook_trigger", "Iniciando procesamiento...")
                .into_patch(),
        )
        .await?;

    tracing::info!(document_id = %payload.document_id, "Catalog scan triggered");

    let document_id = payload.document_id;
    let pipeline = ctx.pipeline.clone();
    tokio::spawn(async move {
        let _lease = lease;
        scan::run(
            &pipeline,
            payload.document_id,
            &payload.storage_path,
            payload.target_language,
            payload.additional_context,
        )
        .await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "Processing started",
            "document_id": document_id,
        })),
    ))
}

#[derive(Deserialize)]
pub struct ExtractDetailsRequest {
    pub document_id: Uuid,
    pub storage_path: String,
    pub program_title: String,
    #[serde(default)]
    pub target_language: Option<String>,
}

/// `POST /extract-details` — start deep extraction (stage 2) for the
/// selected program.
pub async fn extract_details(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ExtractDetailsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.storage_path.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing storage_path".into()));
    }
    if payload.program_title.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing program_title".into()));
    }

    let lease = ctx.leases.clone().acquire(payload.document_id).ok_or_else(|| {
        ApiError::Conflict(format!(
            "Document {} is already being processed",
            payload.document_id
        ))
    })?;

    ctx.pipeline
        .store
        .update_document(
            payload.document_id,
            DocumentState::processing(
                "deep_extraction",
                &format!("Extrayendo detalles de {}...", payload.program_title),
            )
            .into_patch(),
        )
        .await?;

    tracing::info!(
        document_id = %payload.document_id,
        program = %payload.program_title,
        "Deep extraction triggered"
    );

    let document_id = payload.document_id;
    let program_title = payload.program_title.clone();
    let pipeline = ctx.pipeline.clone();
    tokio::spawn(async move {
        let _lease = lease;
        extraction::run(
            &pipeline,
            payload.document_id,
            &payload.storage_path,
            &payload.program_title,
            payload.target_language,
        )
        .await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "Deep extraction started",
            "document_id": document_id,
            "program_title": program_title,
        })),
    ))
}
