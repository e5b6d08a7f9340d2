pub mod blocks;
pub mod briefing;
pub mod editing;
pub mod extraction;
pub mod gemini;
pub mod generation;
pub mod language;
pub mod lease;
pub mod parser;
pub mod prompts;
pub mod scan;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::store::{DocumentState, Store};

use gemini::{GenerateRequest, GenerativeClient};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach the generative API at {0}")]
    Connection(String),

    #[error("Generative API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Generative API call timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model response contained no candidates")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Generative model error: {0}")]
    Llm(#[from] LlmError),

    #[error("Invalid AI response: {0}")]
    InvalidAiResponse(String),

    #[error("Document has no briefing yet")]
    MissingBriefing,

    #[error("Proposal has no editable sections")]
    MissingSections,
}

/// Shared dependencies for every pipeline stage: the store, the generative
/// client, and the wall-clock deadline for document-stage model calls.
pub struct PipelineContext {
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn GenerativeClient>,
    pub llm_timeout: Duration,
}

impl PipelineContext {
    pub fn new(
        store: Arc<dyn Store>,
        llm: Arc<dyn GenerativeClient>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            store,
            llm,
            llm_timeout,
        }
    }
}

/// Model call raced against the document-stage deadline. On expiry the
/// whole stage fails; no partial output is kept.
pub(crate) async fn generate_with_deadline(
    ctx: &PipelineContext,
    request: GenerateRequest,
) -> Result<String, PipelineError> {
    match tokio::time::timeout(ctx.llm_timeout, ctx.llm.generate(request)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(LlmError::Timeout(ctx.llm_timeout.as_secs()).into()),
    }
}

/// Record a failed document stage on the row. If even the error write
/// fails, the failure is logged and swallowed; there is no further
/// fallback channel.
pub(crate) async fn mark_document_failed(
    store: &dyn Store,
    document_id: Uuid,
    error: &PipelineError,
) {
    tracing::error!(document_id = %document_id, error = %error, "Document stage failed");
    let patch = DocumentState::Error {
        message: error.to_string(),
    }
    .into_patch();
    if let Err(db_error) = store.update_document(document_id, patch).await {
        tracing::error!(
            document_id = %document_id,
            error = %db_error,
            "Could not record error state on document"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::store::{DocumentRow, DocumentStatus, MockStore};

    struct SlowClient;

    #[async_trait]
    impl GenerativeClient for SlowClient {
        async fn generate(&self, _request: GenerateRequest) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".into())
        }
    }

    fn pending_document(id: Uuid) -> DocumentRow {
        DocumentRow {
            id,
            agency_id: None,
            file_name: None,
            storage_path: "docs/x.pdf".into(),
            status: DocumentStatus::Processing,
            briefing: None,
            available_programs: None,
            output_language: None,
            additional_context: None,
            processing_error: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn deadline_cuts_off_slow_model_calls() {
        let ctx = PipelineContext::new(
            Arc::new(MockStore::new()),
            Arc::new(SlowClient),
            Duration::from_millis(20),
        );

        let err = generate_with_deadline(
            &ctx,
            GenerateRequest {
                system: String::new(),
                prompt: String::new(),
                pdf: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Llm(LlmError::Timeout(_))));
    }

    #[tokio::test]
    async fn mark_failed_writes_error_state() {
        let store = MockStore::new();
        let id = Uuid::new_v4();
        store.seed_document(pending_document(id));

        let error = PipelineError::InvalidAiResponse("no JSON".into());
        mark_document_failed(&store, id, &error).await;

        let row = store.document(id).unwrap();
        assert_eq!(row.status, DocumentStatus::Error);
        assert!(row.processing_error.unwrap().contains("no JSON"));
    }
}
