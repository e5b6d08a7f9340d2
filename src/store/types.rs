//! Row types, status machines and the store trait.
//!
//! Every pipeline write goes through [`DocumentState`] / the patch structs:
//! a stage computes its full output first, then issues a single update, so a
//! row is never left half-written. Patches serialize only the fields they
//! set; each write is a full-field last-writer-wins replacement keyed by
//! primary id, with no optimistic-concurrency check.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::briefing::{Briefing, CommercialAsset, ProgramSummary};

use super::StoreError;

// ── Status machines ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Processed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Processing,
    Ready,
    Error,
}

/// Progress ping stored in the document's `metadata` column; the UI renders
/// `message` live while a stage runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetadata {
    pub stage: String,
    pub message: String,
    pub updated_at: String,
}

impl StageMetadata {
    pub fn now(stage: &str, message: &str) -> Self {
        Self {
            stage: stage.to_string(),
            message: message.to_string(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Explicit document state machine.
///
/// The wire format stays the stringly `status` column plus `metadata` /
/// `processing_error`, but pipeline code only speaks in these variants and
/// converts with [`DocumentState::into_patch`], so a match over stages is
/// exhaustive at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    Pending,
    Processing { stage: String, message: String },
    Processed { message: String },
    Error { message: String },
}

impl DocumentState {
    pub fn processing(stage: &str, message: &str) -> Self {
        DocumentState::Processing {
            stage: stage.to_string(),
            message: message.to_string(),
        }
    }

    pub fn status(&self) -> DocumentStatus {
        match self {
            DocumentState::Pending => DocumentStatus::Pending,
            DocumentState::Processing { .. } => DocumentStatus::Processing,
            DocumentState::Processed { .. } => DocumentStatus::Processed,
            DocumentState::Error { .. } => DocumentStatus::Error,
        }
    }

    /// The row mutation for this state: status, metadata and (for errors)
    /// `processing_error` move together in one patch.
    pub fn into_patch(self) -> DocumentPatch {
        let status = self.status();
        match self {
            DocumentState::Pending => DocumentPatch {
                status: Some(status),
                ..DocumentPatch::default()
            },
            DocumentState::Processing { stage, message } => DocumentPatch {
                status: Some(status),
                metadata: Some(StageMetadata::now(&stage, &message)),
                ..DocumentPatch::default()
            },
            DocumentState::Processed { message } => DocumentPatch {
                status: Some(status),
                metadata: Some(StageMetadata::now("complete", &message)),
                ..DocumentPatch::default()
            },
            DocumentState::Error { message } => DocumentPatch {
                status: Some(status),
                metadata: Some(StageMetadata::now("error", &message)),
                processing_error: Some(message),
                ..DocumentPatch::default()
            },
        }
    }
}

// ── Rows ───────────────────────────────────────────────────────────────────

/// One uploaded source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: Uuid,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub storage_path: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub briefing: Option<Briefing>,
    #[serde(default)]
    pub available_programs: Option<Vec<ProgramSummary>>,
    #[serde(default)]
    pub output_language: Option<String>,
    #[serde(default)]
    pub additional_context: Option<String>,
    #[serde(default)]
    pub processing_error: Option<String>,
    #[serde(default)]
    pub metadata: Option<StageMetadata>,
}

/// One generated proposal, with the owning document's briefing embedded
/// (`select=*,documents(briefing)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRow {
    pub id: Uuid,
    pub document_id: Uuid,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    pub status: ProposalStatus,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "documents")]
    pub document: Option<ProposalDocument>,
}

/// The owning document's briefing, kept opaque: the generation prompt
/// embeds it verbatim and must not drop fields written by other revisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDocument {
    #[serde(default)]
    pub briefing: Option<serde_json::Value>,
}

// ── Patches ────────────────────────────────────────────────────────────────

/// Partial document update. Unset fields are not serialized and therefore
/// untouched by the write.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub briefing: Option<Briefing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_programs: Option<Vec<ProgramSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<StageMetadata>,
}

/// Partial proposal update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProposalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

// ── Store trait ────────────────────────────────────────────────────────────

/// The persistent-store collaborator: rows plus blob storage.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_document(&self, id: Uuid) -> Result<DocumentRow, StoreError>;
    async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> Result<(), StoreError>;
    async fn fetch_proposal(&self, id: Uuid) -> Result<ProposalRow, StoreError>;
    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<(), StoreError>;
    /// Write-once fan-out; callers treat failures as non-fatal.
    async fn insert_commercial_assets(&self, assets: &[CommercialAsset])
        -> Result<(), StoreError>;
    /// Download an uploaded PDF from blob storage.
    async fn download_pdf(&self, storage_path: &str) -> Result<Vec<u8>, StoreError>;
}

// ── Mock store ─────────────────────────────────────────────────────────────

/// In-memory store for pipeline tests: seeded rows, recorded writes,
/// injectable failures.
#[derive(Default)]
pub struct MockStore {
    documents: Mutex<HashMap<Uuid, DocumentRow>>,
    proposals: Mutex<HashMap<Uuid, ProposalRow>>,
    pdfs: Mutex<HashMap<String, Vec<u8>>>,
    assets: Mutex<Vec<CommercialAsset>>,
    document_updates: Mutex<Vec<(Uuid, DocumentPatch)>>,
    fail_asset_inserts: Mutex<bool>,
    fail_downloads: Mutex<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_document(&self, row: DocumentRow) {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(row.id, row);
    }

    pub fn seed_proposal(&self, row: ProposalRow) {
        self.proposals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(row.id, row);
    }

    pub fn seed_pdf(&self, storage_path: &str, bytes: Vec<u8>) {
        self.pdfs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(storage_path.to_string(), bytes);
    }

    /// Make every `insert_commercial_assets` call fail.
    pub fn fail_asset_inserts(&self) {
        *self.fail_asset_inserts.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    /// Make every `download_pdf` call fail.
    pub fn fail_downloads(&self) {
        *self.fail_downloads.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    pub fn document(&self, id: Uuid) -> Option<DocumentRow> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }

    pub fn proposal(&self, id: Uuid) -> Option<ProposalRow> {
        self.proposals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }

    pub fn inserted_assets(&self) -> Vec<CommercialAsset> {
        self.assets.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Document patches in write order, for sequencing assertions.
    pub fn document_update_log(&self) -> Vec<(Uuid, DocumentPatch)> {
        self.document_updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn fetch_document(&self, id: Uuid) -> Result<DocumentRow, StoreError> {
        self.document(id)
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))
    }

    async fn update_document(&self, id: Uuid, patch: DocumentPatch) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        let row = documents
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;

        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(briefing) = patch.briefing.clone() {
            row.briefing = Some(briefing);
        }
        if let Some(programs) = patch.available_programs.clone() {
            row.available_programs = Some(programs);
        }
        if let Some(error) = patch.processing_error.clone() {
            row.processing_error = Some(error);
        }
        if let Some(metadata) = patch.metadata.clone() {
            row.metadata = Some(metadata);
        }

        self.document_updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, patch));
        Ok(())
    }

    async fn fetch_proposal(&self, id: Uuid) -> Result<ProposalRow, StoreError> {
        self.proposal(id)
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))
    }

    async fn update_proposal(&self, id: Uuid, patch: ProposalPatch) -> Result<(), StoreError> {
        let mut proposals = self.proposals.lock().unwrap_or_else(|e| e.into_inner());
        let row = proposals
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;

        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(content) = patch.content {
            row.content = Some(content);
        }
        Ok(())
    }

    async fn insert_commercial_assets(
        &self,
        assets: &[CommercialAsset],
    ) -> Result<(), StoreError> {
        if *self.fail_asset_inserts.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::Api {
                status: 500,
                body: "simulated insert failure".into(),
            });
        }
        self.assets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(assets);
        Ok(())
    }

    async fn download_pdf(&self, storage_path: &str) -> Result<Vec<u8>, StoreError> {
        if *self.fail_downloads.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::Transport("simulated download failure".into()));
        }
        self.pdfs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(storage_path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("object {storage_path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Processed).unwrap(),
            "\"processed\""
        );
        assert_eq!(
            serde_json::to_string(&ProposalStatus::Ready).unwrap(),
            "\"ready\""
        );
    }

    #[test]
    fn error_state_patch_carries_message_everywhere() {
        let patch = DocumentState::Error {
            message: "download failed".into(),
        }
        .into_patch();

        assert_eq!(patch.status, Some(DocumentStatus::Error));
        assert_eq!(patch.processing_error.as_deref(), Some("download failed"));
        let metadata = patch.metadata.unwrap();
        assert_eq!(metadata.stage, "error");
        assert_eq!(metadata.message, "download failed");
    }

    #[test]
    fn processing_state_patch_never_touches_briefing() {
        let patch = DocumentState::processing("starting", "Iniciando análisis...").into_patch();
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json["status"], "processing");
        assert_eq!(json["metadata"]["stage"], "starting");
        assert!(json.get("briefing").is_none());
        assert!(json.get("available_programs").is_none());
        assert!(json.get("processing_error").is_none());
    }

    #[test]
    fn processed_state_uses_complete_stage() {
        let patch = DocumentState::Processed {
            message: "Análisis profundo completado".into(),
        }
        .into_patch();
        assert_eq!(patch.metadata.unwrap().stage, "complete");
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = DocumentPatch::default();
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({}));

        let patch = ProposalPatch {
            status: Some(ProposalStatus::Ready),
            content: None,
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ready"}));
    }

    #[test]
    fn proposal_row_reads_embedded_briefing() {
        let raw = r#"{
            "id": "6f2c7a58-21aa-4d31-9df1-5a4c1f6f8a01",
            "document_id": "8c1b2d7e-90ff-4a6b-8d52-2f0f4f9f3b02",
            "status": "processing",
            "tone": "Profesional",
            "documents": {"briefing": {"title": "Programa X"}}
        }"#;
        let row: ProposalRow = serde_json::from_str(raw).unwrap();
        assert_eq!(
            row.document.unwrap().briefing.unwrap()["title"],
            "Programa X"
        );
    }

    #[tokio::test]
    async fn mock_store_applies_patches_in_place() {
        let store = MockStore::new();
        let id = Uuid::new_v4();
        store.seed_document(DocumentRow {
            id,
            agency_id: None,
            file_name: None,
            storage_path: "docs/a.pdf".into(),
            status: DocumentStatus::Pending,
            briefing: None,
            available_programs: None,
            output_language: None,
            additional_context: None,
            processing_error: None,
            metadata: None,
        });

        store
            .update_document(
                id,
                DocumentState::processing("starting", "Iniciando análisis...").into_patch(),
            )
            .await
            .unwrap();

        let row = store.document(id).unwrap();
        assert_eq!(row.status, DocumentStatus::Processing);
        assert_eq!(row.metadata.unwrap().stage, "starting");
        assert_eq!(store.document_update_log().len(), 1);
    }

    #[tokio::test]
    async fn mock_store_missing_rows_are_not_found() {
        let store = MockStore::new();
        let err = store.fetch_document(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
