//! Catalog scan — stage 1 of document processing.
//!
//! Downloads the uploaded PDF, asks the model which educational programs it
//! contains, and either chains straight into deep extraction (single
//! program) or stores the candidate list for the user to pick from
//! (catalog). Progress pings land on the row before the model call so the
//! UI can narrate the wait.

use serde::Deserialize;
use uuid::Uuid;

use crate::store::DocumentState;

use super::briefing::ProgramSummary;
use super::gemini::GenerateRequest;
use super::language::{self, DEFAULT_LANGUAGE};
use super::{
    extraction, generate_with_deadline, mark_document_failed, parser, prompts, PipelineContext,
    PipelineError,
};

/// Shape demanded from the model by the stage-1 prompt.
#[derive(Debug, Deserialize)]
struct CatalogScanResult {
    #[serde(default)]
    is_multi_program: bool,
    #[serde(default)]
    programs: Vec<ProgramSummary>,
}

/// Run the catalog scan for a document. Never returns an error: any failure
/// is recorded on the row (`status=error`, `processing_error`) and the stage
/// ends there. Retry is a user-initiated re-trigger.
pub async fn run(
    ctx: &PipelineContext,
    document_id: Uuid,
    storage_path: &str,
    output_language: Option<String>,
    additional_context: Option<String>,
) {
    if let Err(error) = scan_document(
        ctx,
        document_id,
        storage_path,
        output_language,
        additional_context,
    )
    .await
    {
        mark_document_failed(ctx.store.as_ref(), document_id, &error).await;
    }
}

async fn scan_document(
    ctx: &PipelineContext,
    document_id: Uuid,
    storage_path: &str,
    output_language: Option<String>,
    additional_context: Option<String>,
) -> Result<(), PipelineError> {
    // Language and agency context come from the trigger when present; one
    // row read covers whatever is missing.
    let (output_language, additional_context) = match (output_language, additional_context) {
        (Some(language), Some(context)) => (language, Some(context)),
        (language, context) => {
            let row = ctx.store.fetch_document(document_id).await?;
            (
                language
                    .or(row.output_language)
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                context.or(row.additional_context),
            )
        }
    };
    let profile = language::resolve(&output_language);

    ctx.store
        .update_document(
            document_id,
            DocumentState::processing("starting", "Iniciando análisis...").into_patch(),
        )
        .await?;

    let pdf = ctx.store.download_pdf(storage_path).await?;

    ctx.store
        .update_document(
            document_id,
            DocumentState::processing("gemini_call", "Identificando programas...").into_patch(),
        )
        .await?;

    let response = generate_with_deadline(
        ctx,
        GenerateRequest {
            system: prompts::catalog_scan_system(profile),
            prompt: prompts::catalog_scan_prompt(additional_context.as_deref()),
            pdf: Some(pdf),
        },
    )
    .await?;

    let value = parser::extract_json_object(&response)?;
    let scan: CatalogScanResult = serde_json::from_value(value)
        .map_err(|e| PipelineError::InvalidAiResponse(format!("unexpected catalog shape: {e}")))?;

    tracing::info!(
        document_id = %document_id,
        programs = scan.programs.len(),
        multi_program = scan.is_multi_program,
        "Catalog scan complete"
    );

    match scan.programs.len() {
        0 => Err(PipelineError::InvalidAiResponse(
            "catalog scan returned no programs".into(),
        )),
        1 => {
            // A single program needs no selection screen: chain straight
            // into deep extraction, carrying the resolved language and the
            // scanned list so neither is re-read or lost.
            let program_title = scan.programs[0].title.clone();
            extraction::extract_program(
                ctx,
                document_id,
                storage_path,
                &program_title,
                Some(scan.programs),
                Some(&output_language),
            )
            .await
        }
        _ => {
            let mut patch = DocumentState::Processed {
                message: "Programas detectados. Pendiente de selección.".into(),
            }
            .into_patch();
            patch.available_programs = Some(scan.programs);
            ctx.store.update_document(document_id, patch).await?;
            Ok(())
        }
    }
}
