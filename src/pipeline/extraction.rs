//! Deep extraction — stage 2 of document processing.
//!
//! Focused on one selected program, the model is asked for the rich
//! marketing-intelligence shape; the result is mapped down to the legacy
//! briefing for the document row and fanned out into commercial-asset rows
//! for the marketing hub. Both halves matter: the proposal generator reads
//! the briefing, the hub reads the assets.

use uuid::Uuid;

use crate::store::{DocumentState, Store};

use super::briefing::{self, CommercialAsset, MarketingIntelligence, ProgramSummary};
use super::gemini::GenerateRequest;
use super::language::{self, DEFAULT_LANGUAGE};
use super::{
    generate_with_deadline, mark_document_failed, parser, prompts, PipelineContext, PipelineError,
};

/// Run deep extraction for one program. Failures land on the row, never on
/// the caller.
pub async fn run(
    ctx: &PipelineContext,
    document_id: Uuid,
    storage_path: &str,
    program_title: &str,
    output_language: Option<String>,
) {
    if let Err(error) = extract_program(
        ctx,
        document_id,
        storage_path,
        program_title,
        None,
        output_language.as_deref(),
    )
    .await
    {
        mark_document_failed(ctx.store.as_ref(), document_id, &error).await;
    }
}

/// The extraction itself. `carried_programs` is the scan's candidate list
/// when stage 1 chained here directly; it is re-written so the selection
/// set survives, and never invented otherwise.
pub(crate) async fn extract_program(
    ctx: &PipelineContext,
    document_id: Uuid,
    storage_path: &str,
    program_title: &str,
    carried_programs: Option<Vec<ProgramSummary>>,
    output_language: Option<&str>,
) -> Result<(), PipelineError> {
    let row = ctx.store.fetch_document(document_id).await?;
    let output_language = output_language
        .map(str::to_string)
        .or(row.output_language)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let profile = language::resolve(&output_language);

    ctx.store
        .update_document(
            document_id,
            DocumentState::processing(
                "deep_extraction",
                &format!("Extrayendo detalles de: {program_title}..."),
            )
            .into_patch(),
        )
        .await?;

    let pdf = ctx.store.download_pdf(storage_path).await?;

    let response = generate_with_deadline(
        ctx,
        GenerateRequest {
            system: prompts::deep_extraction_system(profile),
            prompt: prompts::deep_extraction_prompt(program_title),
            pdf: Some(pdf),
        },
    )
    .await?;

    let value = parser::extract_json_object(&response)?;
    let intelligence: MarketingIntelligence = serde_json::from_value(value).map_err(|e| {
        PipelineError::InvalidAiResponse(format!("unexpected extraction shape: {e}"))
    })?;

    let mut patch = DocumentState::Processed {
        message: "Análisis profundo completado".into(),
    }
    .into_patch();
    patch.briefing = Some(briefing::to_briefing(&intelligence));
    if let Some(programs) = carried_programs {
        patch.available_programs = Some(programs);
    }
    ctx.store.update_document(document_id, patch).await?;

    tracing::info!(
        document_id = %document_id,
        program = program_title,
        "Deep extraction complete"
    );

    let assets = briefing::to_commercial_assets(&intelligence, row.agency_id, document_id);
    persist_commercial_assets(ctx.store.as_ref(), &assets).await;

    Ok(())
}

/// Best-effort post-commit hook: the extraction result is already on the
/// row, so an asset-insert failure is logged and dropped rather than
/// turning a processed document into an errored one.
async fn persist_commercial_assets(store: &dyn Store, assets: &[CommercialAsset]) {
    if assets.is_empty() {
        return;
    }
    match store.insert_commercial_assets(assets).await {
        Ok(()) => tracing::info!(count = assets.len(), "Commercial assets stored"),
        Err(error) => tracing::warn!(
            error = %error,
            "Commercial asset insert failed; extraction result kept"
        ),
    }
}
