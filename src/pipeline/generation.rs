//! Proposal generation.
//!
//! Turns a document briefing into block-based proposal content. Runs
//! synchronously inside the handler invocation and always persists a
//! terminal status before returning; failures are surfaced through the
//! content channel (`content.error`) because that is what the consuming UI
//! renders.

use serde::Deserialize;
use uuid::Uuid;

use crate::store::{ProposalPatch, ProposalStatus};

use super::blocks::ProposalContent;
use super::gemini::GenerateRequest;
use super::language::{self, DEFAULT_LANGUAGE};
use super::{parser, prompts, PipelineContext, PipelineError};

/// Caller-supplied generation options.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationOptions {
    #[serde(default = "default_true")]
    pub include_institution: bool,
    #[serde(default = "default_true")]
    pub include_location: bool,
    #[serde(default)]
    pub cta_config: Option<CtaConfig>,
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_institution: true,
            include_location: true,
            cta_config: None,
            language: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Requested call-to-action: channel plus destination (a URL, a phone
/// number, an email address; the renderer interprets it by `type`).
#[derive(Debug, Clone, Deserialize)]
pub struct CtaConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Generate the proposal's content. The proposal row already exists in
/// `processing` status; this flips it to `ready` or `error` before
/// returning, so a realtime subscription set up at row creation never
/// misses the terminal state.
pub async fn run(
    ctx: &PipelineContext,
    proposal_id: Uuid,
    options: GenerationOptions,
) -> Result<(), PipelineError> {
    match generate(ctx, proposal_id, &options).await {
        Ok(sections) => {
            tracing::info!(proposal_id = %proposal_id, sections, "Proposal ready");
            Ok(())
        }
        Err(error) => {
            tracing::error!(proposal_id = %proposal_id, error = %error, "Proposal generation failed");
            let patch = ProposalPatch {
                status: Some(ProposalStatus::Error),
                content: Some(serde_json::json!({ "error": error.to_string() })),
            };
            if let Err(db_error) = ctx.store.update_proposal(proposal_id, patch).await {
                tracing::error!(
                    proposal_id = %proposal_id,
                    error = %db_error,
                    "Could not record proposal error state"
                );
            }
            Err(error)
        }
    }
}

async fn generate(
    ctx: &PipelineContext,
    proposal_id: Uuid,
    options: &GenerationOptions,
) -> Result<usize, PipelineError> {
    let row = ctx.store.fetch_proposal(proposal_id).await?;
    let briefing = row
        .document
        .as_ref()
        .and_then(|document| document.briefing.clone())
        .filter(|value| !value.is_null())
        .ok_or(PipelineError::MissingBriefing)?;

    let tone = row.tone.as_deref().unwrap_or("Profesional");
    let profile = language::resolve(options.language.as_deref().unwrap_or(DEFAULT_LANGUAGE));

    let response = ctx
        .llm
        .generate(GenerateRequest {
            system: prompts::generation_system(profile),
            prompt: prompts::generation_prompt(&briefing, tone, row.format.as_deref(), options),
            pdf: None,
        })
        .await?;

    let value = parser::extract_json_object(&response)?;
    // Validate the block contract before persisting; the raw value is what
    // gets stored.
    let content: ProposalContent = serde_json::from_value(value.clone())
        .map_err(|e| PipelineError::InvalidAiResponse(format!("unexpected proposal shape: {e}")))?;
    let sections = content.sections.len();

    ctx.store
        .update_proposal(
            proposal_id,
            ProposalPatch {
                status: Some(ProposalStatus::Ready),
                content: Some(value),
            },
        )
        .await?;

    Ok(sections)
}
