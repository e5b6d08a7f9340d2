//! Chat-driven proposal edits.
//!
//! The model receives the current sections verbatim plus a natural-language
//! instruction and returns a full replacement array. There is no merge/diff
//! step, so the prompt itself carries the id-preservation order; on success
//! only the `sections` key of the content object is replaced and every other
//! top-level key (visual_suggestions, legacy fields) survives. On failure
//! nothing is written: the single gated update keeps the row consistent.

use uuid::Uuid;

use crate::store::ProposalPatch;

use super::blocks::Block;
use super::gemini::GenerateRequest;
use super::{parser, prompts, PipelineContext, PipelineError};

/// A narrowing hint: the block (and optionally the field inside it) the
/// user selected in the editor.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TargetElement {
    pub block_id: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Apply one edit instruction to a proposal's sections.
pub async fn run(
    ctx: &PipelineContext,
    proposal_id: Uuid,
    instruction: &str,
    images: &[String],
    target: Option<&TargetElement>,
) -> Result<(), PipelineError> {
    let row = ctx.store.fetch_proposal(proposal_id).await?;
    let content = row.content.ok_or(PipelineError::MissingSections)?;
    let sections = content
        .get("sections")
        .filter(|sections| sections.is_array())
        .cloned()
        .ok_or(PipelineError::MissingSections)?;

    let response = ctx
        .llm
        .generate(GenerateRequest {
            system: prompts::EDIT_SYSTEM.to_string(),
            prompt: prompts::edit_prompt(&sections, instruction, images, target),
            pdf: None,
        })
        .await?;

    let value = parser::extract_json_object(&response)?;
    let new_sections = value
        .get("sections")
        .filter(|sections| sections.is_array())
        .cloned()
        .ok_or_else(|| {
            PipelineError::InvalidAiResponse("edit response has no sections array".into())
        })?;
    // Contract check only; the raw array is what gets merged.
    serde_json::from_value::<Vec<Block>>(new_sections.clone())
        .map_err(|e| PipelineError::InvalidAiResponse(format!("unexpected block shape: {e}")))?;

    let mut merged = match content {
        serde_json::Value::Object(map) => map,
        _ => return Err(PipelineError::MissingSections),
    };
    merged.insert("sections".to_string(), new_sections);

    ctx.store
        .update_proposal(
            proposal_id,
            ProposalPatch {
                status: None,
                content: Some(serde_json::Value::Object(merged)),
            },
        )
        .await?;

    tracing::info!(proposal_id = %proposal_id, "Proposal edit applied");
    Ok(())
}
