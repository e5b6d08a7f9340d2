//! Briefing shapes and the rich → legacy mapping.
//!
//! Deep extraction asks the model for a rich "marketing intelligence"
//! structure (`core_data` + `marketing_assets` + `social_raw`) and then maps
//! it down to the flat [`Briefing`] the rest of the product reads. Both
//! halves are load-bearing: the proposal generator consumes the legacy
//! briefing, the marketing hub consumes the fanned-out commercial assets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat briefing stored on the document row. Replaced wholesale on every
/// (re)extraction, never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub key_highlights: Vec<String>,
    #[serde(default)]
    pub modules: Vec<BriefingModule>,
    #[serde(default)]
    pub methodology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingModule {
    pub name: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Lightweight program candidate from the catalog scan. When a document
/// holds several programs, one of these is later selected to drive deep
/// extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub duration: String,
}

// ── Rich extraction shape ──────────────────────────────────────────────────

/// The rich structure deep extraction requests from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingIntelligence {
    pub core_data: Briefing,
    #[serde(default)]
    pub marketing_assets: MarketingAssets,
    #[serde(default)]
    pub social_raw: SocialRaw,
}

/// Ready-to-use marketing snippets extracted alongside the briefing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingAssets {
    #[serde(default)]
    pub value_proposition: Option<String>,
    #[serde(default)]
    pub elevator_pitch: Option<String>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
    #[serde(default)]
    pub email_subject_lines: Vec<String>,
    #[serde(default)]
    pub ad_headlines: Vec<String>,
}

/// Raw social-media copy extracted alongside the briefing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialRaw {
    #[serde(default)]
    pub linkedin_post: Option<String>,
    #[serde(default)]
    pub instagram_caption: Option<String>,
    #[serde(default)]
    pub twitter_thread: Vec<String>,
}

/// A denormalized marketing snippet, fanned out once per extraction.
/// Write-once: these rows are inserted and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommercialAsset {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<Uuid>,
    pub document_id: Uuid,
    pub metadata: AssetMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub program_title: String,
}

/// Map the rich shape down to the legacy briefing.
///
/// `core_data` already carries the briefing fields; the mapping exists as a
/// named seam so the two shapes can drift independently.
pub fn to_briefing(intelligence: &MarketingIntelligence) -> Briefing {
    intelligence.core_data.clone()
}

/// Fan the rich shape out into commercial-asset rows.
///
/// Empty or missing snippets produce no row. List-valued assets (keywords,
/// subject lines, headlines, thread posts) become one row each so the
/// marketing hub can surface them individually.
pub fn to_commercial_assets(
    intelligence: &MarketingIntelligence,
    agency_id: Option<Uuid>,
    document_id: Uuid,
) -> Vec<CommercialAsset> {
    let program_title = intelligence.core_data.title.clone();
    let mut assets = Vec::new();

    let mut push = |asset_type: &str, content: &str| {
        let content = content.trim();
        if !content.is_empty() {
            assets.push(CommercialAsset {
                asset_type: asset_type.to_string(),
                content: content.to_string(),
                agency_id,
                document_id,
                metadata: AssetMetadata {
                    program_title: program_title.clone(),
                },
            });
        }
    };

    let marketing = &intelligence.marketing_assets;
    if let Some(text) = &marketing.value_proposition {
        push("value_proposition", text);
    }
    if let Some(text) = &marketing.elevator_pitch {
        push("elevator_pitch", text);
    }
    for keyword in &marketing.seo_keywords {
        push("seo_keyword", keyword);
    }
    for subject in &marketing.email_subject_lines {
        push("email_subject", subject);
    }
    for headline in &marketing.ad_headlines {
        push("ad_headline", headline);
    }

    let social = &intelligence.social_raw;
    if let Some(text) = &social.linkedin_post {
        push("linkedin_post", text);
    }
    if let Some(text) = &social.instagram_caption {
        push("instagram_caption", text);
    }
    for post in &social.twitter_thread {
        push("twitter_post", post);
    }

    assets
}
