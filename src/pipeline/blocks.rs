//! Block-based proposal content — the wire contract with the renderer.
//!
//! Generation and edit prompts promise exactly these shapes, and the
//! rendering collaborator pattern-matches on the `type` tags and settings
//! keys, so the serialized form must not drift: `{id, type, settings}` per
//! block, snake_case tags, the settings keys documented per variant.

use serde::{Deserialize, Serialize};

/// Proposal content in the block shape: an ordered list of sections plus
/// free-form visual suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalContent {
    pub sections: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_suggestions: Option<serde_json::Value>,
}

/// One content block. `id` is stable across edits: an edit must return the
/// same id for a block it merely rewrites, and fresh ids only for blocks it
/// adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub body: BlockBody,
}

/// The eight block variants and their settings payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "snake_case")]
pub enum BlockBody {
    Hero(HeroSettings),
    Solution(SolutionSettings),
    Features(FeaturesSettings),
    Columns(ColumnsSettings),
    ImageFull(ImageFullSettings),
    Cta(CtaSettings),
    Footer(FooterSettings),
    PageBreak(PageBreakSettings),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Left
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSettings {
    pub headline: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub logo_position: Alignment,
    #[serde(default)]
    pub text_align: Alignment,
    /// 0–100, applied over the hero image.
    #[serde(default)]
    pub overlay_opacity: u8,
    /// Percentage string, e.g. `"120%"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSettings {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub text_align: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesSettings {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub text_align: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnLayout {
    #[serde(rename = "4-8")]
    FourEight,
    #[serde(rename = "8-4")]
    EightFour,
    #[serde(rename = "6-6")]
    SixSix,
    #[serde(rename = "4-4-4")]
    Thirds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnContentKind {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnContent {
    #[serde(rename = "type")]
    pub kind: ColumnContentKind,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnsSettings {
    pub layout: ColumnLayout,
    pub left_content: ColumnContent,
    pub right_content: ColumnContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_content: Option<ColumnContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFullSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaSettings {
    pub headline: String,
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub cta_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_popup: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterSettings {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_social: Option<bool>,
}

/// Page breaks carry no settings; the empty object is kept on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBreakSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_block_wire_shape() {
        let block = Block {
            id: "hero-main".into(),
            body: BlockBody::Hero(HeroSettings {
                headline: "Domina el Arte de Vender".into(),
                intro: "Un programa para líderes".into(),
                image_prompt: Some("cinematic photo of a modern campus".into()),
                logo_position: Alignment::Center,
                text_align: Alignment::Left,
                overlay_opacity: 40,
                headline_size: Some("120%".into()),
                intro_size: None,
            }),
        };

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["id"], "hero-main");
        assert_eq!(json["type"], "hero");
        assert_eq!(json["settings"]["headline"], "Domina el Arte de Vender");
        assert_eq!(json["settings"]["logo_position"], "center");
        assert_eq!(json["settings"]["overlay_opacity"], 40);
        assert!(json["settings"].get("intro_size").is_none());
    }

    #[test]
    fn page_break_serializes_empty_settings() {
        let block = Block {
            id: "break-1".into(),
            body: BlockBody::PageBreak(PageBreakSettings {}),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "page_break");
        assert_eq!(json["settings"], serde_json::json!({}));
    }

    #[test]
    fn columns_layout_uses_dashed_names() {
        let settings = ColumnsSettings {
            layout: ColumnLayout::Thirds,
            left_content: ColumnContent {
                kind: ColumnContentKind::Text,
                value: "left".into(),
            },
            right_content: ColumnContent {
                kind: ColumnContentKind::Image,
                value: "https://example.com/a.jpg".into(),
            },
            third_content: None,
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["layout"], "4-4-4");
        assert_eq!(json["left_content"]["type"], "text");
        assert_eq!(json["right_content"]["type"], "image");
    }

    #[test]
    fn deserializes_model_emitted_sections() {
        let raw = r#"{
            "sections": [
                {"id": "hero-1", "type": "hero", "settings": {
                    "headline": "H", "intro": "I",
                    "logo_position": "left", "text_align": "center",
                    "overlay_opacity": 60
                }},
                {"id": "features-1", "type": "features", "settings": {
                    "title": "Top benefits", "items": ["a", "b"], "text_align": "left"
                }},
                {"id": "cta-1", "type": "cta", "settings": {
                    "headline": "Join now", "button_text": "Apply"
                }},
                {"id": "break-1", "type": "page_break", "settings": {}}
            ],
            "visual_suggestions": "Use warm tones"
        }"#;

        let content: ProposalContent = serde_json::from_str(raw).unwrap();
        assert_eq!(content.sections.len(), 4);
        match &content.sections[1].body {
            BlockBody::Features(f) => assert_eq!(f.items.len(), 2),
            other => panic!("expected features, got {other:?}"),
        }
        assert_eq!(
            content.visual_suggestions,
            Some(serde_json::json!("Use warm tones"))
        );
    }

    #[test]
    fn unknown_block_type_is_rejected() {
        let raw = r#"{"id": "x", "type": "carousel", "settings": {}}"#;
        assert!(serde_json::from_str::<Block>(raw).is_err());
    }

    #[test]
    fn content_round_trips() {
        let content = ProposalContent {
            sections: vec![Block {
                id: "footer-1".into(),
                body: BlockBody::Footer(FooterSettings {
                    text: "© Agencia".into(),
                    show_social: Some(true),
                }),
            }],
            visual_suggestions: None,
        };
        let json = serde_json::to_string(&content).unwrap();
        let back: ProposalContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, content);
    }
}
