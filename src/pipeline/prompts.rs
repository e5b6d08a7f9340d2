//! Prompt construction for every pipeline stage.
//!
//! Each builder is a pure function of (data, options, language profile) →
//! prompt string, with no I/O, so prompts can be golden-tested without
//! invoking the model. The response shapes promised here are contracts: the
//! parsers and the rendering collaborator depend on them key for key.

use super::editing::TargetElement;
use super::generation::GenerationOptions;
use super::language::LanguageProfile;

// ── Catalog scan (stage 1) ─────────────────────────────────────────────────

/// System instruction for the catalog scan: pins the output language.
pub fn catalog_scan_system(language: &LanguageProfile) -> String {
    format!(
        "You are an expert analyst of educational program catalogs. \
         Write every extracted text field in {} ({}). {}",
        language.display_name, language.code, language.tone_rule
    )
}

/// Stage-1 prompt: detect the programs present in the attached PDF.
pub fn catalog_scan_prompt(additional_context: Option<&str>) -> String {
    let context_note = match additional_context {
        Some(context) if !context.trim().is_empty() => {
            format!("\nADDITIONAL CONTEXT FROM THE AGENCY:\n{}\n", context.trim())
        }
        _ => String::new(),
    };

    format!(
        r#"Analyze the attached PDF document.

OBJECTIVE: quickly and precisely identify the educational programs it contains.
{context_note}
INSTRUCTIONS:
1. Detect whether the document describes a SINGLE program or a CATALOG with several.
2. For EACH program detected, extract ONLY:
   - "title": program name, in the output language.
   - "original_title": program name exactly as printed in the document, if it differs.
   - "target_audience": who it is aimed at (brief).
   - "summary": an executive summary of 3-4 sentences about the program.
   - "duration": approximate duration, if stated.

RESPONSE: return a JSON object with this structure:
{{
  "is_multi_program": boolean,
  "programs": [
    {{ "title": "...", "original_title": "...", "target_audience": "...", "summary": "...", "duration": "..." }}
  ]
}}

IMPORTANT: respond ONLY with valid JSON. Do not include any extra text."#
    )
}

// ── Deep extraction (stage 2) ──────────────────────────────────────────────

/// System instruction for deep extraction: full translation fidelity.
pub fn deep_extraction_system(language: &LanguageProfile) -> String {
    format!(
        "You are an elite educational-marketing analyst. Translate every \
         extracted field fully and faithfully into {} ({}) — no mixed-language \
         output. {}",
        language.display_name, language.code, language.tone_rule
    )
}

/// Stage-2 prompt: extract the rich marketing-intelligence structure for one
/// program.
pub fn deep_extraction_prompt(program_title: &str) -> String {
    format!(
        r#"Analyze this educational PDF focusing EXCLUSIVELY on the program titled: "{program_title}".

Extract a marketing intelligence report as a JSON object with this structure:
{{
  "core_data": {{
    "title": "official program name",
    "original_title": "name exactly as printed, if different",
    "objectives": ["main learning objectives"],
    "target_audience": "detailed profile of the ideal student",
    "duration": "duration and workload",
    "key_highlights": ["4-5 unique strengths or benefits"],
    "modules": [ {{ "name": "module name", "summary": "what it teaches" }} ],
    "methodology": "brief description (on-site, online, case studies, ...)",
    "location": {{ "city": "...", "country": "..." }},
    "institution_summary": "short profile of the institution behind the program"
  }},
  "marketing_assets": {{
    "value_proposition": "one-sentence value proposition",
    "elevator_pitch": "30-second pitch",
    "seo_keywords": ["5-8 search keywords"],
    "email_subject_lines": ["3 subject lines"],
    "ad_headlines": ["3 short ad headlines"]
  }},
  "social_raw": {{
    "linkedin_post": "ready-to-publish LinkedIn post",
    "instagram_caption": "ready-to-publish Instagram caption",
    "twitter_thread": ["3-5 thread posts"]
  }}
}}

IMPORTANT: do not invent facts. If something does not appear in the document,
write a coherent text based on the surrounding context. Respond ONLY with the JSON."#
    )
}

// ── Proposal generation ────────────────────────────────────────────────────

/// The block catalog embedded in generation prompts. The rendering layer
/// pattern-matches on these exact keys, so the schema is reproduced
/// byte-for-byte.
pub const BLOCK_CATALOG: &str = r#"hero:     { headline, intro, image_prompt?, logo_position: left|center|right,
            text_align: left|center|right, overlay_opacity: 0-100,
            headline_size?: "N%", intro_size?: "N%" }
solution: { title, text, text_align, title_size?, text_size? }
features: { title, items: string[], text_align, title_size? }
columns:  { layout: "4-8"|"8-4"|"6-6"|"4-4-4",
            left_content:{type: text|image, value}, right_content:{...}, third_content?:{...} }
image_full: { image_url | image_prompt, caption? }
cta:      { headline, button_text, button_link?, type?, is_popup? }
footer:   { text, show_social?: boolean }
page_break: {}"#;

/// System instruction for proposal generation.
pub fn generation_system(language: &LanguageProfile) -> String {
    format!(
        "You are an elite educational-marketing copywriter. Write every text \
         field in {} ({}). {}",
        language.display_name, language.code, language.tone_rule
    )
}

/// Generation prompt: briefing + tone + the block catalog → sections.
pub fn generation_prompt(
    briefing_json: &serde_json::Value,
    tone: &str,
    format_hint: Option<&str>,
    options: &GenerationOptions,
) -> String {
    let mut directives = vec![format!(
        "- Tone: {tone}. Use rich, dynamic, persuasive vocabulary."
    )];
    if let Some(format_hint) = format_hint {
        directives.push(format!("- Document format: {format_hint}."));
    }
    if options.include_institution {
        directives.push(
            "- Include a section presenting the institution (use institution_summary).".into(),
        );
    } else {
        directives.push("- Do NOT present the institution.".into());
    }
    if options.include_location {
        directives.push("- Mention the program location where it strengthens the pitch.".into());
    } else {
        directives.push("- Do NOT mention the program location.".into());
    }
    match &options.cta_config {
        Some(cta) => directives.push(format!(
            "- The cta block must use type \"{}\" and point at \"{}\".",
            cta.kind, cta.value
        )),
        None => directives.push("- Close with one strong cta block.".into()),
    }
    let directives = directives.join("\n");

    format!(
        r#"Your mission is to transform the following BRIEFING into an IRRESISTIBLE
commercial proposal built from content blocks.

FRAMEWORK:
- Leadership and transformation: focus on the change the student will experience.
- AIDA: capture attention immediately and guide the reader to desire.
{directives}

PROGRAM BRIEFING:
{briefing}

AVAILABLE BLOCK TYPES AND THEIR SETTINGS:
{catalog}

RESPONSE RULES:
1. Return ONLY a JSON object shaped as:
   {{ "sections": [ {{ "id": "...", "type": "...", "settings": {{ ... }} }} ], "visual_suggestions": "..." }}
2. Every block carries a short, descriptive, unique "id" (e.g. "hero-main", "features-benefits").
3. Open with a hero block; headlines must be impactful, never generic
   ("Master the Art of..." instead of "Course of...").
4. Benefits must be centered on RESULTS.
5. "image_prompt" fields are descriptive ENGLISH prompts for stock photography
   (e.g. "cinematic photo of visionary leader in modern city office, sunrise light, 8k").
6. Respond ONLY with the JSON object."#,
        directives = directives,
        briefing = briefing_json,
        catalog = BLOCK_CATALOG,
    )
}

// ── Proposal edit ──────────────────────────────────────────────────────────

/// System instruction for chat-driven edits.
pub const EDIT_SYSTEM: &str = "You are an elite educational-marketing copywriter \
editing a block-based commercial proposal. Apply the requested change and \
nothing else; keep every untouched block exactly as it is.";

/// Edit prompt: current sections + instruction (+ optional target hint and
/// image context) → full replacement sections.
pub fn edit_prompt(
    sections_json: &serde_json::Value,
    instruction: &str,
    images: &[String],
    target: Option<&TargetElement>,
) -> String {
    let target_note = match target {
        Some(target) => {
            let path_note = target
                .path
                .as_deref()
                .map(|path| format!(" (field path: {path})"))
                .unwrap_or_default();
            format!(
                "\nTARGET: the user selected block \"{}\"{path_note}. Prefer modifying \
                 that block/field; leave the rest untouched unless the instruction \
                 requires otherwise.\n",
                target.block_id
            )
        }
        None => String::new(),
    };

    let images_note = if images.is_empty() {
        String::new()
    } else {
        format!(
            "\nIMAGES UPLOADED BY THE USER (use their URLs where an image fits):\n{}\n",
            images.join("\n")
        )
    };

    format!(
        r#"You are editing the content blocks of a commercial proposal.

CURRENT SECTIONS:
{sections}

USER INSTRUCTION:
"{instruction}"
{target_note}{images_note}
AVAILABLE BLOCK TYPES AND THEIR SETTINGS:
{catalog}

RESPONSE RULES:
1. Return ONLY a JSON object shaped as {{ "sections": [ ... ] }} containing the
   FULL list of blocks after the edit, in order.
2. CRITICAL: blocks you do not change — and blocks you merely rewrite — MUST
   keep their existing "id" exactly. Only newly added blocks get a new
   descriptive unique id.
3. Do not invent data that contradicts the proposal.
4. Respond ONLY with the JSON object."#,
        sections = sections_json,
        instruction = instruction,
        target_note = target_note,
        images_note = images_note,
        catalog = BLOCK_CATALOG,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generation::CtaConfig;
    use crate::pipeline::language;

    #[test]
    fn scan_system_pins_language() {
        let system = catalog_scan_system(language::resolve("fr"));
        assert!(system.contains("Français"));
        assert!(system.contains("(fr)"));
    }

    #[test]
    fn scan_prompt_demands_program_shape() {
        let prompt = catalog_scan_prompt(None);
        assert!(prompt.contains("\"is_multi_program\""));
        assert!(prompt.contains("\"programs\""));
        assert!(prompt.contains("ONLY with valid JSON"));
    }

    #[test]
    fn scan_prompt_embeds_agency_context() {
        let prompt = catalog_scan_prompt(Some("Focus on ROI for the Indian market"));
        assert!(prompt.contains("Focus on ROI for the Indian market"));
    }

    #[test]
    fn blank_agency_context_is_omitted() {
        assert!(!catalog_scan_prompt(Some("   ")).contains("ADDITIONAL CONTEXT"));
        assert!(!catalog_scan_prompt(None).contains("ADDITIONAL CONTEXT"));
    }

    #[test]
    fn extraction_prompt_focuses_on_program() {
        let prompt = deep_extraction_prompt("Máster en Big Data");
        assert!(prompt.contains("\"Máster en Big Data\""));
        assert!(prompt.contains("\"core_data\""));
        assert!(prompt.contains("\"marketing_assets\""));
        assert!(prompt.contains("\"social_raw\""));
    }

    #[test]
    fn extraction_system_demands_translation_fidelity() {
        let system = deep_extraction_system(language::resolve("de"));
        assert!(system.contains("Deutsch"));
        assert!(system.contains("faithfully"));
    }

    #[test]
    fn generation_prompt_embeds_briefing_tone_and_catalog() {
        let briefing = serde_json::json!({"title": "Programa X"});
        let options = GenerationOptions::default();
        let prompt = generation_prompt(&briefing, "Inspirador", Some("one-pager"), &options);

        assert!(prompt.contains("Programa X"));
        assert!(prompt.contains("Tone: Inspirador"));
        assert!(prompt.contains("one-pager"));
        assert!(prompt.contains(BLOCK_CATALOG));
        assert!(prompt.contains("\"visual_suggestions\""));
    }

    #[test]
    fn generation_prompt_honors_cta_config() {
        let options = GenerationOptions {
            cta_config: Some(CtaConfig {
                kind: "whatsapp".into(),
                value: "+34600111222".into(),
            }),
            ..GenerationOptions::default()
        };
        let prompt =
            generation_prompt(&serde_json::json!({}), "Profesional", None, &options);
        assert!(prompt.contains("whatsapp"));
        assert!(prompt.contains("+34600111222"));
    }

    #[test]
    fn generation_prompt_can_exclude_institution_and_location() {
        let options = GenerationOptions {
            include_institution: false,
            include_location: false,
            ..GenerationOptions::default()
        };
        let prompt =
            generation_prompt(&serde_json::json!({}), "Profesional", None, &options);
        assert!(prompt.contains("Do NOT present the institution"));
        assert!(prompt.contains("Do NOT mention the program location"));
    }

    #[test]
    fn edit_prompt_embeds_sections_verbatim_and_preserves_ids() {
        let sections = serde_json::json!([{"id": "hero-main", "type": "hero", "settings": {}}]);
        let prompt = edit_prompt(&sections, "Make the headline bolder", &[], None);

        assert!(prompt.contains("hero-main"));
        assert!(prompt.contains("Make the headline bolder"));
        assert!(prompt.contains("keep their existing \"id\""));
    }

    #[test]
    fn edit_prompt_includes_target_hint() {
        let target = TargetElement {
            block_id: "features-benefits".into(),
            path: Some("settings.items[2]".into()),
        };
        let prompt = edit_prompt(
            &serde_json::json!([]),
            "Shorten it",
            &[],
            Some(&target),
        );
        assert!(prompt.contains("features-benefits"));
        assert!(prompt.contains("settings.items[2]"));
    }

    #[test]
    fn edit_prompt_lists_uploaded_images() {
        let images = vec!["https://cdn.example.com/campus.jpg".to_string()];
        let prompt = edit_prompt(&serde_json::json!([]), "Add the campus photo", &images, None);
        assert!(prompt.contains("https://cdn.example.com/campus.jpg"));
    }

    #[test]
    fn block_catalog_lists_every_type() {
        for tag in [
            "hero:", "solution:", "features:", "columns:", "image_full:", "cta:", "footer:",
            "page_break:",
        ] {
            assert!(BLOCK_CATALOG.contains(tag), "missing {tag}");
        }
    }
}
