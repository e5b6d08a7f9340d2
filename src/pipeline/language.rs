//! Output-language configuration for prompt construction.
//!
//! Every prompt's system instruction pins the output language through one of
//! these profiles. Agencies sell the same program into very different
//! markets, so each profile carries a short cultural tone rule alongside the
//! display name.

/// A supported output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// ISO-ish code as stored on the document row (`output_language`).
    pub code: &'static str,
    /// Native display name, injected into system instructions.
    pub display_name: &'static str,
    /// One-line cultural tone rule for marketing copy in this market.
    pub tone_rule: &'static str,
}

/// Supported languages. The first entry (`es`) is the fallback.
pub const LANGUAGES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "es",
        display_name: "Español",
        tone_rule: "Warm but professional; address the reader as 'tú' and avoid unnecessary anglicisms.",
    },
    LanguageProfile {
        code: "ca",
        display_name: "Català",
        tone_rule: "Close, local register for the Catalan market; institutional credibility matters.",
    },
    LanguageProfile {
        code: "gl",
        display_name: "Galego",
        tone_rule: "Approachable regional tone; emphasize community and proximity.",
    },
    LanguageProfile {
        code: "en",
        display_name: "English",
        tone_rule: "Confident, direct, benefit-led copy in international business English.",
    },
    LanguageProfile {
        code: "fr",
        display_name: "Français",
        tone_rule: "Polished and formal; use 'vous' and emphasize academic excellence.",
    },
    LanguageProfile {
        code: "de",
        display_name: "Deutsch",
        tone_rule: "Precise and sober; lead with accreditation and measurable outcomes.",
    },
    LanguageProfile {
        code: "pt",
        display_name: "Português",
        tone_rule: "Warm and aspirational; neutral register that works in Portugal and Brazil.",
    },
    LanguageProfile {
        code: "zh",
        display_name: "中文（简体）",
        tone_rule: "Formal register; emphasize prestige, institutional reputation and safety.",
    },
    LanguageProfile {
        code: "hi",
        display_name: "हिन्दी",
        tone_rule: "Energetic tone; emphasize ROI, employability and career advancement.",
    },
    LanguageProfile {
        code: "ja",
        display_name: "日本語",
        tone_rule: "Respectful, precise language; highlight trust, tradition and institutional standing.",
    },
    LanguageProfile {
        code: "ko",
        display_name: "한국어",
        tone_rule: "Polite formal register; stress competitiveness and career outcomes.",
    },
];

/// Default output language when a document carries none.
pub const DEFAULT_LANGUAGE: &str = "es";

/// Resolve a language code to its profile.
///
/// Unknown or empty codes fall back to Spanish rather than failing: a bad
/// language preference must never abort a processing stage.
pub fn resolve(code: &str) -> &'static LanguageProfile {
    let normalized = code.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|profile| profile.code == normalized)
        .unwrap_or(&LANGUAGES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_codes() {
        assert_eq!(resolve("en").display_name, "English");
        assert_eq!(resolve("ja").code, "ja");
    }

    #[test]
    fn unknown_code_falls_back_to_spanish() {
        assert_eq!(resolve("xx").code, "es");
        assert_eq!(resolve("").code, "es");
    }

    #[test]
    fn resolve_is_case_insensitive() {
        assert_eq!(resolve("EN").code, "en");
        assert_eq!(resolve(" Pt ").code, "pt");
    }

    #[test]
    fn table_has_eleven_entries_and_spanish_first() {
        assert_eq!(LANGUAGES.len(), 11);
        assert_eq!(LANGUAGES[0].code, DEFAULT_LANGUAGE);
    }

    #[test]
    fn every_entry_has_a_tone_rule() {
        for profile in LANGUAGES {
            assert!(!profile.tone_rule.is_empty(), "{} has no tone rule", profile.code);
        }
    }
}
