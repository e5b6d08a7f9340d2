//! JSON extraction from raw model responses.
//!
//! The model is instructed to answer with a single JSON object, but in
//! practice the text often arrives wrapped in Markdown code fences or with
//! commentary around it. Every stage funnels its response through
//! [`extract_json_object`]. There is deliberately no partial recovery: a
//! response that does not contain one parseable object fails the stage.

use super::PipelineError;

/// Extract and parse the JSON object from a raw model response.
///
/// Rules, in order:
/// 1. Trim surrounding whitespace.
/// 2. If the text contains a triple-backtick fence, take the content of the
///    first fence pair (an optional `json` tag after the opening fence is
///    skipped).
/// 3. Otherwise, take the span from the first `{` to the last `}`.
///
/// Anything else (no fences and no braces, an unclosed fence, a span that
/// fails to parse) is an invalid AI response.
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, PipelineError> {
    let trimmed = text.trim();

    let candidate = if let Some(fence_start) = trimmed.find("```") {
        let after_fence = &trimmed[fence_start + 3..];
        let after_tag = after_fence.strip_prefix("json").unwrap_or(after_fence);
        let fence_end = after_tag.find("```").ok_or_else(|| {
            PipelineError::InvalidAiResponse("unclosed code fence in model response".into())
        })?;
        after_tag[..fence_end].trim()
    } else {
        let start = trimmed.find('{').ok_or_else(|| {
            PipelineError::InvalidAiResponse("no JSON object in model response".into())
        })?;
        let end = trimmed.rfind('}').filter(|end| *end > start).ok_or_else(|| {
            PipelineError::InvalidAiResponse("no JSON object in model response".into())
        })?;
        &trimmed[start..=end]
    };

    serde_json::from_str(candidate)
        .map_err(|e| PipelineError::InvalidAiResponse(format!("malformed JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let value = extract_json_object("```json\n{ \"a\": 1 }\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn parses_fence_without_tag() {
        let value = extract_json_object("```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn parses_bare_json() {
        let value = extract_json_object("{\"a\":1}").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn parses_json_with_surrounding_prose() {
        let value =
            extract_json_object("Here is the result:\n{\"sections\": []}\nHope that helps!")
                .unwrap();
        assert!(value["sections"].as_array().unwrap().is_empty());
    }

    #[test]
    fn fenced_takes_priority_over_outer_braces() {
        let value = extract_json_object("intro {not json} ```json\n{\"a\": 2}\n``` outro").unwrap();
        assert_eq!(value["a"], 2);
    }

    #[test]
    fn no_braces_is_invalid() {
        let err = extract_json_object("the model refused to answer").unwrap_err();
        assert!(err.to_string().contains("Invalid AI response"));
    }

    #[test]
    fn unclosed_fence_is_invalid() {
        let err = extract_json_object("```json\n{\"a\": 1}").unwrap_err();
        assert!(err.to_string().contains("Invalid AI response"));
    }

    #[test]
    fn malformed_span_is_invalid() {
        let err = extract_json_object("{\"a\": }").unwrap_err();
        assert!(err.to_string().contains("Invalid AI response"));
    }

    #[test]
    fn nested_objects_survive_the_greedy_span() {
        let value = extract_json_object("x {\"outer\": {\"inner\": 3}} y").unwrap();
        assert_eq!(value["outer"]["inner"], 3);
    }
}
