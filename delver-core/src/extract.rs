//! Recovery of short string fields from free-form model output.
//!
//! Model output format is never guaranteed: the same stage may get clean
//! JSON, JSON wrapped in prose, reasoning spans, or bare text. The
//! extraction chain here tries a fixed sequence of increasingly lenient
//! heuristics and always returns a usable string; it cannot fail.

use regex::Regex;
use std::sync::LazyLock;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted-string pattern"));
static QUESTION_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?]\s*([^?\n]+)").expect("question-fragment pattern"));

const THINK_START: &str = "<think>";
const THINK_END: &str = "</think>";

/// Which stage is asking, selecting the late-chain heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Query generation: fall through to the trimmed remaining text.
    QueryGeneration,
    /// Reflection: prefer a question-mark-delimited fragment before the
    /// trimmed remaining text.
    Reflection,
}

/// True for strings that carry no usable content.
fn is_degenerate(text: &str) -> bool {
    matches!(text.trim(), "" | "{}" | "[]")
}

/// Pull a single string field out of free-form model output.
///
/// Ordered attempts, first success wins:
/// 1. structured JSON parse with a non-empty `field`,
/// 2. optional thinking-span strip,
/// 3. degenerate text goes straight to `fallback`,
/// 4. a double-quoted substring,
/// 5. mode heuristic (question fragment for reflection), else trimmed text,
/// 6. a final degenerate guard returning `fallback`.
pub fn extract_string_field(
    raw: &str,
    field: &str,
    fallback: &str,
    strip_thinking: bool,
    mode: ExtractMode,
) -> String {
    let selected = select_candidate(raw, field, fallback, strip_thinking, mode);
    // The guard applies to every path above, including a structured field
    // that parsed cleanly but carries no usable content.
    if is_degenerate(&selected) {
        fallback.to_string()
    } else {
        selected
    }
}

fn select_candidate(
    raw: &str,
    field: &str,
    fallback: &str,
    strip_thinking: bool,
    mode: ExtractMode,
) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
        if let Some(found) = value.get(field).and_then(|v| v.as_str()) {
            if !found.is_empty() {
                return found.to_string();
            }
        }
    }

    let content = if strip_thinking {
        strip_thinking_tokens(raw)
    } else {
        raw.to_string()
    };

    if is_degenerate(&content) {
        return fallback.to_string();
    }

    if let Some(caps) = QUOTED.captures(&content) {
        return caps[1].to_string();
    }

    match mode {
        ExtractMode::Reflection => QUESTION_FRAGMENT
            .captures(&content)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_else(|| content.trim().to_string()),
        ExtractMode::QueryGeneration => content.trim().to_string(),
    }
}

/// Remove all `<think>`...`</think>` spans, markers included.
///
/// Removes the first start/end pair repeatedly until no start marker
/// remains. A start marker with no end marker after it is left untouched,
/// which also terminates the loop.
pub fn strip_thinking_tokens(text: &str) -> String {
    let mut text = text.to_string();
    while let Some(start) = text.find(THINK_START) {
        let search_from = start + THINK_START.len();
        let Some(rel_end) = text[search_from..].find(THINK_END) else {
            break;
        };
        let end = search_from + rel_end + THINK_END.len();
        text.replace_range(start..end, "");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_json_field() {
        let raw = r#"{"query": "rust async runtimes"}"#;
        let out = extract_string_field(raw, "query", "fb", true, ExtractMode::QueryGeneration);
        assert_eq!(out, "rust async runtimes");
    }

    #[test]
    fn test_json_with_empty_field_falls_through() {
        let raw = r#"{"query": ""}"#;
        let out = extract_string_field(raw, "query", "fb", true, ExtractMode::QueryGeneration);
        // Step 1 rejects the empty field; the raw text itself is usable JSON
        // text, and the quoted-substring heuristic picks up the field name.
        assert_ne!(out, "");
        assert_ne!(out, "{}");
    }

    #[test]
    fn test_missing_field_uses_quoted_substring() {
        let raw = r#"The best query would be "rust borrow checker" I think"#;
        let out = extract_string_field(raw, "query", "fb", true, ExtractMode::QueryGeneration);
        assert_eq!(out, "rust borrow checker");
    }

    #[test]
    fn test_bare_text_trimmed_for_query_mode() {
        let out = extract_string_field("not json", "query", "topicX", true, ExtractMode::QueryGeneration);
        assert_eq!(out, "not json");
    }

    #[test]
    fn test_degenerate_field_value_returns_fallback() {
        let raw = r#"{"query": "{}"}"#;
        let out = extract_string_field(raw, "query", "topicX", true, ExtractMode::QueryGeneration);
        assert_eq!(out, "topicX");
    }

    #[test]
    fn test_degenerate_input_returns_fallback() {
        for raw in ["", "{}", "[]", "   "] {
            let out = extract_string_field(raw, "query", "topicX", true, ExtractMode::QueryGeneration);
            assert_eq!(out, "topicX", "input {raw:?}");
        }
    }

    #[test]
    fn test_reflection_question_fragment() {
        let raw = "What remains unclear? how caching interacts with eviction\nmore text";
        let out = extract_string_field(raw, "follow_up_query", "fb", true, ExtractMode::Reflection);
        assert_eq!(out, "how caching interacts with eviction");
    }

    #[test]
    fn test_reflection_prefers_quoted_over_question() {
        let raw = r#"Gap? unclear. Try "cache eviction policies" next"#;
        let out = extract_string_field(raw, "follow_up_query", "fb", true, ExtractMode::Reflection);
        assert_eq!(out, "cache eviction policies");
    }

    #[test]
    fn test_reflection_bare_text_falls_to_trimmed() {
        let out = extract_string_field("  just words  ", "f", "fb", true, ExtractMode::Reflection);
        assert_eq!(out, "just words");
    }

    #[test]
    fn test_thinking_stripped_before_heuristics() {
        let raw = "<think>internal musings</think>{}";
        let out = extract_string_field(raw, "query", "fb", true, ExtractMode::QueryGeneration);
        assert_eq!(out, "fb");
    }

    #[test]
    fn test_thinking_not_stripped_when_disabled() {
        let raw = "<think>abc</think>";
        let out = extract_string_field(raw, "query", "fb", false, ExtractMode::QueryGeneration);
        // With stripping disabled the span text itself is the remaining text.
        assert_eq!(out, raw.trim());
    }

    #[test]
    fn test_never_returns_degenerate() {
        for raw in ["", "{}", "[]", r#"{"query": "{}"}"#, "<think>x</think>"] {
            let out = extract_string_field(raw, "query", "safe", true, ExtractMode::QueryGeneration);
            assert!(!matches!(out.trim(), "" | "{}" | "[]"), "input {raw:?}");
        }
    }

    #[test]
    fn test_strip_single_span() {
        assert_eq!(strip_thinking_tokens("<think>abc</think>hello"), "hello");
    }

    #[test]
    fn test_strip_multiple_spans() {
        assert_eq!(
            strip_thinking_tokens("<think>a</think>one<think>b</think>two"),
            "onetwo"
        );
    }

    #[test]
    fn test_strip_unterminated_left_untouched() {
        assert_eq!(
            strip_thinking_tokens("<think>unterminated"),
            "<think>unterminated"
        );
    }

    #[test]
    fn test_strip_end_before_start_terminates() {
        // The end marker before the start marker does not pair with it.
        let text = "</think>tail<think>open";
        assert_eq!(strip_thinking_tokens(text), text);
    }

    #[test]
    fn test_strip_no_markers() {
        assert_eq!(strip_thinking_tokens("plain text"), "plain text");
    }
}
