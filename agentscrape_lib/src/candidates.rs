//! Candidate locator: recovers JSON trees embedded in a page's scripts.
//!
//! Three strategies feed one list, in order:
//! 1. the framework data island (`script#__NEXT_DATA__`),
//! 2. every `script[type="application/json"]`,
//! 3. loose object literals inside any other script that mention an agent
//!    marker key, cleaned up (`undefined`, trailing commas) before parsing.
//!
//! Duplicates across strategies are expected; the reconciler absorbs them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Keys whose presence marks a script object as agent-bearing.
const MARKER_KEYS: &[&str] = &["person_name", "phones"];

static NEXT_DATA_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script#__NEXT_DATA__").expect("invalid selector: next data")
});

static JSON_SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/json"]"#).expect("invalid selector: json script")
});

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("invalid selector: script"));

static UNDEFINED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bundefined\b").expect("invalid regex: undefined"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("invalid regex: trailing comma"));

/// Parses `html` and returns every candidate tree it embeds.
pub fn locate_candidates(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    locate_candidates_in(&document)
}

/// Same as [`locate_candidates`] over an already parsed document.
pub fn locate_candidates_in(document: &Html) -> Vec<Value> {
    let mut candidates = Vec::new();
    let mut consumed = HashSet::new();

    if let Some(script) = document.select(&NEXT_DATA_SELECTOR).next() {
        let text = script_text(script);
        if !text.trim().is_empty() {
            match serde_json::from_str::<Value>(&text) {
                Ok(tree) => {
                    candidates.push(tree);
                    consumed.insert(script.id());
                }
                Err(e) => tracing::debug!("Skipping malformed __NEXT_DATA__ payload: {}", e),
            }
        }
    }
    let island_count = candidates.len();

    for script in document.select(&JSON_SCRIPT_SELECTOR) {
        if consumed.contains(&script.id()) {
            continue;
        }
        let text = script_text(script);
        if text.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(tree) => {
                candidates.push(tree);
                consumed.insert(script.id());
            }
            Err(e) => tracing::debug!("Skipping malformed JSON script: {}", e),
        }
    }
    let json_script_count = candidates.len() - island_count;

    for script in document.select(&SCRIPT_SELECTOR) {
        if consumed.contains(&script.id()) {
            continue;
        }
        let text = script_text(script);
        if !mentions_agent_marker(&text) {
            continue;
        }
        for span in marker_object_spans(&text) {
            match parse_loose_fragment(span) {
                Ok(tree) => candidates.push(tree),
                Err(e) => tracing::debug!(
                    "Discarding script fragment ({} bytes): {}",
                    span.len(),
                    e
                ),
            }
        }
    }

    tracing::debug!(
        "Located {} candidate trees ({} data island, {} JSON scripts, {} fragments)",
        candidates.len(),
        island_count,
        json_script_count,
        candidates.len() - island_count - json_script_count
    );
    candidates
}

fn script_text(script: ElementRef) -> String {
    script.text().collect()
}

fn mentions_agent_marker(text: &str) -> bool {
    text.contains("person_name") || text.contains("\"phones\"")
}

/// Rewrites JavaScript-isms that plain JSON rejects, then parses.
pub fn parse_loose_fragment(fragment: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&clean_fragment(fragment))
}

/// Replaces the `undefined` token with `null` and drops trailing commas
/// before `}` or `]`.
pub fn clean_fragment(fragment: &str) -> String {
    let nulled = UNDEFINED_TOKEN.replace_all(fragment, "null");
    TRAILING_COMMA.replace_all(&nulled, "$1").into_owned()
}

struct OpenBracket {
    byte: u8,
    start: usize,
    owns_marker: bool,
}

/// Finds balanced `{...}` spans that directly own a marker key, in order of
/// their opening brace.
///
/// The scan is string-aware (double and single quotes, backslash escapes)
/// and skips `//` and `/* */` comments outside strings. Mismatched closers
/// unwind the stack to the nearest matching opener, so unbalanced script
/// text degrades to fewer spans instead of failing.
pub fn marker_object_spans(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut stack: Vec<OpenBracket> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let end = string_end(bytes, i + 1, quote);
                if quote == b'"' && end < bytes.len() {
                    let literal = &text[i + 1..end];
                    if MARKER_KEYS.contains(&literal) && next_significant(bytes, end + 1) == Some(b':') {
                        if let Some(top) = stack.last_mut() {
                            if top.byte == b'{' {
                                top.owns_marker = true;
                            }
                        }
                    }
                }
                i = end + 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2);
                continue;
            }
            open @ (b'{' | b'[') => stack.push(OpenBracket {
                byte: open,
                start: i,
                owns_marker: false,
            }),
            b'}' => {
                while let Some(open) = stack.pop() {
                    if open.byte == b'{' {
                        if open.owns_marker {
                            spans.push((open.start, i));
                        }
                        break;
                    }
                }
            }
            b']' => {
                while let Some(open) = stack.pop() {
                    if open.byte == b'[' {
                        break;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    spans.sort_unstable();
    spans
        .into_iter()
        .map(|(start, end)| &text[start..=end])
        .collect()
}

/// Index of the closing quote for a string whose body starts at `i`, or
/// `bytes.len()` when the string never closes.
fn string_end(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn next_significant(bytes: &[u8], from: usize) -> Option<u8> {
    bytes
        .get(from..)?
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(body: &str) -> String {
        format!("<html><head></head><body>{}</body></html>", body)
    }

    #[test]
    fn reads_next_data_island() {
        let html = page(
            r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"agents":[]}}</script>"#,
        );
        let candidates = locate_candidates(&html);
        assert_eq!(candidates, vec![json!({"props": {"agents": []}})]);
    }

    #[test]
    fn malformed_json_script_does_not_stop_others() {
        let html = page(concat!(
            r#"<script type="application/json">{"a": </script>"#,
            r#"<script type="application/json">{"b": 2}</script>"#,
        ));
        let candidates = locate_candidates(&html);
        assert_eq!(candidates, vec![json!({"b": 2})]);
    }

    #[test]
    fn recovers_fragment_with_undefined_and_trailing_commas() {
        let html = page(
            r#"<script>window.__STATE__ = {agents: [{"person_name": "Jane Doe", "photo": undefined, "phones": [{"number": "2065551234",},],}]};</script>"#,
        );
        let candidates = locate_candidates(&html);
        assert_eq!(
            candidates,
            vec![json!({
                "person_name": "Jane Doe",
                "photo": null,
                "phones": [{"number": "2065551234"}]
            })]
        );
    }

    #[test]
    fn scripts_without_markers_are_ignored() {
        let html = page(r#"<script>var config = {"theme": "dark"};</script>"#);
        assert!(locate_candidates(&html).is_empty());
    }

    #[test]
    fn parsed_json_scripts_are_not_rescanned() {
        let html = page(
            r#"<script type="application/json">{"person_name": "A B", "phones": []}</script>"#,
        );
        assert_eq!(locate_candidates(&html).len(), 1);
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(locate_candidates("").is_empty());
        assert!(locate_candidates("<p>no scripts here</p>").is_empty());
    }

    #[test]
    fn spans_are_balanced_and_ordered_by_start() {
        let text = r#"x = {"person_name": "A", "office": {"phones": [{"number": "1"}]}}; y = {"other": 1};"#;
        let spans = marker_object_spans(text);
        assert_eq!(
            spans,
            vec![
                r#"{"person_name": "A", "office": {"phones": [{"number": "1"}]}}"#,
                r#"{"phones": [{"number": "1"}]}"#,
            ]
        );
    }

    #[test]
    fn braces_inside_strings_do_not_break_spans() {
        let text = r#"{"person_name": "Curly } Brace {", "note": "it's \"quoted\""}"#;
        assert_eq!(marker_object_spans(text), vec![text]);
    }

    #[test]
    fn marker_as_value_is_not_a_key() {
        let text = r#"{"label": "phones", "x": 1}"#;
        assert!(marker_object_spans(text).is_empty());
    }

    #[test]
    fn comments_are_skipped() {
        let text = "// don't {\n{\"phones\": []} /* it's } */";
        assert_eq!(marker_object_spans(text), vec![r#"{"phones": []}"#]);
    }

    #[test]
    fn unbalanced_text_degrades_gracefully() {
        let text = r#"{"phones": [1, 2 } ] {"person_name": "B", "phones": []"#;
        assert_eq!(marker_object_spans(text), vec![r#"{"phones": [1, 2 }"#]);
    }

    #[test]
    fn clean_fragment_rewrites_js_tokens() {
        assert_eq!(
            clean_fragment(r#"{"a": undefined, "b": [1, 2, ], }"#),
            r#"{"a": null, "b": [1, 2]}"#
        );
        assert_eq!(clean_fragment(r#"{"undefinedness": 1}"#), r#"{"undefinedness": 1}"#);
    }
}
