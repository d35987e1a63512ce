//! Citation stripping for generated slide text
//!
//! Research-backed completions arrive studded with `[1]`-style markers and
//! phrases like "according to sources". Slides must show neither.

use regex::Regex;
use std::sync::LazyLock;

static SOURCES_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^\s*(?:#+\s*)?(?:\*\*)?(?:sources|references|citations)(?:\*\*)?\s*:?\s*$.*\z")
        .expect("valid regex")
});

// [1], [12], [1, 2], [1-3]
static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\d+(?:\s*[,\-–]\s*\d+)*\]").expect("valid regex"));

static SOURCE_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\((?:sources?|via):[^)]*\)").expect("valid regex"));

static ATTRIBUTION_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:",
        r"(?i:according to (?:recent |various |multiple |several )?(?:sources|reports|research|studies|data))",
        r"|(?i:as reported by) (?:[A-Z][\w&\-]*\s?){1,4}",
        r"|(?i:as (?:cited|noted|mentioned) (?:in|by) (?:sources|reports))",
        r")\s*,?\s*",
    ))
    .expect("valid regex")
});

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([.,;:!?])").expect("valid regex"));

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").expect("valid regex"));

/// Remove citation markers, attribution phrases and trailing source lists.
///
/// Returns `None` when only citation residue is left, so callers can treat
/// the response as empty.
pub fn strip_citations(text: &str) -> Option<String> {
    let mut out = SOURCES_SECTION.replace(text, "").into_owned();
    out = remove_markers(out);
    out = SOURCE_PARENTHETICAL.replace_all(&out, "").into_owned();
    out = remove_attributions(&out);
    // The passes above can splice a new marker together, e.g. "[3 (Source: X)]".
    out = remove_markers(out);
    out = SPACE_BEFORE_PUNCT.replace_all(&out, "$1").into_owned();
    out = MULTI_SPACE.replace_all(&out, " ").into_owned();

    let out = out.trim();
    if out.chars().any(char::is_alphanumeric) {
        Some(out.to_string())
    } else {
        None
    }
}

/// True if `text` still contains a `[n]` marker
pub fn has_citation_marker(text: &str) -> bool {
    MARKER.is_match(text)
}

// Removing one marker can expose another, e.g. "[[1]2]".
fn remove_markers(mut text: String) -> String {
    while CITATION_MARKER.is_match(&text) {
        text = CITATION_MARKER.replace_all(&text, "").into_owned();
    }
    text
}

fn remove_attributions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut capitalize_next = false;

    for m in ATTRIBUTION_PHRASE.find_iter(text) {
        push_segment(&mut out, &text[last..m.start()], capitalize_next);
        let before = out.trim_end_matches(|c| c == ' ' || c == '\t');
        capitalize_next = before.is_empty()
            || before.ends_with(|c: char| matches!(c, '.' | '!' | '?' | ':' | '\n'));
        last = m.end();
    }
    push_segment(&mut out, &text[last..], capitalize_next);
    out
}

fn push_segment(out: &mut String, segment: &str, capitalize: bool) {
    let mut chars = segment.chars();
    if capitalize {
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
        }
    }
    out.push_str(chars.as_str());
}
