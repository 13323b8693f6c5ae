use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<\w+").expect("valid markup regex"));
static PYTHON_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*def\s+").expect("valid def regex"));
static DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:const|let|var|function)\b").expect("valid declaration regex")
});

/// Best-effort grammar classification for a fenced code segment.
///
/// Ordered heuristic, not a parser: a false classification only affects
/// highlighting color, never correctness.
pub fn sniff(code: &str) -> &'static str {
    if MARKUP_RE.is_match(code) {
        return "html";
    }
    if PYTHON_DEF_RE.is_match(code) || code.contains("print(") {
        return "python";
    }
    if DECL_RE.is_match(code) {
        return "javascript";
    }
    "javascript"
}
