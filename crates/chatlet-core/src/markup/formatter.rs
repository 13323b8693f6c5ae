use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Which formatting pass assistant prose goes through.
///
/// `Rich` is the full markdown-like pass; `LinkifyOnly` is the simpler sibling
/// that leaves everything but links and bold verbatim. Both are selectable by
/// the host so either captured behavior can be reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatPolicy {
    Rich,
    LinkifyOnly,
}

static HR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:---|\*\*\*)\s*$").expect("valid horizontal rule regex")
});
static H3_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^### (.*)$").expect("valid heading regex"));
static H2_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^## (.*)$").expect("valid heading regex"));
static H1_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^# (.*)$").expect("valid heading regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*|__(.*?)__").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*(.*?)\*|_(.*?)_").expect("valid italic regex"));
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("valid link regex"));
static UL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:^[ \t]*[-*] .+\n?)+").expect("valid list regex"));
static UL_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*] ").expect("valid list item regex"));
static OL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:^[ \t]*\d+\.\s.+\n?)+").expect("valid list regex"));
static OL_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s").expect("valid list item regex"));
static HR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<hr>\s*){2,}").expect("valid rule-run regex"));
static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid blank-run regex"));

/// Escape the three HTML-significant characters. Runs before every other
/// transformation so model output can never inject markup.
pub(crate) fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn emphasis_sub(tag: &str, caps: &Captures) -> String {
    let inner = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("");
    format!("<{tag}>{inner}</{tag}>")
}

fn link_sub(caps: &Captures) -> String {
    let url = &caps[0];
    format!("<a href=\"{url}\" target=\"_blank\">{url}</a>")
}

fn list_sub(group: &str, item_re: &Regex, tag: &str) -> String {
    let items: String = group
        .trim()
        .split('\n')
        .map(|line| format!("<li>{}</li>", item_re.replace(line, "")))
        .collect();
    format!("<{tag}>{items}</{tag}>")
}

/// Lines already carrying a block-level construct must not be wrapped in a
/// paragraph; only genuinely plain text lines get `<p>` treatment.
fn is_block_line(trimmed: &str) -> bool {
    trimmed.starts_with("<h")
        || trimmed.starts_with("<ul>")
        || trimmed.starts_with("<ol>")
        || trimmed.starts_with("<li>")
        || trimmed.starts_with("<hr>")
        || trimmed.starts_with("<pre>")
        || trimmed.starts_with("</ul>")
        || trimmed.starts_with("</ol>")
}

/// Full markdown-like pass over one prose segment.
///
/// Inline transforms run before block grouping, so a list item containing bold
/// keeps its emphasis. Bold runs before italic so bold pairs are not
/// fragmented into italics.
fn markdownify(raw: &str) -> String {
    let html = escape_html(raw);

    // Block-level line patterns.
    let html = HR_RE.replace_all(&html, "<hr>");
    let html = H3_RE.replace_all(&html, "<h3>${1}</h3>");
    let html = H2_RE.replace_all(&html, "<h2>${1}</h2>");
    let html = H1_RE.replace_all(&html, "<h1>${1}</h1>");

    // Inline patterns.
    let html = BOLD_RE.replace_all(&html, |caps: &Captures| emphasis_sub("b", caps));
    let html = ITALIC_RE.replace_all(&html, |caps: &Captures| emphasis_sub("i", caps));
    let html = CODE_RE.replace_all(&html, "<code>${1}</code>");
    let html = LINK_RE.replace_all(&html, link_sub);

    // Group consecutive bullet / numbered lines into one list container.
    let html = UL_RE.replace_all(&html, |caps: &Captures| {
        list_sub(&caps[0], &UL_ITEM_RE, "ul")
    });
    let html = OL_RE.replace_all(&html, |caps: &Captures| {
        list_sub(&caps[0], &OL_ITEM_RE, "ol")
    });

    // Collapse rule runs and blank-line runs. The run replacement restores a
    // trailing newline so the following line still gets its own wrapper.
    let html = HR_RUN_RE.replace_all(&html, "<hr>\n");
    let html = BLANK_RUN_RE.replace_all(&html, "\n");

    // Wrap only plain text lines in a paragraph container.
    let wrapped: String = html
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_block_line(trimmed) {
                line.to_string()
            } else {
                format!("<p>{trimmed}</p>")
            }
        })
        .collect();

    wrapped.replace("<p></p>", "")
}

/// The simpler sibling pass: links and bold only.
fn linkify(raw: &str) -> String {
    let html = escape_html(raw);
    let html = LINK_RE.replace_all(&html, link_sub);
    BOLD_RE
        .replace_all(&html, |caps: &Captures| emphasis_sub("b", caps))
        .into_owned()
}

/// Turn one raw prose segment into sanitized markup under the given policy.
pub fn format(raw: &str, policy: FormatPolicy) -> String {
    match policy {
        FormatPolicy::Rich => markdownify(raw),
        FormatPolicy::LinkifyOnly => linkify(raw),
    }
}
