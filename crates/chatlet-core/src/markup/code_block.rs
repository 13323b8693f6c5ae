use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, append_highlighted_html_for_styled_line};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::markup::formatter::escape_html;

/// Global syntax set for language definitions (initialized once)
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Global theme set for syntax highlighting themes (initialized once)
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

static HIGHLIGHT_CACHE: Lazy<RwLock<HashMap<(String, String), String>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Every streamed chunk of a growing code block caches one more partial, so
/// the map is cleared wholesale once it reaches this many entries.
const HIGHLIGHT_CACHE_CAP: usize = 256;

const THEME_NAME: &str = "Solarized (dark)";

/// Grammar substituted when the sniffed one is unknown to the highlighter.
const DEFAULT_GRAMMAR: &str = "javascript";

fn find_syntax(lang: &str) -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_token(lang)
        .or_else(|| SYNTAX_SET.find_syntax_by_token(DEFAULT_GRAMMAR))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

/// Highlight one code segment to inline-styled markup. Re-rendering the same
/// block on every stream chunk is the common case, so results are cached.
fn highlight_to_html(code: &str, lang: &str) -> String {
    let cache_key = (code.to_string(), lang.to_string());
    if let Some(cached) = HIGHLIGHT_CACHE.read().get(&cache_key) {
        return cached.clone();
    }

    let syntax = find_syntax(lang);
    let theme = &THEME_SET.themes[THEME_NAME];
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut html = String::new();
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => {
                if append_highlighted_html_for_styled_line(
                    &ranges[..],
                    IncludeBackground::No,
                    &mut html,
                )
                .is_err()
                {
                    html.push_str(&escape_html(line));
                }
            }
            Err(_) => html.push_str(&escape_html(line)),
        }
    }

    let mut cache = HIGHLIGHT_CACHE.write();
    if cache.len() >= HIGHLIGHT_CACHE_CAP {
        cache.clear();
    }
    cache.insert(cache_key, html.clone());
    html
}

/// Render a trimmed code segment as a self-contained block: highlighted
/// markup plus one copy control. The control's activation is wired by the
/// controller once the block is attached to the live view.
pub fn render_code_block(code: &str, lang: &str, block_index: usize) -> String {
    let body = highlight_to_html(code, lang);
    format!(
        "<pre><code class=\"language-{lang}\">{body}</code>\
         <button class=\"copy-btn\" data-block=\"{block_index}\">Copy</button></pre>"
    )
}
