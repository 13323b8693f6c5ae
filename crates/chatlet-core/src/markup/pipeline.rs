use super::formatter::{self, FormatPolicy};
use super::{code_block, language};

/// Output of one full re-render of the stream buffer.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Concatenated markup for the whole buffer.
    pub html: String,
    /// Trimmed text of each code block, in order, for the copy controls.
    pub code_blocks: Vec<String>,
}

/// Split a buffer on triple-backtick fence delimiters. Odd-indexed segments
/// are code, even-indexed segments are prose.
pub fn split_fences(buffer: &str) -> Vec<&str> {
    buffer.split("```").collect()
}

/// Re-render the entire accumulated buffer: prose segments through the text
/// formatter, code segments through the sniffer and code block renderer.
///
/// This runs on every received chunk. Re-formatting the whole buffer each
/// time is quadratic in response length but keeps the rendered transcript a
/// strict prefix of the final render at every instant.
pub fn render_buffer(buffer: &str, policy: FormatPolicy) -> Rendered {
    let mut html = String::new();
    let mut code_blocks = Vec::new();

    for (i, segment) in split_fences(buffer).iter().enumerate() {
        if i % 2 == 0 {
            html.push_str(&formatter::format(segment.trim(), policy));
        } else {
            let lang = language::sniff(segment);
            let code = segment.trim();
            html.push_str(&code_block::render_code_block(code, lang, code_blocks.len()));
            code_blocks.push(code.to_string());
        }
    }

    Rendered { html, code_blocks }
}
