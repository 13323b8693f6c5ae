pub mod code_block;
pub mod formatter;
pub mod language;
pub mod pipeline;

pub use code_block::render_code_block;
pub use formatter::{FormatPolicy, format};
pub use language::sniff;
pub use pipeline::{Rendered, render_buffer, split_fences};
