//! Document-to-mind-map conversion.
//!
//! Two parsers share one output shape: the markdown structural parser and
//! the plaintext outline adapter. [`convert`] picks between them with a
//! first-character heuristic and is the usual entry point.

mod blocks;
pub mod markdown;
pub mod outline;

pub use markdown::{LIST_TOPIC, parse_markdown};
pub use outline::{IndentOutline, OutlineConverter, OutlineError, parse_outline, parse_outline_with};

/// Conversion options, the persisted user settings distilled to what the
/// parsers need.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Promote the first depth-1 heading to root and drop everything
    /// before it. Without an H1 this has no effect.
    pub use_first_heading_as_root: bool,
}

/// Convert a document to a mind map, choosing the parser from the content.
///
/// Text whose first non-whitespace characters are a `- ` bullet is treated
/// as a plaintext outline; everything else goes through the markdown
/// parser. This is a heuristic, not a format sniff: ambiguous input simply
/// flows into whichever parser is chosen, and that parser's own fallback
/// applies.
pub fn convert(
    content: &str,
    root_label: &str,
    options: ConvertOptions,
) -> crate::models::MindMap {
    if content.trim_start().starts_with("- ") {
        outline::parse_outline(content, root_label)
    } else {
        markdown::parse_markdown(content, root_label, options.use_first_heading_as_root)
    }
}
