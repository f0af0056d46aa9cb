pub mod markdown_file;
pub mod mindmap;

pub use markdown_file::MarkdownFile;
pub use mindmap::{MindMap, Node};
