pub mod io;
pub mod models;
pub mod parsing;

// Re-export key types for easier usage
pub use models::{markdown_file::*, mindmap::*};
pub use parsing::{ConvertOptions, convert};
