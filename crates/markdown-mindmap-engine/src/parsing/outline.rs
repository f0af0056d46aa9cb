//! Plaintext outline adapter.
//!
//! Documents written as a line-indented `- ` outline are handed to an
//! [`OutlineConverter`], a collaborator that must return the same
//! root-wrapped tree shape as the markdown parser or signal failure. The
//! adapter overrides the root topic with the document name and turns any
//! failure into the minimal fallback map.

use crate::models::mindmap::{MindMap, Node, random_id};

#[derive(Debug, thiserror::Error)]
pub enum OutlineError {
    #[error("outline has no `- ` items")]
    Empty,
}

/// The outline-to-tree collaborator. Implementations consume raw outline
/// text and produce a full mind map, or an error the adapter recovers from.
pub trait OutlineConverter {
    fn convert(&self, content: &str) -> Result<MindMap, OutlineError>;
}

/// Convert a plaintext outline using the default converter.
pub fn parse_outline(content: &str, root_label: &str) -> MindMap {
    parse_outline_with(&IndentOutline, content, root_label)
}

/// Convert a plaintext outline with a caller-supplied converter.
///
/// Like the markdown side, this never fails outward: converter errors are
/// logged and replaced by the bare fallback root.
pub fn parse_outline_with(
    converter: &dyn OutlineConverter,
    content: &str,
    root_label: &str,
) -> MindMap {
    match converter.convert(content) {
        Ok(mut map) => {
            // The document name wins over whatever the outline's first
            // line called its root
            map.root.topic = root_label.to_string();
            map
        }
        Err(e) => {
            log::warn!("outline conversion failed, returning bare root: {e}");
            MindMap::fallback(root_label)
        }
    }
}

/// Default converter for the line-indented outline format: `- ` bullets,
/// two spaces of indentation per level.
pub struct IndentOutline;

struct StackEntry {
    level: usize,
    node: Node,
}

impl OutlineConverter for IndentOutline {
    fn convert(&self, content: &str) -> Result<MindMap, OutlineError> {
        let mut stack = vec![StackEntry {
            level: 0,
            node: Node::new(random_id(), ""),
        }];

        for line in content.lines() {
            let trimmed = line.trim();
            let Some(text) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            let level = indent / 2 + 1;

            // Close deeper or equal levels before attaching
            while stack.len() > 1
                && stack.last().map(|entry| entry.level).unwrap_or(0) >= level
            {
                attach_top(&mut stack);
            }

            stack.push(StackEntry {
                level,
                node: Node::new(random_id(), text),
            });
        }

        while stack.len() > 1 {
            attach_top(&mut stack);
        }

        let Some(entry) = stack.pop() else {
            return Err(OutlineError::Empty);
        };
        let mut root = entry.node;
        if root.children.is_empty() {
            return Err(OutlineError::Empty);
        }

        // A single top-level bullet is the outline's own root; multiple
        // top-level bullets stay children of the synthetic root.
        if root.children.len() == 1
            && let Some(only) = root.children.pop()
        {
            root = only;
        }

        Ok(MindMap::new(root))
    }
}

fn attach_top(stack: &mut Vec<StackEntry>) {
    if let Some(entry) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.node.children.push(entry.node);
    }
}
