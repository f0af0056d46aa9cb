//! Markdown structural parser: heading hierarchy plus list absorption.
//!
//! Conversion runs in two passes over the flat block sequence:
//!
//! 1. **Nest by heading depth.** Headings open a new level under the nearest
//!    preceding heading of strictly lesser depth; everything else attaches
//!    to the current insertion point. The result is an arena of structural
//!    items with parent indices used only for backtracking.
//! 2. **Emit output nodes.** Sibling sequences become [`Node`] lists with a
//!    one-step lookahead: a list directly after a non-list sibling is
//!    absorbed as that sibling's children instead of staying a sibling. A
//!    lone list at a level contributes its items directly, without a
//!    wrapper node.

use std::collections::HashSet;

use crate::models::mindmap::{MindMap, Node, random_id};
use crate::parsing::blocks::{Block, ListItem, collect_blocks};

/// Topic given to a list that is emitted as a node of its own, which only
/// happens when no preceding sibling was there to absorb it.
pub const LIST_TOPIC: &str = "List";

const SYNTHETIC_ROOT: usize = 0;

#[derive(Debug, thiserror::Error)]
enum ParseError {
    #[error("structural item index {0} out of bounds")]
    BadItem(usize),
    #[error("block index {0} out of bounds")]
    BadBlock(usize),
}

/// Convert markdown source to a mind map.
///
/// Never fails outward: whatever goes wrong internally is logged and the
/// caller receives the minimal map (root topic = `root_label`, no
/// children). The result feeds a renderer that cannot display an error.
pub fn parse_markdown(content: &str, root_label: &str, use_first_heading_as_root: bool) -> MindMap {
    match build_map(content, root_label, use_first_heading_as_root) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("markdown conversion failed, returning bare root: {e}");
            MindMap::fallback(root_label)
        }
    }
}

fn build_map(
    content: &str,
    root_label: &str,
    use_first_heading_as_root: bool,
) -> Result<MindMap, ParseError> {
    let blocks = collect_blocks(content);
    let arena = nest_by_heading(&blocks)?;
    let mut ids = IdGen::default();

    let root_children = &arena.item(SYNTHETIC_ROOT)?.children;
    let promoted = if use_first_heading_as_root {
        first_depth_one_heading(&arena, &blocks, root_children)?
    } else {
        None
    };

    let (topic, child_indices) = match promoted {
        // Everything before the first H1 is discarded; its subtree survives.
        Some((idx, text)) => (text, arena.item(idx)?.children.as_slice()),
        None => (root_label.to_string(), root_children.as_slice()),
    };

    let children = emit_siblings(&arena, &blocks, child_indices, &mut ids)?;
    Ok(MindMap::new(Node::with_children(
        ids.random(),
        topic,
        children,
    )))
}

/// A structural item: one block nested under the heading hierarchy.
///
/// Items live in an index arena; `parent` is a traversal-only
/// back-reference used while backtracking up the heading chain.
struct StructItem {
    /// Heading depth; `Some(0)` for the synthetic root, `None` for
    /// non-heading blocks (which never become insertion points)
    depth: Option<u8>,
    /// Index into the flat block sequence; `None` for the synthetic root
    block: Option<usize>,
    parent: Option<usize>,
    children: Vec<usize>,
}

struct StructArena {
    items: Vec<StructItem>,
}

impl StructArena {
    fn item(&self, idx: usize) -> Result<&StructItem, ParseError> {
        self.items.get(idx).ok_or(ParseError::BadItem(idx))
    }

    /// The block behind an item, or `None` for the synthetic root.
    fn block_of<'b>(&self, blocks: &'b [Block], idx: usize) -> Result<Option<&'b Block>, ParseError> {
        match self.item(idx)?.block {
            Some(block_idx) => Ok(Some(
                blocks.get(block_idx).ok_or(ParseError::BadBlock(block_idx))?,
            )),
            None => Ok(None),
        }
    }
}

/// Pass 1: reshape the flat block sequence into a heading-nested tree.
fn nest_by_heading(blocks: &[Block]) -> Result<StructArena, ParseError> {
    let mut items = vec![StructItem {
        depth: Some(0),
        block: None,
        parent: None,
        children: Vec::new(),
    }];
    let mut cursor = SYNTHETIC_ROOT;

    for (block_idx, block) in blocks.iter().enumerate() {
        let depth = match block {
            Block::Heading { level, .. } => {
                // Backtrack until the insertion point is strictly shallower
                while cursor != SYNTHETIC_ROOT
                    && items
                        .get(cursor)
                        .ok_or(ParseError::BadItem(cursor))?
                        .depth
                        .unwrap_or(0)
                        >= *level
                {
                    cursor = items
                        .get(cursor)
                        .ok_or(ParseError::BadItem(cursor))?
                        .parent
                        .unwrap_or(SYNTHETIC_ROOT);
                }
                Some(*level)
            }
            _ => None,
        };

        let idx = items.len();
        items.push(StructItem {
            depth,
            block: Some(block_idx),
            parent: Some(cursor),
            children: Vec::new(),
        });
        items
            .get_mut(cursor)
            .ok_or(ParseError::BadItem(cursor))?
            .children
            .push(idx);

        // Headings become the new insertion point; other blocks do not
        if depth.is_some() {
            cursor = idx;
        }
    }

    Ok(StructArena { items })
}

/// First direct child of the synthetic root that is a depth-1 heading.
fn first_depth_one_heading(
    arena: &StructArena,
    blocks: &[Block],
    root_children: &[usize],
) -> Result<Option<(usize, String)>, ParseError> {
    for &idx in root_children {
        if arena.item(idx)?.depth == Some(1)
            && let Some(block) = arena.block_of(blocks, idx)?
        {
            return Ok(Some((idx, block.topic_text().to_string())));
        }
    }
    Ok(None)
}

/// Pass 2: turn a sibling sequence of structural items into output nodes.
///
/// Runs as a single forward pass with one-step lookahead; an absorbed list
/// is skipped by index rather than removed from the sequence.
fn emit_siblings(
    arena: &StructArena,
    blocks: &[Block],
    siblings: &[usize],
    ids: &mut IdGen,
) -> Result<Vec<Node>, ParseError> {
    // A lone list at a level contributes its items directly
    if let [only] = siblings
        && let Some(Block::List { items }) = arena.block_of(blocks, *only)?
    {
        return Ok(emit_list_items(items, ids));
    }

    let mut nodes = Vec::new();
    let mut skip_next = false;

    for (pos, &item_idx) in siblings.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }

        let Some(block) = arena.block_of(blocks, item_idx)? else {
            continue;
        };

        if let Block::List { items } = block {
            // A list nobody absorbed keeps its items under a placeholder
            nodes.push(Node::with_children(
                ids.random(),
                LIST_TOPIC,
                emit_list_items(items, ids),
            ));
            continue;
        }

        let id = match block.offset() {
            Some(offset) => ids.from_offset(offset),
            None => ids.random(),
        };

        // Lookahead: a list right behind this block becomes its children,
        // overriding any structural children the block carries.
        let mut absorbed = None;
        if let Some(&next_idx) = siblings.get(pos + 1)
            && let Some(Block::List { items }) = arena.block_of(blocks, next_idx)?
        {
            skip_next = true;
            absorbed = Some(emit_list_items(items, ids));
        }

        let children = match absorbed {
            Some(children) => children,
            None => emit_siblings(arena, blocks, &arena.item(item_idx)?.children, ids)?,
        };

        nodes.push(Node::with_children(id, block.topic_text(), children));
    }

    Ok(nodes)
}

fn emit_list_items(items: &[ListItem], ids: &mut IdGen) -> Vec<Node> {
    items
        .iter()
        .map(|item| {
            let id = ids.from_offset(item.offset);
            let children = emit_list_items(&item.children, ids);
            Node::with_children(id, item.text.clone(), children)
        })
        .collect()
}

/// Mints ids that are unique within one conversion. Source offsets give
/// stable ids across re-parses of the same text; anything without an
/// offset gets a random one.
#[derive(Default)]
struct IdGen {
    used: HashSet<String>,
}

impl IdGen {
    fn from_offset(&mut self, offset: usize) -> String {
        let id = format!("mm-{offset}");
        if self.used.insert(id.clone()) {
            id
        } else {
            self.random()
        }
    }

    fn random(&mut self) -> String {
        loop {
            let id = random_id();
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn topics(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.topic.as_str()).collect()
    }

    #[test]
    fn headings_nest_by_depth() {
        let map = parse_markdown("# A\n\n## B\n\n## C\n\n# D\n", "doc", false);

        assert_eq!(map.root.topic, "doc");
        assert_eq!(topics(&map.root.children), vec!["A", "D"]);
        assert_eq!(topics(&map.root.children[0].children), vec!["B", "C"]);
    }

    #[test]
    fn heading_backtracks_past_deeper_levels() {
        let map = parse_markdown("# A\n\n### Deep\n\n## Shallower\n", "doc", false);

        let a = &map.root.children[0];
        assert_eq!(topics(&a.children), vec!["Deep", "Shallower"]);
    }

    #[test]
    fn list_after_heading_is_absorbed() {
        let map = parse_markdown("# A\n\n- x\n- y\n", "doc", false);

        assert_eq!(topics(&map.root.children), vec!["A"]);
        assert_eq!(topics(&map.root.children[0].children), vec!["x", "y"]);
    }

    #[test]
    fn list_after_paragraph_attaches_to_the_paragraph() {
        // Absorption always targets the immediately preceding sibling,
        // even when a heading sits right above the paragraph.
        let map = parse_markdown("# A\n\nintro\n\n- x\n- y\n", "doc", false);

        let a = &map.root.children[0];
        assert_eq!(topics(&a.children), vec!["intro"]);
        assert_eq!(topics(&a.children[0].children), vec!["x", "y"]);
    }

    #[test]
    fn lone_top_level_list_flattens_into_root() {
        let map = parse_markdown("- x\n- y\n", "doc", false);

        assert_eq!(topics(&map.root.children), vec!["x", "y"]);
    }

    #[test]
    fn unabsorbed_list_gets_placeholder_topic() {
        // Two sibling lists: the second has no non-list sibling before it
        let content = "- a\n\nparagraph\n\ntail\n\n1. b\n\n2. c\n";
        let map = parse_markdown(content, "doc", false);

        let placeholder = map
            .root
            .children
            .iter()
            .find(|n| n.topic == LIST_TOPIC)
            .expect("expected a placeholder list node");
        assert_eq!(topics(&placeholder.children), vec!["a"]);
    }

    #[test]
    fn first_heading_becomes_root_when_enabled() {
        let map = parse_markdown("intro text\n\n# Title\n\n## Sub\n", "doc", true);

        assert_eq!(map.root.topic, "Title");
        assert_eq!(topics(&map.root.children), vec!["Sub"]);
    }

    #[test]
    fn missing_h1_degrades_to_root_label() {
        let with_option = parse_markdown("## Only h2\n\ntext\n", "doc", true);
        let without = parse_markdown("## Only h2\n\ntext\n", "doc", false);

        assert_eq!(with_option.root.topic, "doc");
        assert_eq!(with_option.root.children, without.root.children);
    }

    #[test]
    fn empty_document_yields_bare_root() {
        let map = parse_markdown("", "doc", false);

        assert_eq!(map.root.topic, "doc");
        assert!(map.root.children.is_empty());
    }

    #[test]
    fn offset_ids_are_stable_across_parses() {
        let content = "# A\n\n- x\n- y\n";
        let first = parse_markdown(content, "doc", false);
        let second = parse_markdown(content, "doc", false);

        let a1 = &first.root.children[0];
        let a2 = &second.root.children[0];
        assert_eq!(a1.id, a2.id);
        assert_eq!(a1.children[0].id, a2.children[0].id);
    }

    #[test]
    fn ids_are_unique_within_a_conversion() {
        let content = "# A\n\n## B\n\n- x\n  - y\n- z\n\n# C\n\npara\n";
        let map = parse_markdown(content, "doc", false);

        let mut seen = HashSet::new();
        let mut stack = vec![&map.root];
        while let Some(node) = stack.pop() {
            assert!(seen.insert(node.id.clone()), "duplicate id {}", node.id);
            stack.extend(node.children.iter());
        }
    }

    #[test]
    fn nested_list_absorbed_under_heading_keeps_structure() {
        let map = parse_markdown("# A\n\n- x\n  - deep\n- y\n", "doc", false);

        let a = &map.root.children[0];
        assert_eq!(topics(&a.children), vec!["x", "y"]);
        assert_eq!(topics(&a.children[0].children), vec!["deep"]);
    }
}
