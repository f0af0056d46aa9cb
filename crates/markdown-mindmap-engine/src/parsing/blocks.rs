//! Flat block collection from the pulldown-cmark event stream.
//!
//! The event stream is reduced to a flat ordered sequence of block-level
//! elements. List items keep their nested lists attached as children; all
//! inline formatting is flattened to plain text (inline code spans keep
//! their backticks, code blocks keep their raw content). Byte offsets are
//! captured so later stages can mint stable node ids.
//!
//! # Pulldown-cmark event flow for lists
//!
//! Nested lists appear INSIDE their parent item, between the parent's text
//! content and the parent's `End(Item)` event:
//!
//! ```markdown
//! - Parent
//!   - Child
//! ```
//! 1. `Start(List)` - begin outer list
//! 2. `Start(Item)` - begin parent item
//! 3. `Text("Parent")`
//! 4. `Start(List)` - begin nested list (inside parent item)
//! 5. `Start(Item)` / `Text("Child")` / `End(Item)`
//! 6. `End(List)` - end nested list
//! 7. `End(Item)` - end parent item (after the nested list)
//! 8. `End(List)` - end outer list
//!
//! The collector tracks this with two stacks: one of in-progress lists, one
//! of in-progress items.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// One block-level element from the flat document walk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Block {
    Heading {
        level: u8,
        text: String,
        offset: usize,
    },
    Paragraph {
        text: String,
        offset: usize,
    },
    List {
        items: Vec<ListItem>,
    },
    CodeBlock {
        code: String,
        offset: usize,
    },
    Quote {
        text: String,
        offset: usize,
    },
}

/// A bullet with its nested list already attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListItem {
    pub text: String,
    pub offset: usize,
    pub children: Vec<ListItem>,
}

impl Block {
    pub fn is_list(&self) -> bool {
        matches!(self, Block::List { .. })
    }

    /// Flattened text of a non-list block. Lists have no text of their own.
    pub fn topic_text(&self) -> &str {
        match self {
            Block::Heading { text, .. } | Block::Paragraph { text, .. } | Block::Quote { text, .. } => {
                text
            }
            Block::CodeBlock { code, .. } => code,
            Block::List { .. } => "",
        }
    }

    /// Source byte offset, when one was captured for this block.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Block::Heading { offset, .. }
            | Block::Paragraph { offset, .. }
            | Block::CodeBlock { offset, .. }
            | Block::Quote { offset, .. } => Some(*offset),
            Block::List { .. } => None,
        }
    }
}

/// Reduce markdown source to its flat top-level block sequence.
pub(crate) fn collect_blocks(content: &str) -> Vec<Block> {
    let mut collector = BlockCollector::new();
    for (event, range) in Parser::new(content).into_offset_iter() {
        collector.process_event(event, range.start);
    }
    collector.finish()
}

struct BlockCollector {
    blocks: Vec<Block>,

    /// Accumulates text for the current paragraph or heading
    current_text: String,
    current_offset: usize,

    /// Manages nested list parsing state
    lists: ListCollector,

    in_code_block: bool,
    code_content: String,
    code_offset: usize,

    /// Blockquote nesting depth; quoted text accumulates separately
    quote_depth: usize,
    quote_text: String,
    quote_offset: usize,
}

impl BlockCollector {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current_text: String::new(),
            current_offset: 0,
            lists: ListCollector::new(),
            in_code_block: false,
            code_content: String::new(),
            code_offset: 0,
            quote_depth: 0,
            quote_text: String::new(),
            quote_offset: 0,
        }
    }

    fn process_event(&mut self, event: Event, offset: usize) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if self.lists.is_in_item() {
                    // Item paragraphs accumulate into the item itself; the
                    // leading space is trimmed away when the item closes
                    self.lists.add_text(" ");
                } else if self.quote_depth > 0 {
                    // Quoted paragraphs fold into the quote's own text
                    if !self.quote_text.is_empty() {
                        self.quote_text.push(' ');
                    }
                } else {
                    self.flush_paragraph();
                    self.current_offset = offset;
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if !self.lists.is_in_item() && self.quote_depth == 0 {
                    self.flush_paragraph();
                }
            }
            Event::Start(Tag::Heading { .. }) => {
                self.flush_paragraph();
                self.current_offset = offset;
            }
            Event::End(TagEnd::Heading(level)) => {
                let text = self.current_text.trim().to_string();
                if !text.is_empty() {
                    self.blocks.push(Block::Heading {
                        level: level as u8,
                        text,
                        offset: self.current_offset,
                    });
                }
                self.current_text.clear();
            }
            Event::Start(Tag::List(_)) => {
                // Only flush pending text if this is a top-level list
                if !self.lists.is_parsing() {
                    self.flush_paragraph();
                }
                self.lists.start_list();
            }
            Event::End(TagEnd::List(_)) => {
                if let Some(items) = self.lists.end_list()
                    && !items.is_empty()
                {
                    self.blocks.push(Block::List { items });
                }
            }
            Event::Start(Tag::Item) => {
                self.lists.start_item(offset);
            }
            Event::End(TagEnd::Item) => {
                self.lists.end_item();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                if !self.lists.is_in_item() {
                    self.flush_paragraph();
                }
                self.in_code_block = true;
                self.code_content.clear();
                self.code_offset = offset;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                // Raw content verbatim, minus the terminating newline
                let code = std::mem::take(&mut self.code_content);
                let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
                if self.lists.is_in_item() {
                    self.lists.add_text(&code);
                } else {
                    self.blocks.push(Block::CodeBlock {
                        code,
                        offset: self.code_offset,
                    });
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush_paragraph();
                if self.quote_depth == 0 {
                    self.quote_text.clear();
                    self.quote_offset = offset;
                }
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    let text = std::mem::take(&mut self.quote_text);
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        self.blocks.push(Block::Quote {
                            text,
                            offset: self.quote_offset,
                        });
                    }
                }
            }
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_content.push_str(&text);
                } else {
                    self.push_inline(&text);
                }
            }
            Event::Code(code) => {
                // Inline code spans keep their backticks
                self.push_inline(&format!("`{code}`"));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_inline(&html);
            }
            Event::SoftBreak | Event::HardBreak => {
                if self.in_code_block {
                    self.code_content.push('\n');
                } else {
                    self.push_inline(" ");
                }
            }
            _ => {}
        }
    }

    /// Route flattened inline text to whichever block is being built.
    fn push_inline(&mut self, text: &str) {
        if self.lists.is_in_item() {
            self.lists.add_text(text);
        } else if self.quote_depth > 0 {
            self.quote_text.push_str(text);
        } else {
            self.current_text.push_str(text);
        }
    }

    fn flush_paragraph(&mut self) {
        let text = self.current_text.trim().to_string();
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph {
                text,
                offset: self.current_offset,
            });
        }
        self.current_text.clear();
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }
}

/// Tracks the two stacks needed while pulldown-cmark walks nested lists.
struct ListCollector {
    /// One entry per open list; items accumulate into the innermost
    list_stack: Vec<Vec<ListItem>>,

    /// One entry per open item; text accumulates into the innermost
    item_stack: Vec<ListItem>,

    in_item: bool,
}

impl ListCollector {
    fn new() -> Self {
        Self {
            list_stack: Vec::new(),
            item_stack: Vec::new(),
            in_item: false,
        }
    }

    fn is_parsing(&self) -> bool {
        !self.list_stack.is_empty()
    }

    fn is_in_item(&self) -> bool {
        self.in_item
    }

    fn start_list(&mut self) {
        self.list_stack.push(Vec::new());
    }

    /// Close the current list. A top-level list is handed back to the
    /// caller; a nested one becomes the children of the enclosing item.
    fn end_list(&mut self) -> Option<Vec<ListItem>> {
        let items = self.list_stack.pop()?;
        if self.list_stack.is_empty() {
            Some(items)
        } else {
            if let Some(item) = self.item_stack.last_mut() {
                item.children = items;
            }
            None
        }
    }

    fn start_item(&mut self, offset: usize) {
        self.item_stack.push(ListItem {
            text: String::new(),
            offset,
            children: Vec::new(),
        });
        self.in_item = true;
    }

    fn end_item(&mut self) {
        if let Some(mut item) = self.item_stack.pop() {
            item.text = item.text.trim().to_string();
            if let Some(items) = self.list_stack.last_mut() {
                items.push(item);
            }
        }
        self.in_item = !self.item_stack.is_empty();
    }

    fn add_text(&mut self, text: &str) {
        if let Some(item) = self.item_stack.last_mut() {
            item.text.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_headings_and_paragraphs_in_order() {
        let blocks = collect_blocks("# Title\n\nSome intro.\n\n## Section\n");

        assert_eq!(blocks.len(), 3);
        assert!(
            matches!(&blocks[0], Block::Heading { level: 1, text, .. } if text == "Title")
        );
        assert!(matches!(&blocks[1], Block::Paragraph { text, .. } if text == "Some intro."));
        assert!(
            matches!(&blocks[2], Block::Heading { level: 2, text, .. } if text == "Section")
        );
    }

    #[test]
    fn nested_list_items_keep_their_children() {
        let blocks = collect_blocks("- Parent\n  - Child\n  - Other\n- Sibling\n");

        let Block::List { items } = &blocks[0] else {
            panic!("expected a list, got {blocks:?}");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "Parent");
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[0].children[1].text, "Other");
        assert_eq!(items[1].text, "Sibling");
        assert!(items[1].children.is_empty());
    }

    #[test]
    fn inline_code_keeps_backticks() {
        let blocks = collect_blocks("# Use `map()` here\n");
        assert_eq!(blocks[0].topic_text(), "Use `map()` here");
    }

    #[test]
    fn inline_formatting_is_flattened() {
        let blocks = collect_blocks("Some **bold** and *italic* text\n");
        assert_eq!(blocks[0].topic_text(), "Some bold and italic text");
    }

    #[test]
    fn code_block_content_is_verbatim() {
        let blocks = collect_blocks("```\nfn main() {\n    body\n}\n```\n");
        assert_eq!(blocks[0].topic_text(), "fn main() {\n    body\n}");
    }

    #[test]
    fn quote_text_is_collected() {
        let blocks = collect_blocks("> quoted words\n> continue\n");
        assert!(matches!(&blocks[0], Block::Quote { text, .. } if text == "quoted words continue"));
    }

    #[test]
    fn soft_breaks_become_spaces() {
        let blocks = collect_blocks("line one\nline two\n");
        assert_eq!(blocks[0].topic_text(), "line one line two");
    }

    #[test]
    fn offsets_point_into_the_source() {
        let source = "# Title\n\nIntro text.\n";
        let blocks = collect_blocks(source);

        assert_eq!(blocks[0].offset(), Some(0));
        assert_eq!(blocks[1].offset(), Some(source.find("Intro").unwrap()));
    }

    #[test]
    fn empty_input_yields_no_blocks() {
        assert!(collect_blocks("").is_empty());
        assert!(collect_blocks("\n\n  \n").is_empty());
    }

    #[test]
    fn ordered_lists_collect_like_bullets() {
        let blocks = collect_blocks("1. first\n2. second\n");
        let Block::List { items } = &blocks[0] else {
            panic!("expected a list");
        };
        assert_eq!(items[0].text, "first");
        assert_eq!(items[1].text, "second");
    }
}
