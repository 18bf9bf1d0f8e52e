use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{Block, BlockType, Page};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a markdown file into a page titled after the file name
///
/// A page always has at least one block, so an empty file yields a single
/// empty paragraph.
pub fn read_page(path: &Path) -> Result<Page, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let markdown = fs::read_to_string(path)?;
    let mut blocks = parse_markdown(&markdown);
    if blocks.is_empty() {
        blocks.push(Block::paragraph(""));
    }
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::info!("loaded {} blocks from {}", blocks.len(), path.display());
    Ok(Page::new(title, blocks))
}

/// Write a page as markdown, creating parent directories as needed
pub fn write_page(path: &Path, page: &Page) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_markdown(page))?;
    log::info!("saved {} blocks to {}", page.len(), path.display());
    Ok(())
}

/// Split markdown into top-level blocks
pub fn parse_markdown(markdown: &str) -> Vec<Block> {
    let mut processor = MarkdownProcessor::default();
    for event in Parser::new(markdown) {
        processor.process_event(event);
    }
    processor.blocks
}

#[derive(Default)]
struct MarkdownProcessor {
    blocks: Vec<Block>,
    current_text: String,
    /// Ordered flag of each open list, innermost last
    lists: Vec<bool>,
    /// An item's text is collected but not yet emitted
    item_open: bool,
    quote_depth: usize,
    /// Destination and alt text of the image being read
    image: Option<(String, String)>,
}

impl MarkdownProcessor {
    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if !self.item_open && self.quote_depth == 0 {
                    self.current_text.clear();
                } else if !self.current_text.is_empty() {
                    // Second paragraph of an item or quote
                    self.current_text.push('\n');
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if !self.item_open && self.quote_depth == 0 {
                    self.flush(BlockType::Paragraph);
                }
            }
            Event::Start(Tag::Heading { .. }) => {
                self.current_text.clear();
            }
            Event::End(TagEnd::Heading(level)) => {
                let level = (level as u8).min(3);
                self.flush(BlockType::Heading(level));
            }
            Event::Start(Tag::List(first_item)) => {
                // A nested list ends the text of the item that contains it
                self.flush_item();
                self.lists.push(first_item.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.current_text.clear();
                self.item_open = true;
            }
            Event::End(TagEnd::Item) => {
                self.flush_item();
            }
            Event::Start(Tag::BlockQuote(_)) => {
                if self.quote_depth == 0 {
                    self.current_text.clear();
                }
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.flush(BlockType::Quote);
                }
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.current_text.clear();
            }
            Event::End(TagEnd::CodeBlock) => {
                let code = self.current_text.trim_end_matches('\n').to_string();
                self.current_text = code;
                self.flush(BlockType::Paragraph);
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                self.image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = self.image.take() {
                    self.blocks.push(Block::new(BlockType::Image { src }, alt));
                }
            }
            Event::Rule => {
                self.blocks.push(Block::new(BlockType::Divider, ""));
            }
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push_text(&format!("`{code}`")),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.image {
            Some((_, alt)) => alt.push_str(text),
            None => self.current_text.push_str(text),
        }
    }

    fn flush_item(&mut self) {
        if !self.item_open {
            return;
        }
        self.item_open = false;
        let kind = match self.lists.last() {
            Some(true) => BlockType::NumberedListItem,
            _ => BlockType::ListItem,
        };
        let text = std::mem::take(&mut self.current_text);
        self.blocks.push(Block::new(kind, text.trim()));
    }

    /// Emit the collected text as a block; paragraphs that held only an
    /// image produce nothing here
    fn flush(&mut self, kind: BlockType) {
        let text = std::mem::take(&mut self.current_text);
        let text = text.trim();
        if text.is_empty() && kind == BlockType::Paragraph {
            return;
        }
        self.blocks.push(Block::new(kind, text));
    }
}

/// Render a page as markdown
pub fn to_markdown(page: &Page) -> String {
    let mut out = String::new();
    let mut number = 0;
    let mut previous: Option<&BlockType> = None;

    for block in &page.content {
        let continues_list = matches!(
            (previous, &block.kind),
            (Some(BlockType::ListItem), BlockType::ListItem)
                | (Some(BlockType::NumberedListItem), BlockType::NumberedListItem)
        );
        if previous.is_some() {
            out.push_str(if continues_list { "\n" } else { "\n\n" });
        }
        if block.kind == BlockType::NumberedListItem {
            number = if continues_list { number + 1 } else { 1 };
        }

        match &block.kind {
            BlockType::Paragraph => out.push_str(&hard_breaks(&block.content)),
            BlockType::Heading(level) => {
                out.push_str(&"#".repeat(usize::from(*level)));
                out.push(' ');
                out.push_str(&block.content.replace('\n', " "));
            }
            BlockType::ListItem => {
                out.push_str("- ");
                out.push_str(&hard_breaks(&block.content));
            }
            BlockType::NumberedListItem => {
                out.push_str(&format!("{number}. "));
                out.push_str(&hard_breaks(&block.content));
            }
            BlockType::Quote => {
                let quoted: Vec<String> =
                    block.content.lines().map(|line| format!("> {line}")).collect();
                out.push_str(&quoted.join("\n>\n"));
            }
            BlockType::Divider => out.push_str("---"),
            BlockType::Image { src } => out.push_str(&format!("![{}]({src})", block.content)),
        }
        previous = Some(&block.kind);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Line breaks inside a block survive as backslash hard breaks
fn hard_breaks(text: &str) -> String {
    text.replace('\n', "\\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn outline(blocks: &[Block]) -> String {
        blocks
            .iter()
            .map(|block| format!("{:?}: {:?}", block.kind, block.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_parse_markdown_blocks() {
        let markdown = "# Title\n\nSome *text* with `code`.\n\n- one\n- two\n\n\
                        1. first\n2. second\n\n> quoted\n\n---\n\n\
                        ![cat](cat.png)\n\n#### deep\n";
        let blocks = parse_markdown(markdown);

        insta::assert_snapshot!(outline(&blocks), @r#"
        Heading(1): "Title"
        Paragraph: "Some text with `code`."
        ListItem: "one"
        ListItem: "two"
        NumberedListItem: "first"
        NumberedListItem: "second"
        Quote: "quoted"
        Divider: ""
        Image { src: "cat.png" }: "cat"
        Heading(3): "deep"
        "#);
    }

    #[test]
    fn test_nested_list_items_become_flat_blocks() {
        let blocks = parse_markdown("- parent\n  - child\n- sibling\n");
        let texts: Vec<&str> = blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(texts, vec!["parent", "child", "sibling"]);
    }

    #[test]
    fn test_to_markdown_numbers_and_groups_lists() {
        let page = Page::new(
            "Test",
            vec![
                Block::new(BlockType::Heading(2), "Plan"),
                Block::new(BlockType::NumberedListItem, "a"),
                Block::new(BlockType::NumberedListItem, "b"),
                Block::new(BlockType::ListItem, "c"),
                Block::paragraph("line one\nline two"),
                Block::new(BlockType::Divider, ""),
            ],
        );

        assert_eq!(
            to_markdown(&page),
            "## Plan\n\n1. a\n2. b\n\n- c\n\nline one\\\nline two\n\n---\n"
        );
    }

    #[test]
    fn test_markdown_round_trip_keeps_kinds_and_text() {
        let page = Page::new(
            "Test",
            vec![
                Block::new(BlockType::Heading(1), "Title"),
                Block::paragraph("first\nsecond"),
                Block::new(BlockType::ListItem, "item"),
                Block::new(BlockType::Quote, "wise words"),
            ],
        );

        let reparsed = parse_markdown(&to_markdown(&page));

        assert_eq!(outline(&reparsed), outline(&page.content));
    }

    #[test]
    fn test_write_then_read_page() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("journal.md");
        let page = Page::new("journal", vec![Block::paragraph("hello")]);

        write_page(&path, &page).unwrap();
        let loaded = read_page(&path).unwrap();

        assert_eq!(loaded.title, "journal");
        assert_eq!(outline(&loaded.content), outline(&page.content));
    }

    #[test]
    fn test_read_empty_file_gives_one_empty_block() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.md");
        fs::write(&path, "").unwrap();

        let page = read_page(&path).unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.content[0].content, "");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_page(&temp_dir.path().join("missing.md"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }
}
