//! Markdown to block tree parsing.
//!
//! Built on pulldown-cmark events. Parsing is best-effort: markdown is
//! user-authored free text, so malformed input degrades to paragraphs
//! instead of failing. Inline runs are re-emitted as markdown source;
//! nesting beyond what the block model carries is flattened.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use smol_str::SmolStr;

use crate::block::Block;

/// Parse a markdown string into a block sequence. Never fails.
pub fn parse_markdown(input: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut state = ParseState::default();
    for event in Parser::new_ext(input, options) {
        state.on_event(event);
    }
    state.finish()
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,
    /// Inline markdown being accumulated for the current paragraph,
    /// heading, or list item.
    inline: String,
    /// Destination/title pairs for open links and images.
    links: Vec<(String, String)>,
    heading: Option<u8>,
    quote_depth: usize,
    quote: String,
    code: Option<(Option<SmolStr>, String)>,
    lists: Vec<ListCtx>,
}

struct ListCtx {
    ordered: bool,
    items: Vec<String>,
}

impl ParseState {
    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.on_start(tag),
            Event::End(tag) => self.on_end(tag),
            Event::Text(text) => {
                if let Some((_, code)) = &mut self.code {
                    code.push_str(&text);
                } else {
                    self.inline.push_str(&text);
                }
            }
            Event::Code(code) => {
                self.inline.push('`');
                self.inline.push_str(&code);
                self.inline.push('`');
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.inline.push_str(&html);
            }
            Event::SoftBreak => self.inline.push('\n'),
            Event::HardBreak => self.inline.push_str("  \n"),
            Event::Rule => self.blocks.push(Block::Rule),
            Event::TaskListMarker(checked) => {
                self.inline.push_str(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn on_start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // Loose list items carry paragraphs; fold them into the
                // item text instead of opening a new block.
                if !self.lists.is_empty() && !self.inline.is_empty() {
                    self.inline.push(' ');
                }
            }
            Tag::Heading { level, .. } => self.heading = Some(level as u8),
            Tag::BlockQuote(_) => self.quote_depth += 1,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(SmolStr::new(&*lang)),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                // A nested list opening inside an item finalizes the item
                // text gathered so far.
                if !self.inline.trim().is_empty() {
                    if let Some(list) = self.lists.last_mut() {
                        let text = take_trimmed(&mut self.inline);
                        list.items.push(text);
                    }
                }
                self.lists.push(ListCtx {
                    ordered: start.is_some(),
                    items: Vec::new(),
                });
            }
            Tag::Item => {}
            Tag::Emphasis => self.inline.push('*'),
            Tag::Strong => self.inline.push_str("**"),
            Tag::Strikethrough => self.inline.push_str("~~"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.inline.push('[');
                self.links.push((dest_url.to_string(), title.to_string()));
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.inline.push_str("![");
                self.links.push((dest_url.to_string(), title.to_string()));
            }
            _ => {}
        }
    }

    fn on_end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.flush_paragraph();
                }
            }
            TagEnd::Heading(_) => {
                let level = self.heading.take().unwrap_or(1);
                let text = take_trimmed(&mut self.inline);
                if self.quote_depth > 0 {
                    // Headings inside quotes stay quoted text.
                    if !self.quote.is_empty() {
                        self.quote.push('\n');
                    }
                    for _ in 0..level {
                        self.quote.push('#');
                    }
                    self.quote.push(' ');
                    self.quote.push_str(&text);
                } else {
                    self.blocks.push(Block::Heading { level, text });
                }
            }
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    let text = std::mem::take(&mut self.quote);
                    let text = text.trim_end().to_string();
                    if !text.is_empty() {
                        self.blocks.push(Block::Quote { text });
                    }
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock { language, code });
                }
            }
            TagEnd::Item => {
                let text = take_trimmed(&mut self.inline);
                if text.is_empty() {
                    return;
                }
                if let Some(list) = self.lists.last_mut() {
                    list.items.push(text);
                } else {
                    self.blocks.push(Block::Paragraph { text });
                }
            }
            TagEnd::List(_) => {
                if let Some(done) = self.lists.pop() {
                    if let Some(parent) = self.lists.last_mut() {
                        parent.items.extend(done.items);
                    } else if !done.items.is_empty() {
                        self.blocks.push(Block::List {
                            ordered: done.ordered,
                            items: done.items,
                        });
                    }
                }
            }
            TagEnd::Emphasis => self.inline.push('*'),
            TagEnd::Strong => self.inline.push_str("**"),
            TagEnd::Strikethrough => self.inline.push_str("~~"),
            TagEnd::Link | TagEnd::Image => self.close_link(),
            TagEnd::HtmlBlock => self.flush_paragraph(),
            _ => {}
        }
    }

    fn flush_paragraph(&mut self) {
        let text = take_trimmed(&mut self.inline);
        if text.is_empty() {
            return;
        }
        if self.quote_depth > 0 {
            if !self.quote.is_empty() {
                self.quote.push('\n');
            }
            self.quote.push_str(&text);
        } else {
            self.blocks.push(Block::Paragraph { text });
        }
    }

    fn close_link(&mut self) {
        if let Some((url, title)) = self.links.pop() {
            self.inline.push_str("](");
            self.inline.push_str(&url);
            if !title.is_empty() {
                self.inline.push_str(" \"");
                self.inline.push_str(&title);
                self.inline.push('"');
            }
            self.inline.push(')');
        }
    }

    fn finish(mut self) -> Vec<Block> {
        if !self.inline.trim().is_empty() {
            self.flush_paragraph();
        }
        self.blocks
    }
}

fn take_trimmed(inline: &mut String) -> String {
    std::mem::take(inline).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_document() {
        let blocks = parse_markdown("# Title\n\nSome text.\n");
        assert_eq!(
            blocks,
            vec![Block::heading(1, "Title"), Block::paragraph("Some text.")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_markdown("").is_empty());
    }

    #[test]
    fn test_code_block_with_language() {
        let blocks = parse_markdown("```rust\nfn main() {}\n```\n");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: Some("rust".into()),
                code: "fn main() {}\n".into(),
            }]
        );
    }

    #[test]
    fn test_unclosed_fence_is_best_effort() {
        // An unterminated fence swallows the rest of the input; that is
        // still a valid tree, not an error.
        let blocks = parse_markdown("```rust\nfn main()");
        assert!(matches!(blocks.as_slice(), [Block::CodeBlock { .. }]));
    }

    #[test]
    fn test_inline_markup_survives_as_source() {
        let blocks = parse_markdown("some **bold** and *em* and `code`");
        assert_eq!(
            blocks,
            vec![Block::paragraph("some **bold** and *em* and `code`")]
        );
    }

    #[test]
    fn test_link_with_title() {
        let blocks = parse_markdown("[a](https://b.example \"t\")");
        assert_eq!(
            blocks,
            vec![Block::paragraph("[a](https://b.example \"t\")")]
        );
    }

    #[test]
    fn test_nested_list_is_flattened() {
        let blocks = parse_markdown("- a\n  - b\n- c\n");
        assert_eq!(
            blocks,
            vec![Block::List {
                ordered: false,
                items: vec!["a".into(), "b".into(), "c".into()],
            }]
        );
    }

    #[test]
    fn test_ordered_list() {
        let blocks = parse_markdown("1. one\n2. two\n");
        assert_eq!(
            blocks,
            vec![Block::List {
                ordered: true,
                items: vec!["one".into(), "two".into()],
            }]
        );
    }

    #[test]
    fn test_task_list_markers() {
        let blocks = parse_markdown("- [x] done\n- [ ] open\n");
        assert_eq!(
            blocks,
            vec![Block::List {
                ordered: false,
                items: vec!["[x] done".into(), "[ ] open".into()],
            }]
        );
    }

    #[test]
    fn test_quote_joins_paragraphs() {
        let blocks = parse_markdown("> a\n> b\n");
        assert_eq!(blocks, vec![Block::Quote { text: "a\nb".into() }]);
    }

    #[test]
    fn test_rule() {
        let blocks = parse_markdown("one\n\n---\n\ntwo\n");
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("one"),
                Block::Rule,
                Block::paragraph("two")
            ]
        );
    }

    #[test]
    fn test_setext_heading_normalizes() {
        let blocks = parse_markdown("Title\n=====\n");
        assert_eq!(blocks, vec![Block::heading(1, "Title")]);
    }
}
