//! Block tree to markdown serialization.

use std::fmt::Write;

use crate::block::Block;

/// Serialize a block sequence to a markdown string.
///
/// Blocks are separated by blank lines, with no trailing newline. Feeding
/// the output of [`crate::parse_markdown`] back through this writer is
/// stable: a second cycle does not change the string further.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let parts: Vec<String> = blocks.iter().map(block_to_markdown).collect();
    parts.join("\n\n")
}

fn block_to_markdown(block: &Block) -> String {
    let mut md = String::new();

    match block {
        Block::Paragraph { text } => md.push_str(text),
        Block::Heading { level, text } => {
            for _ in 0..(*level).clamp(1, 6) {
                md.push('#');
            }
            md.push(' ');
            md.push_str(text);
        }
        Block::Quote { text } => {
            for (i, line) in text.lines().enumerate() {
                if i > 0 {
                    md.push('\n');
                }
                md.push_str("> ");
                md.push_str(line);
            }
        }
        Block::CodeBlock { language, code } => {
            md.push_str("```");
            if let Some(lang) = language {
                md.push_str(lang);
            }
            md.push('\n');
            md.push_str(code);
            if !code.is_empty() && !code.ends_with('\n') {
                md.push('\n');
            }
            md.push_str("```");
        }
        Block::List { ordered, items } => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    md.push('\n');
                }
                if *ordered {
                    let _ = write!(md, "{}. ", i + 1);
                } else {
                    md.push_str("- ");
                }
                md.push_str(item);
            }
        }
        Block::Rule => md.push_str("---"),
    }

    md
}
