//! The conversion capability consumed by the synchronization engine.

use async_trait::async_trait;

use crate::block::Block;
use crate::error::ConversionError;
use crate::parser::parse_markdown;
use crate::writer::blocks_to_markdown;

/// Strip the escaped-newline artifacts that streamed generation output
/// carries before text reaches the parser.
pub fn clean_text(text: &str) -> String {
    text.replace("\\\n", "\n")
}

/// Converts between the structured block tree and flat markdown.
///
/// Both directions are lossy and may suspend. Implementations must tolerate
/// malformed markdown by producing a best-effort tree rather than failing;
/// markdown is user-authored free text.
#[async_trait(?Send)]
pub trait ConversionPort {
    /// Serialize a block tree to markdown.
    async fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError>;

    /// Parse markdown into a block tree, best effort.
    async fn parse(&self, markdown: &str) -> Result<Vec<Block>, ConversionError>;
}

/// Default conversion port backed by pulldown-cmark.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl ConversionPort for MarkdownConverter {
    async fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
        Ok(blocks_to_markdown(blocks))
    }

    async fn parse(&self, markdown: &str) -> Result<Vec<Block>, ConversionError> {
        Ok(parse_markdown(&clean_text(markdown)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("a\\\nb"), "a\nb");
        assert_eq!(clean_text("plain"), "plain");
    }

    #[tokio::test]
    async fn test_parse_tolerates_malformed_input() {
        let port = MarkdownConverter::new();
        let blocks = port.parse("*** [unclosed ``` half").await.unwrap();
        assert!(!blocks.is_empty());
    }

    #[tokio::test]
    async fn test_second_cycle_is_fixed_point() {
        let port = MarkdownConverter::new();
        let inputs = [
            "# Title\n\nbody text with **bold**",
            "* one\n* two\n\n1. a\n2. b",
            "> quoted\n> lines\n\n```rust\nfn main() {}\n```",
            "Title\n=====\n\npara  \nhard break",
        ];
        for input in inputs {
            let once = port.serialize(&port.parse(input).await.unwrap()).await.unwrap();
            let twice = port.serialize(&port.parse(&once).await.unwrap()).await.unwrap();
            assert_eq!(once, twice, "cycle not stable for {input:?}");
        }
    }
}
