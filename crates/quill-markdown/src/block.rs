//! Block-level document model.
//!
//! The structured surface edits a flat sequence of blocks. Inline runs stay
//! as markdown source text: block boundaries are what the editing surface
//! cares about, and conversion to and from markdown is lossy by contract.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single block of the structured document representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    /// Plain paragraph. `text` is inline markdown source.
    Paragraph { text: String },
    /// ATX heading, level 1-6.
    Heading { level: u8, text: String },
    /// Fenced code block.
    CodeBlock {
        language: Option<SmolStr>,
        code: String,
    },
    /// Block quote. Inner paragraphs are joined with newlines.
    Quote { text: String },
    /// Flat list. Nested lists are flattened into their parent.
    List { ordered: bool, items: Vec<String> },
    /// Thematic break.
    Rule,
}

impl Block {
    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }

    /// Create a heading block. The level is clamped to 1..=6.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    /// Textual content of the block, without block-level syntax.
    ///
    /// Inline markdown markers are retained.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { text } | Self::Heading { text, .. } | Self::Quote { text } => {
                text.clone()
            }
            Self::CodeBlock { code, .. } => code.clone(),
            Self::List { items, .. } => items.join("\n"),
            Self::Rule => String::new(),
        }
    }

    /// Check if the block carries no text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Paragraph { text } | Self::Heading { text, .. } | Self::Quote { text } => {
                text.is_empty()
            }
            Self::CodeBlock { code, .. } => code.is_empty(),
            Self::List { items, .. } => items.is_empty(),
            Self::Rule => false,
        }
    }
}
