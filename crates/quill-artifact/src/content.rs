//! Artifact content versions.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One version of an artifact's content.
///
/// Tagged union: prose versions carry the full markdown of the document,
/// code versions carry source text and a language. The `index` is unique
/// within an artifact and immutable once assigned, and the tag of a given
/// index never changes across edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArtifactContent {
    #[serde(rename = "text", rename_all = "camelCase")]
    Markdown {
        index: u32,
        title: SmolStr,
        full_markdown: String,
    },
    #[serde(rename = "code", rename_all = "camelCase")]
    Code {
        index: u32,
        title: SmolStr,
        code: String,
        language: SmolStr,
    },
}

impl ArtifactContent {
    /// Create a markdown version.
    pub fn markdown(index: u32, title: impl Into<SmolStr>, full_markdown: impl Into<String>) -> Self {
        Self::Markdown {
            index,
            title: title.into(),
            full_markdown: full_markdown.into(),
        }
    }

    /// Create a code version.
    pub fn code(
        index: u32,
        title: impl Into<SmolStr>,
        code: impl Into<String>,
        language: impl Into<SmolStr>,
    ) -> Self {
        Self::Code {
            index,
            title: title.into(),
            code: code.into(),
            language: language.into(),
        }
    }

    /// Version index.
    pub fn index(&self) -> u32 {
        match self {
            Self::Markdown { index, .. } | Self::Code { index, .. } => *index,
        }
    }

    /// Version title.
    pub fn title(&self) -> &str {
        match self {
            Self::Markdown { title, .. } | Self::Code { title, .. } => title,
        }
    }

    /// Set the version title.
    pub fn set_title(&mut self, new_title: impl Into<SmolStr>) {
        match self {
            Self::Markdown { title, .. } | Self::Code { title, .. } => *title = new_title.into(),
        }
    }

    /// Body text of this version: markdown for prose, source for code.
    pub fn text(&self) -> &str {
        match self {
            Self::Markdown { full_markdown, .. } => full_markdown,
            Self::Code { code, .. } => code,
        }
    }

    /// Check if this is a prose (markdown) version.
    pub fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown { .. })
    }

    /// The serialized tag of the variant.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Markdown { .. } => "text",
            Self::Code { .. } => "code",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let content = ArtifactContent::markdown(1, "Untitled", "# Hi");
        assert_eq!(content.index(), 1);
        assert_eq!(content.title(), "Untitled");
        assert_eq!(content.text(), "# Hi");
        assert!(content.is_markdown());
        assert_eq!(content.type_tag(), "text");

        let content = ArtifactContent::code(2, "main", "fn main() {}", "rust");
        assert!(!content.is_markdown());
        assert_eq!(content.text(), "fn main() {}");
        assert_eq!(content.type_tag(), "code");
    }

    #[test]
    fn test_serde_tags_and_field_names() {
        let content = ArtifactContent::markdown(1, "Untitled", "# Hi");
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["fullMarkdown"], "# Hi");
        assert_eq!(json["index"], 1);

        let content = ArtifactContent::code(2, "main", "fn main() {}", "rust");
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "code");
        assert_eq!(json["language"], "rust");

        let back: ArtifactContent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ArtifactContent::code(2, "main", "fn main() {}", "rust"));
    }
}
