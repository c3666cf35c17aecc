//! The versioned artifact.

use serde::{Deserialize, Serialize};

use crate::content::ArtifactContent;
use crate::error::ArtifactError;

/// A versioned document: an ordered collection of content versions plus the
/// index of the active one.
///
/// `contents` is append-only except for in-place field edits at the current
/// index. `current_index` always equals some element's index while
/// `contents` is non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contents: Vec<ArtifactContent>,
    pub current_index: u32,
}

impl Artifact {
    /// Create an artifact from its first content version.
    pub fn initial(content: ArtifactContent) -> Self {
        let current_index = content.index();
        Self {
            contents: vec![content],
            current_index,
        }
    }

    /// Find the content at `index`.
    pub fn content_at(&self, index: u32) -> Option<&ArtifactContent> {
        self.contents.iter().find(|c| c.index() == index)
    }

    pub(crate) fn content_at_mut(&mut self, index: u32) -> Option<&mut ArtifactContent> {
        self.contents.iter_mut().find(|c| c.index() == index)
    }

    /// The active content version.
    ///
    /// A missing match for `current_index` is an invariant breach and is
    /// reported, never silently ignored.
    pub fn current(&self) -> Result<&ArtifactContent, ArtifactError> {
        self.content_at(self.current_index)
            .ok_or(ArtifactError::NotFound {
                index: self.current_index,
            })
    }

    /// The next free version index.
    pub fn next_index(&self) -> u32 {
        self.contents
            .iter()
            .map(ArtifactContent::index)
            .max()
            .unwrap_or(0)
            + 1
    }
}
