//! Error types for artifact operations.

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading or editing an artifact.
#[derive(Error, Debug, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArtifactError {
    /// No artifact exists in the session yet.
    #[error("no artifact loaded")]
    Empty,

    /// The current index points at no stored content. Indicates an
    /// invariant breach elsewhere; surfaced, not retried.
    #[error("no content with index {index}")]
    NotFound { index: u32 },

    /// An edit would change the content variant at an index.
    #[error("content {index} is \"{actual}\", not \"{expected}\"")]
    TypeMismatch {
        index: u32,
        expected: &'static str,
        actual: &'static str,
    },
}
