//! Error types for the synchronization engine.

use miette::Diagnostic;
use quill_artifact::ArtifactError;
use quill_markdown::ConversionError;
use thiserror::Error;

/// Errors surfaced by the synchronization engine.
///
/// Conversion failures on the resync path are recovered internally - the
/// raw text is never lost and the surface keeps its previous content - so
/// they only surface from operations whose result IS the conversion.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SyncError {
    /// The artifact rejected a read or write.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// A conversion port call failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
