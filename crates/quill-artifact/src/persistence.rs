//! Persistence boundary.
//!
//! Saving is consumed from outside the core. The core only guarantees the
//! in-memory artifact is consistent at quiescence; it does not define save
//! timing or retry policy.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::artifact::Artifact;

/// Errors raised by persistence backends.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum PersistenceError {
    /// Failed to encode the artifact.
    #[error("failed to encode artifact: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend rejected or lost the write.
    #[error("failed to store artifact: {0}")]
    Store(String),
}

/// Capability for saving the full artifact.
#[async_trait(?Send)]
pub trait ArtifactPersistence {
    /// Persist a snapshot of the artifact.
    async fn save(&mut self, artifact: &Artifact) -> Result<(), PersistenceError>;
}

/// In-memory persistence, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    snapshots: Vec<String>,
}

impl MemoryPersistence {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved snapshots, oldest first.
    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }
}

#[async_trait(?Send)]
impl ArtifactPersistence for MemoryPersistence {
    async fn save(&mut self, artifact: &Artifact) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(artifact)?;
        self.snapshots.push(json);
        Ok(())
    }
}
