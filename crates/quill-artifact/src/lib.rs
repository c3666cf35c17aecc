//! Versioned artifact data model.
//!
//! An artifact is one document: an ordered collection of content versions
//! plus a pointer to the active one. This crate provides:
//! - `Artifact` / `ArtifactContent`: the versioned content model
//! - `ArtifactStore`: the session-owned holder mediating every write
//! - `ArtifactPersistence`: the externally-consumed save boundary

mod artifact;
mod content;
mod error;
mod persistence;
mod store;

pub use artifact::Artifact;
pub use content::ArtifactContent;
pub use error::ArtifactError;
pub use persistence::{ArtifactPersistence, MemoryPersistence, PersistenceError};
pub use store::ArtifactStore;
