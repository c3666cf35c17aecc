//! Synchronization engine for dual-representation documents.
//!
//! A document exists in two representations at once: a structured block
//! tree edited by the rich surface, and a flat markdown string edited in
//! the raw view and replaced wholesale by streamed generation output. This
//! crate provides:
//! - `SyncEngine`: mediates between the surfaces and the artifact store,
//!   deciding per incoming change whether to accept, suppress, or convert
//! - `SyncPhase`: the engine's observable phase
//! - `SelectedBlocks`: markdown capture of the current surface selection

mod engine;
mod error;
mod phase;
mod selection;

pub use engine::SyncEngine;
pub use error::SyncError;
pub use phase::SyncPhase;
pub use selection::SelectedBlocks;
