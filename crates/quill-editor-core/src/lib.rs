//! Framework-agnostic editor surfaces.
//!
//! This crate provides:
//! - `TextBuffer` trait and `EditorRope`, the ropey-backed buffer behind
//!   the raw markdown view
//! - `BlockSurface` trait and `BlockEditor`, the structured block surface
//! - `Selection` and `EditInfo` tracking types
//! - `SurfaceConfig`, explicit appearance state handed to the surface at
//!   construction

pub mod config;
pub mod surface;
pub mod text;
pub mod types;

pub use config::{SurfaceConfig, Theme};
pub use surface::{BlockEditor, BlockSurface};
pub use text::{EditorRope, TextBuffer};
pub use types::{EditInfo, Selection};
