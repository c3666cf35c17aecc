//! Surface configuration.
//!
//! Appearance is explicit state handed to the surface at construction and
//! updated through [`crate::BlockEditor::set_theme`]. Changes propagate
//! through a registered callback, never a process-wide broadcast, so the
//! surface's behavior is independent of ambient global state.

/// Color theme for the editing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Configuration passed to a surface at construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceConfig {
    pub theme: Theme,
}
