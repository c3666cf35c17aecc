//! Structured editing surface.
//!
//! Defines the `BlockSurface` trait for abstracting the rich-editing
//! surface, allowing different backends (plain in-memory state, reactive
//! bindings) while sharing the synchronization logic built on top.
//!
//! Every mutation - user-driven or programmatic - advances the change
//! counter and thereby constitutes a change notification. Whoever replaces
//! the document wholesale gets notified of its own replacement like any
//! other edit; distinguishing the two is the caller's job.

use quill_markdown::Block;
use tracing::debug;

use crate::config::{SurfaceConfig, Theme};
use crate::types::Selection;

/// Interface of the structured editing surface.
pub trait BlockSurface {
    /// Snapshot of the current block tree.
    fn document(&self) -> Vec<Block>;

    /// Number of blocks in the document.
    fn block_count(&self) -> usize;

    /// Replace the whole document with `blocks`.
    fn replace_blocks(&mut self, blocks: Vec<Block>);

    /// Monotone counter advanced by every content mutation.
    fn change_seq(&self) -> u64;

    /// Whether user edits are currently accepted.
    fn is_editable(&self) -> bool;

    /// Enable or disable user edits.
    fn set_editable(&mut self, editable: bool);

    /// Current selection, in block indices.
    fn selection(&self) -> Option<Selection>;

    /// Set the selection.
    fn set_selection(&mut self, selection: Option<Selection>);

    /// Replace the block at `index`. Returns false if the surface is not
    /// editable or the index is out of range.
    fn set_block(&mut self, index: usize, block: Block) -> bool;

    /// Insert a block at `index`. Returns false if not editable or out of
    /// range.
    fn insert_block(&mut self, index: usize, block: Block) -> bool;

    /// Remove the block at `index`. Returns false if not editable or out of
    /// range.
    fn remove_block(&mut self, index: usize) -> bool;

    /// Append a block at the end.
    fn push_block(&mut self, block: Block) -> bool {
        self.insert_block(self.block_count(), block)
    }
}

/// Plain in-memory implementation of [`BlockSurface`].
///
/// Stores the block tree and selection as plain fields. Use this for
/// non-reactive contexts or as a base for testing.
pub struct BlockEditor {
    blocks: Vec<Block>,
    selection: Option<Selection>,
    change_seq: u64,
    editable: bool,
    config: SurfaceConfig,
    theme_listener: Option<Box<dyn FnMut(Theme)>>,
}

impl BlockEditor {
    /// Create an empty editor with the given configuration.
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            blocks: Vec::new(),
            selection: None,
            change_seq: 0,
            editable: true,
            config,
            theme_listener: None,
        }
    }

    /// Create an editor pre-populated with blocks.
    pub fn with_blocks(config: SurfaceConfig, blocks: Vec<Block>) -> Self {
        let mut editor = Self::new(config);
        editor.blocks = blocks;
        editor
    }

    /// Current configuration.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Register the callback invoked when the theme changes.
    pub fn on_theme_change(&mut self, listener: impl FnMut(Theme) + 'static) {
        self.theme_listener = Some(Box::new(listener));
    }

    /// Update the theme, notifying the registered listener.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.config.theme == theme {
            return;
        }
        self.config.theme = theme;
        if let Some(listener) = self.theme_listener.as_mut() {
            listener(theme);
        }
    }

    fn bump(&mut self) {
        self.change_seq += 1;
    }
}

impl Default for BlockEditor {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl BlockSurface for BlockEditor {
    fn document(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn replace_blocks(&mut self, blocks: Vec<Block>) {
        debug!(blocks = blocks.len(), "replacing block document");
        self.blocks = blocks;
        // Block indices are meaningless across a wholesale replacement.
        self.selection = None;
        self.bump();
    }

    fn change_seq(&self) -> u64 {
        self.change_seq
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    fn set_block(&mut self, index: usize, block: Block) -> bool {
        if !self.editable || index >= self.blocks.len() {
            return false;
        }
        self.blocks[index] = block;
        self.bump();
        true
    }

    fn insert_block(&mut self, index: usize, block: Block) -> bool {
        if !self.editable || index > self.blocks.len() {
            return false;
        }
        self.blocks.insert(index, block);
        self.bump();
        true
    }

    fn remove_block(&mut self, index: usize) -> bool {
        if !self.editable || index >= self.blocks.len() {
            return false;
        }
        self.blocks.remove(index);
        self.bump();
        true
    }
}
