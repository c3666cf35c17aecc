//! The synchronization engine.
//!
//! Keeps the structured block surface and the flat markdown text of one
//! artifact consistent under three update sources: edits on the structured
//! surface, edits in the raw view, and wholesale replacement streamed in by
//! an external producer. At every quiescent moment the visible surface
//! matches the `full_markdown` of the content at the artifact's current
//! index.
//!
//! Change notifications raised by the surface while the engine itself is
//! writing to it are echoes, not user intent. A single guard flag covers
//! that window and is cleared on every exit path, including conversion
//! failure, so a fault can never permanently silence the surface.

use quill_artifact::{Artifact, ArtifactError, ArtifactStore};
use quill_editor_core::{BlockSurface, EditInfo, EditorRope, TextBuffer};
use quill_markdown::{Block, ConversionPort, clean_text};
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::phase::SyncPhase;
use crate::selection::SelectedBlocks;

/// Mediates between the structured surface, the raw view, and the artifact
/// store.
///
/// All operations run on a single thread as reactions to discrete events.
/// Conversions are the only suspending operations; entry into them is gated
/// behind one guard flag, and a finished conversion re-checks that no newer
/// authoritative write landed before it touches the surface.
pub struct SyncEngine<S: BlockSurface> {
    store: ArtifactStore,
    surface: S,
    port: Box<dyn ConversionPort>,
    /// Cached markdown shown by the raw view. Derived, not authoritative.
    raw: EditorRope,
    raw_view: bool,
    /// True only while the engine is programmatically replacing the
    /// surface's content.
    applying_update: bool,
    /// Producer-requested resync of the surface from authoritative text.
    update_pending: bool,
    streaming: bool,
}

impl<S: BlockSurface> SyncEngine<S> {
    /// Create an engine over a surface and a conversion port.
    pub fn new(surface: S, port: Box<dyn ConversionPort>) -> Self {
        Self {
            store: ArtifactStore::new(),
            surface,
            port,
            raw: EditorRope::new(),
            raw_view: false,
            applying_update: false,
            update_pending: false,
            streaming: false,
        }
    }

    /// The artifact store.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The structured surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface. Callers that edit through this must
    /// follow up with [`Self::on_editor_change`], as a real surface would
    /// by firing its change notification.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Current raw-view text.
    pub fn raw_text(&self) -> String {
        self.raw.to_string()
    }

    /// Info about the last raw-view edit, if any.
    pub fn last_raw_edit(&self) -> Option<&EditInfo> {
        self.raw.last_edit()
    }

    /// Whether the raw view is visible.
    pub fn is_raw_view(&self) -> bool {
        self.raw_view
    }

    /// Whether a producer-requested resync is outstanding.
    pub fn is_update_pending(&self) -> bool {
        self.update_pending
    }

    /// The engine's current phase.
    pub fn phase(&self) -> SyncPhase {
        if self.applying_update {
            SyncPhase::ApplyingConversion
        } else if self.streaming {
            SyncPhase::StreamingExternalUpdate
        } else {
            SyncPhase::Idle
        }
    }

    /// Install the artifact for a new document session and render it.
    pub async fn load_artifact(&mut self, artifact: Artifact) -> Result<(), SyncError> {
        self.store.load(artifact);
        self.raw = EditorRope::new();
        self.raw_view = false;
        self.request_resync();
        self.resync().await
    }

    /// Discard the session's document state.
    pub fn clear(&mut self) {
        self.store.clear();
        self.surface.replace_blocks(Vec::new());
        self.surface.set_editable(true);
        self.raw = EditorRope::new();
        self.raw_view = false;
        self.update_pending = false;
        self.streaming = false;
    }

    // === Structured surface (rule: accept unless suppressed) ===

    /// Handle a change notification from the structured surface.
    ///
    /// While streamed content or a conversion is being applied, the
    /// notification is an echo of the engine's own write and is ignored.
    /// Otherwise the surface is serialized and written into the current
    /// content in place - same version, no new content created.
    pub async fn on_editor_change(&mut self) -> Result<(), SyncError> {
        if self.streaming || self.applying_update || self.update_pending {
            debug!(phase = ?self.phase(), "surface notification suppressed");
            return Ok(());
        }
        if self.raw_view {
            // The raw view is authoritative while visible; a hidden
            // surface cannot overwrite it.
            debug!("surface notification ignored while raw view is active");
            return Ok(());
        }
        let blocks = self.surface.document();
        let markdown = match self.port.serialize(&blocks).await {
            Ok(markdown) => markdown,
            Err(err) => {
                warn!(%err, "serialize failed; stored content left unchanged");
                return Ok(());
            }
        };
        self.store.ensure_markdown(&markdown)?;
        Ok(())
    }

    /// Replace the block at `index` and propagate the change. Returns false
    /// if the surface rejected the edit.
    pub async fn edit_block(&mut self, index: usize, block: Block) -> Result<bool, SyncError> {
        if !self.surface.set_block(index, block) {
            return Ok(false);
        }
        self.on_editor_change().await?;
        Ok(true)
    }

    /// Insert a block at `index` and propagate the change.
    pub async fn insert_block(&mut self, index: usize, block: Block) -> Result<bool, SyncError> {
        if !self.surface.insert_block(index, block) {
            return Ok(false);
        }
        self.on_editor_change().await?;
        Ok(true)
    }

    /// Append a block and propagate the change.
    pub async fn push_block(&mut self, block: Block) -> Result<bool, SyncError> {
        if !self.surface.push_block(block) {
            return Ok(false);
        }
        self.on_editor_change().await?;
        Ok(true)
    }

    /// Remove the block at `index` and propagate the change.
    pub async fn remove_block(&mut self, index: usize) -> Result<bool, SyncError> {
        if !self.surface.remove_block(index) {
            return Ok(false);
        }
        self.on_editor_change().await?;
        Ok(true)
    }

    // === Raw view (rule: write through, defer conversion) ===

    /// Handle a wholesale raw-text edit.
    ///
    /// The text is written into both the raw buffer and the current
    /// content. It is NOT re-parsed into the structured surface here; that
    /// conversion is deferred until the raw view is exited, so typing never
    /// pays for a parse.
    pub fn on_raw_edit(&mut self, text: &str) -> Result<(), SyncError> {
        self.raw = EditorRope::from_str(text);
        self.store.ensure_markdown(text)?;
        Ok(())
    }

    /// Insert into the raw text at `char_offset`.
    pub fn raw_insert(&mut self, char_offset: usize, text: &str) -> Result<(), SyncError> {
        self.raw.insert(char_offset, text);
        let text = self.raw.to_string();
        self.store.ensure_markdown(&text)?;
        Ok(())
    }

    /// Delete a char range from the raw text.
    pub fn raw_delete(&mut self, char_range: std::ops::Range<usize>) -> Result<(), SyncError> {
        self.raw.delete(char_range);
        let text = self.raw.to_string();
        self.store.ensure_markdown(&text)?;
        Ok(())
    }

    // === View toggle ===

    /// Flip between the raw and structured views.
    ///
    /// Entering the raw view serializes the surface into the raw buffer
    /// (read-only with respect to the artifact). Exiting parses the raw
    /// buffer and replaces the surface wholesale. Both happen within this
    /// single call, so no observer can see the flag flipped while the
    /// opposite surface still holds stale content.
    pub async fn toggle_raw_view(&mut self) {
        self.set_raw_view(!self.raw_view).await;
    }

    /// Show the raw view (`true`) or the structured view (`false`).
    pub async fn set_raw_view(&mut self, raw: bool) {
        if raw == self.raw_view {
            return;
        }
        if raw {
            self.enter_raw_view().await;
        } else {
            self.exit_raw_view().await;
        }
    }

    async fn enter_raw_view(&mut self) {
        match self.port.serialize(&self.surface.document()).await {
            Ok(markdown) => self.raw = EditorRope::from_str(&markdown),
            Err(err) => {
                warn!(%err, "serialize failed; raw view keeps its cached text");
            }
        }
        self.raw_view = true;
    }

    async fn exit_raw_view(&mut self) {
        self.raw_view = false;
        let text = self.raw.to_string();
        if text.is_empty() {
            // Nothing to apply.
            return;
        }
        self.apply_markdown_to_surface(&text).await;
    }

    // === External stream ===

    /// Accept a streamed delivery of the full document markdown.
    ///
    /// Each delivery replaces the authoritative content; the structured
    /// surface is NOT re-parsed per delivery. User editing is disabled for
    /// the stream's duration.
    pub fn apply_stream_update(&mut self, markdown: &str) -> Result<(), SyncError> {
        if !self.streaming {
            debug!("external stream opened");
            self.streaming = true;
            self.surface.set_editable(false);
        }
        self.store.ensure_markdown(markdown)?;
        Ok(())
    }

    /// Note that the stream finished and render its final content.
    ///
    /// The surface is replaced exactly once, here, rather than on every
    /// partial delivery.
    pub async fn complete_stream(&mut self) -> Result<(), SyncError> {
        if !self.streaming {
            return Ok(());
        }
        self.streaming = false;
        self.surface.set_editable(true);
        debug!("external stream complete; resyncing structured surface");
        self.resync().await
    }

    /// Ask for the surface to be resynchronized from authoritative text on
    /// the next [`Self::resync`]. Surface notifications are suppressed
    /// until that happens.
    pub fn request_resync(&mut self) {
        self.update_pending = true;
    }

    /// Resynchronize the structured surface from the authoritative content.
    pub async fn resync(&mut self) -> Result<(), SyncError> {
        let result = self.resync_inner().await;
        // Cleared on every path so a failed resync cannot wedge the engine.
        self.update_pending = false;
        result
    }

    async fn resync_inner(&mut self) -> Result<(), SyncError> {
        let markdown = match self.store.current_content() {
            Ok(content) if content.is_markdown() => content.text().to_owned(),
            Ok(content) => {
                debug!(index = content.index(), "current content is code; nothing to render");
                return Ok(());
            }
            Err(ArtifactError::Empty) => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        if self.raw_view {
            self.raw = EditorRope::from_str(&markdown);
        }
        self.apply_markdown_to_surface(&markdown).await;
        Ok(())
    }

    // === Conversion core ===

    /// Parse `markdown` and replace the structured surface with the result.
    ///
    /// The single entry point for conversions that write to the surface.
    /// Entry is gated on the guard flag: a request arriving while another
    /// conversion is in flight is dropped, its effect subsumed by the
    /// in-flight result. A finished parse is discarded if the stored
    /// content was rewritten while it was suspended.
    ///
    /// Returns true if the surface was replaced.
    async fn apply_markdown_to_surface(&mut self, markdown: &str) -> bool {
        if self.applying_update {
            debug!("conversion already in flight; request dropped");
            return false;
        }
        self.applying_update = true;
        let started_at = self.store.revision();
        let applied = match self.port.parse(markdown).await {
            Ok(blocks) => self.accept_conversion(started_at, blocks),
            Err(err) => {
                warn!(%err, "parse failed; structured surface left unchanged");
                false
            }
        };
        if applied {
            // The replacement raises an ordinary change notification; with
            // the guard still set it is treated as an echo.
            let _ = self.on_editor_change().await;
        }
        self.applying_update = false;
        applied
    }

    /// Install a finished conversion unless a newer authoritative write
    /// landed while it was computing.
    fn accept_conversion(&mut self, started_at: u64, blocks: Vec<Block>) -> bool {
        if self.store.revision() != started_at {
            warn!(
                started_at,
                revision = self.store.revision(),
                "conversion outpaced by a newer write; result discarded"
            );
            return false;
        }
        self.surface.replace_blocks(blocks);
        true
    }

    // === Selection capture ===

    /// Capture the current surface selection as markdown.
    ///
    /// Returns None when nothing is selected.
    pub async fn selection_snapshot(&mut self) -> Result<Option<SelectedBlocks>, SyncError> {
        let Some(selection) = self.surface.selection() else {
            return Ok(None);
        };
        if selection.is_collapsed() {
            return Ok(None);
        }
        let document = self.surface.document();
        let range = selection.to_range();
        let end = range.end.min(document.len());
        let start = range.start.min(end);
        let selected = &document[start..end];
        if selected.is_empty() {
            return Ok(None);
        }

        let full_markdown = self.port.serialize(&document).await?;
        let markdown_block = self.port.serialize(selected).await?;
        let selected_text = selected
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(SelectedBlocks {
            full_markdown: clean_text(&full_markdown),
            markdown_block: clean_text(&markdown_block),
            selected_text: clean_text(&selected_text),
        }))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use quill_editor_core::{BlockEditor, Selection};
    use quill_markdown::{ConversionError, MarkdownConverter, blocks_to_markdown};

    use super::*;

    fn engine() -> SyncEngine<BlockEditor> {
        SyncEngine::new(BlockEditor::default(), Box::new(MarkdownConverter::new()))
    }

    async fn engine_with(markdown: &str) -> SyncEngine<BlockEditor> {
        let mut engine = engine();
        engine
            .load_artifact(Artifact::initial(
                quill_artifact::ArtifactContent::markdown(1, "Untitled", markdown),
            ))
            .await
            .unwrap();
        engine
    }

    /// Port whose parse always fails; serialize still works.
    struct BrokenParser;

    #[async_trait(?Send)]
    impl ConversionPort for BrokenParser {
        async fn serialize(&self, blocks: &[Block]) -> Result<String, ConversionError> {
            Ok(blocks_to_markdown(blocks))
        }

        async fn parse(&self, _markdown: &str) -> Result<Vec<Block>, ConversionError> {
            Err(ConversionError::Parse("broken".into()))
        }
    }

    #[tokio::test]
    async fn test_load_renders_surface() {
        let engine = engine_with("# Hi").await;
        assert_eq!(engine.surface().document(), vec![Block::heading(1, "Hi")]);
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert!(!engine.is_update_pending());
    }

    #[tokio::test]
    async fn test_structured_edit_rewrites_same_version() {
        let mut engine = engine_with("# Hi").await;

        assert!(engine.edit_block(0, Block::heading(1, "Hello")).await.unwrap());

        let artifact = engine.store().artifact().unwrap();
        assert_eq!(artifact.current_index, 1);
        assert_eq!(artifact.contents.len(), 1);
        assert_eq!(engine.store().current_text().unwrap(), "# Hello");
    }

    #[tokio::test]
    async fn test_first_edit_creates_artifact() {
        let mut engine = engine();
        assert!(engine.push_block(Block::paragraph("hello")).await.unwrap());

        let content = engine.store().current_content().unwrap();
        assert_eq!(content.index(), 1);
        assert_eq!(content.title(), "Untitled");
        assert_eq!(content.text(), "hello");
    }

    #[tokio::test]
    async fn test_notifications_suppressed_while_streaming() {
        let mut engine = engine_with("original").await;
        engine.apply_stream_update("partial...").unwrap();

        // A storm of notifications during the stream leaves the stored
        // content untouched.
        for _ in 0..3 {
            engine.on_editor_change().await.unwrap();
        }
        assert_eq!(engine.store().current_text().unwrap(), "partial...");
        assert_eq!(engine.phase(), SyncPhase::StreamingExternalUpdate);
    }

    #[tokio::test]
    async fn test_notifications_suppressed_while_update_pending() {
        let mut engine = engine_with("stored").await;
        engine.surface_mut().replace_blocks(vec![Block::paragraph("edited")]);
        engine.request_resync();

        engine.on_editor_change().await.unwrap();
        assert_eq!(engine.store().current_text().unwrap(), "stored");

        engine.resync().await.unwrap();
        assert!(!engine.is_update_pending());
        assert_eq!(engine.surface().document(), vec![Block::paragraph("stored")]);
    }

    #[tokio::test]
    async fn test_guard_cleared_after_parse_failure() {
        let mut engine = SyncEngine::new(BlockEditor::default(), Box::new(BrokenParser));
        engine.store.load(Artifact::initial(
            quill_artifact::ArtifactContent::markdown(1, "Untitled", "text"),
        ));

        engine.set_raw_view(true).await;
        engine.on_raw_edit("# oops").unwrap();
        engine.set_raw_view(false).await; // parse fails here

        assert_eq!(engine.phase(), SyncPhase::Idle);
        // Raw text was never lost.
        assert_eq!(engine.store().current_text().unwrap(), "# oops");

        // A subsequent structured edit is accepted and propagated.
        assert!(engine.push_block(Block::paragraph("recovered")).await.unwrap());
        assert_eq!(engine.store().current_text().unwrap(), "recovered");
    }

    #[tokio::test]
    async fn test_stale_conversion_discarded() {
        let mut engine = engine_with("# Hi").await;
        let before = engine.surface().document();

        let started_at = engine.store.revision();
        // A newer authoritative write lands while the parse is in flight.
        engine.on_raw_edit("newer text").unwrap();

        let accepted = engine.accept_conversion(started_at, vec![Block::paragraph("stale")]);
        assert!(!accepted);
        assert_eq!(engine.surface().document(), before);
    }

    #[tokio::test]
    async fn test_second_conversion_request_dropped() {
        let mut engine = engine_with("# Hi").await;
        let seq = engine.surface().change_seq();

        engine.applying_update = true;
        let applied = engine.apply_markdown_to_surface("# Other").await;
        assert!(!applied);
        assert_eq!(engine.surface().change_seq(), seq);
        engine.applying_update = false;
    }

    #[tokio::test]
    async fn test_editor_change_rejected_for_code_version() {
        let mut engine = engine();
        engine.store.load(Artifact::initial(
            quill_artifact::ArtifactContent::code(1, "main", "fn main() {}", "rust"),
        ));

        engine.surface_mut().push_block(Block::paragraph("prose"));
        let err = engine.on_editor_change().await.unwrap_err();
        assert!(matches!(
            err,
            SyncError::Artifact(ArtifactError::TypeMismatch { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_raw_incremental_edits_write_through() {
        let mut engine = engine_with("# Hi").await;
        engine.set_raw_view(true).await;
        assert_eq!(engine.raw_text(), "# Hi");

        engine.raw_insert(4, "gher").unwrap();
        assert_eq!(engine.store().current_text().unwrap(), "# Higher");

        engine.raw_delete(2..5).unwrap();
        assert_eq!(engine.store().current_text().unwrap(), "# her");
        assert_eq!(engine.last_raw_edit().unwrap().deleted_len, 3);
    }

    #[tokio::test]
    async fn test_selection_snapshot() {
        let mut engine = engine_with("# Title\n\none\n\ntwo").await;
        engine
            .surface_mut()
            .set_selection(Some(Selection::new(1, 3)));

        let snapshot = engine.selection_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.full_markdown, "# Title\n\none\n\ntwo");
        assert_eq!(snapshot.markdown_block, "one\n\ntwo");
        assert_eq!(snapshot.selected_text, "one\ntwo");
    }

    #[tokio::test]
    async fn test_selection_snapshot_none_when_collapsed() {
        let mut engine = engine_with("text").await;
        assert!(engine.selection_snapshot().await.unwrap().is_none());

        engine
            .surface_mut()
            .set_selection(Some(Selection::collapsed(0)));
        assert!(engine.selection_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_discards_session() {
        let mut engine = engine_with("# Hi").await;
        engine.clear();
        assert!(engine.store().artifact().is_none());
        assert_eq!(engine.surface().block_count(), 0);
        assert_eq!(engine.raw_text(), "");
    }
}
