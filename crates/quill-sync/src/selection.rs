//! Selection capture.

/// Markdown snapshot of the current surface selection, used to scope
/// follow-up generation to what the user highlighted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedBlocks {
    /// Markdown of the whole document.
    pub full_markdown: String,
    /// Markdown of just the selected blocks.
    pub markdown_block: String,
    /// Plain text of the selection.
    pub selected_text: String,
}
