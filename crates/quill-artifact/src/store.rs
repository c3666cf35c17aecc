//! Session-owned artifact store.

use smol_str::SmolStr;
use tracing::debug;

use crate::artifact::Artifact;
use crate::content::ArtifactContent;
use crate::error::ArtifactError;

/// Holds the session's artifact and mediates every write to it.
///
/// The store is mutated only from single-threaded event handlers. The
/// revision counter advances on every authoritative write to the current
/// content's body (not on title or language edits); conversions read it to
/// detect that a newer write landed while they were computing.
#[derive(Clone, Debug, Default)]
pub struct ArtifactStore {
    artifact: Option<Artifact>,
    revision: u64,
}

impl ArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install an artifact for a new document session.
    pub fn load(&mut self, artifact: Artifact) {
        debug!(
            versions = artifact.contents.len(),
            current = artifact.current_index,
            "artifact loaded"
        );
        self.artifact = Some(artifact);
        self.bump();
    }

    /// Discard the session's artifact.
    pub fn clear(&mut self) {
        self.artifact = None;
        self.bump();
    }

    /// The artifact, if one exists.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Current revision of the authoritative content body.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// The active content version.
    pub fn current_content(&self) -> Result<&ArtifactContent, ArtifactError> {
        match &self.artifact {
            None => Err(ArtifactError::Empty),
            Some(artifact) => artifact.current(),
        }
    }

    /// Body text of the active version.
    pub fn current_text(&self) -> Result<&str, ArtifactError> {
        self.current_content().map(ArtifactContent::text)
    }

    /// Write `markdown` into the current version in place. Same version: no
    /// new content is created and the index does not move.
    pub fn set_current_markdown(&mut self, markdown: &str) -> Result<(), ArtifactError> {
        let artifact = self.artifact.as_mut().ok_or(ArtifactError::Empty)?;
        let index = artifact.current_index;
        let content = artifact
            .content_at_mut(index)
            .ok_or(ArtifactError::NotFound { index })?;
        match content {
            ArtifactContent::Markdown { full_markdown, .. } => {
                *full_markdown = markdown.to_owned();
                self.bump();
                Ok(())
            }
            ArtifactContent::Code { .. } => Err(ArtifactError::TypeMismatch {
                index,
                expected: "text",
                actual: "code",
            }),
        }
    }

    /// Write `markdown` into the current version, creating the artifact
    /// with a single untitled version when none exists yet.
    pub fn ensure_markdown(&mut self, markdown: &str) -> Result<(), ArtifactError> {
        if self.artifact.is_none() {
            self.artifact = Some(Artifact::initial(ArtifactContent::markdown(
                1, "Untitled", markdown,
            )));
            self.bump();
            return Ok(());
        }
        self.set_current_markdown(markdown)
    }

    /// Write `code` into the current version in place.
    pub fn set_current_code(&mut self, new_code: &str) -> Result<(), ArtifactError> {
        let artifact = self.artifact.as_mut().ok_or(ArtifactError::Empty)?;
        let index = artifact.current_index;
        let content = artifact
            .content_at_mut(index)
            .ok_or(ArtifactError::NotFound { index })?;
        match content {
            ArtifactContent::Code { code, .. } => {
                *code = new_code.to_owned();
                self.bump();
                Ok(())
            }
            ArtifactContent::Markdown { .. } => Err(ArtifactError::TypeMismatch {
                index,
                expected: "code",
                actual: "text",
            }),
        }
    }

    /// Set the language of the current code version.
    pub fn set_current_language(&mut self, lang: impl Into<SmolStr>) -> Result<(), ArtifactError> {
        let artifact = self.artifact.as_mut().ok_or(ArtifactError::Empty)?;
        let index = artifact.current_index;
        let content = artifact
            .content_at_mut(index)
            .ok_or(ArtifactError::NotFound { index })?;
        match content {
            ArtifactContent::Code { language, .. } => {
                *language = lang.into();
                Ok(())
            }
            ArtifactContent::Markdown { .. } => Err(ArtifactError::TypeMismatch {
                index,
                expected: "code",
                actual: "text",
            }),
        }
    }

    /// Rename the current version in place.
    pub fn set_current_title(&mut self, title: impl Into<SmolStr>) -> Result<(), ArtifactError> {
        let artifact = self.artifact.as_mut().ok_or(ArtifactError::Empty)?;
        let index = artifact.current_index;
        let content = artifact
            .content_at_mut(index)
            .ok_or(ArtifactError::NotFound { index })?;
        content.set_title(title);
        Ok(())
    }

    /// Append a new markdown version and make it current. Returns the new
    /// version's index.
    pub fn append_markdown(
        &mut self,
        title: impl Into<SmolStr>,
        markdown: impl Into<String>,
    ) -> u32 {
        self.append(|index, title_s, body| ArtifactContent::markdown(index, title_s, body), title, markdown.into())
    }

    /// Append a new code version and make it current. Returns the new
    /// version's index.
    pub fn append_code(
        &mut self,
        title: impl Into<SmolStr>,
        code: impl Into<String>,
        language: impl Into<SmolStr>,
    ) -> u32 {
        let language = language.into();
        self.append(
            move |index, title_s, body| ArtifactContent::code(index, title_s, body, language),
            title,
            code.into(),
        )
    }

    fn append(
        &mut self,
        make: impl FnOnce(u32, SmolStr, String) -> ArtifactContent,
        title: impl Into<SmolStr>,
        body: String,
    ) -> u32 {
        let title = title.into();
        match self.artifact.as_mut() {
            None => {
                self.artifact = Some(Artifact::initial(make(1, title, body)));
                self.bump();
                1
            }
            Some(artifact) => {
                let index = artifact.next_index();
                artifact.contents.push(make(index, title, body));
                artifact.current_index = index;
                debug!(index, "appended artifact version");
                self.bump();
                index
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_creates_untitled_first_version() {
        let mut store = ArtifactStore::new();
        assert_eq!(store.current_content().unwrap_err(), ArtifactError::Empty);

        store.ensure_markdown("# Hi").unwrap();
        let content = store.current_content().unwrap();
        assert_eq!(content.index(), 1);
        assert_eq!(content.title(), "Untitled");
        assert_eq!(content.text(), "# Hi");
    }

    #[test]
    fn test_in_place_edit_keeps_version() {
        let mut store = ArtifactStore::new();
        store.ensure_markdown("# Hi").unwrap();
        store.set_current_markdown("# Hello").unwrap();

        let artifact = store.artifact().unwrap();
        assert_eq!(artifact.contents.len(), 1);
        assert_eq!(artifact.current_index, 1);
        assert_eq!(store.current_text().unwrap(), "# Hello");
    }

    #[test]
    fn test_revision_tracks_body_writes() {
        let mut store = ArtifactStore::new();
        let r0 = store.revision();
        store.ensure_markdown("a").unwrap();
        let r1 = store.revision();
        assert!(r1 > r0);

        // Title edits are not authoritative body writes.
        store.set_current_title("Named").unwrap();
        assert_eq!(store.revision(), r1);

        store.set_current_markdown("b").unwrap();
        assert!(store.revision() > r1);
    }

    #[test]
    fn test_variant_is_immutable_per_index() {
        let mut store = ArtifactStore::new();
        store.load(Artifact::initial(ArtifactContent::code(
            1, "main", "fn main() {}", "rust",
        )));

        assert_eq!(
            store.set_current_markdown("# nope").unwrap_err(),
            ArtifactError::TypeMismatch {
                index: 1,
                expected: "text",
                actual: "code"
            }
        );
        assert!(store.set_current_code("fn main() { run() }").is_ok());
        assert!(store.set_current_language("ron").is_ok());
    }

    #[test]
    fn test_append_advances_current() {
        let mut store = ArtifactStore::new();
        store.ensure_markdown("v1").unwrap();
        let index = store.append_markdown("Untitled", "v2");
        assert_eq!(index, 2);

        let artifact = store.artifact().unwrap();
        assert_eq!(artifact.current_index, 2);
        assert_eq!(artifact.contents.len(), 2);
        assert_eq!(store.current_text().unwrap(), "v2");
        // The old version is untouched.
        assert_eq!(artifact.content_at(1).unwrap().text(), "v1");
    }

    #[test]
    fn test_append_code_version() {
        let mut store = ArtifactStore::new();
        store.ensure_markdown("prose").unwrap();
        let index = store.append_code("main", "fn main() {}", "rust");
        assert_eq!(index, 2);
        assert!(!store.current_content().unwrap().is_markdown());
    }

    #[test]
    fn test_broken_pointer_is_reported() {
        let mut store = ArtifactStore::new();
        let mut artifact = Artifact::initial(ArtifactContent::markdown(1, "Untitled", ""));
        artifact.current_index = 9;
        store.load(artifact);

        assert_eq!(
            store.set_current_markdown("x").unwrap_err(),
            ArtifactError::NotFound { index: 9 }
        );
    }
}
