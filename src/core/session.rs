//! Editor session: one document loaded into an editable surface
//!
//! A session is opened from a route segment (`"new"` or a document id),
//! edited in memory, and written back to the store only on `save`.
//! Dropping a session without saving discards its changes.

use std::time::{Duration, Instant};

use super::document::{Document, DocumentKind, UNTITLED_TITLE};
use super::error::StoreError;
use super::export::ExportSource;
use super::markup::escape_text;
use super::store::DocumentStore;
use super::surface::{FormatCommand, FormatState, FormatSurface, MarkupSurface};
use super::toolbar::{SurfaceEvent, ToolbarSync};

/// Route segment that requests a new document
pub const NEW_DOCUMENT_SEGMENT: &str = "new";

/// Content of a freshly created document
pub const PLACEHOLDER_CONTENT: &str = "<p>Buraya yazmaya başlayın...</p>";

pub const SAVED_NOTICE: &str = "Belge kaydedildi!";
pub const INSERTED_NOTICE: &str = "İçerik eklendi";

/// Alt text of inserted images
pub const IMAGE_ALT: &str = "Yüklenen Görsel";

/// Which document an editor route points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRoute {
    New,
    Existing(String),
}

impl DocumentRoute {
    pub fn parse(segment: &str) -> Self {
        if segment == NEW_DOCUMENT_SEGMENT {
            Self::New
        } else {
            Self::Existing(segment.to_string())
        }
    }

    pub fn segment(&self) -> &str {
        match self {
            Self::New => NEW_DOCUMENT_SEGMENT,
            Self::Existing(id) => id,
        }
    }
}

/// Navigation the session asks its host to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Back to the document list
    ToList,
    /// Re-address the editor at a document's permanent id
    ToDocument(String),
}

/// Result of opening a session
#[derive(Debug)]
pub enum Opened<S = MarkupSurface> {
    Editing(EditorSession<S>),
    Redirect(Redirect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Saved,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: String,
    pub redirect: Option<Redirect>,
    pub notice: &'static str,
}

/// Working copy of one document
#[derive(Debug)]
pub struct EditorSession<S = MarkupSurface> {
    id: String,
    title: String,
    is_new: bool,
    surface: S,
    /// Stored content, kept verbatim until the surface is edited
    loaded_content: Option<String>,
    toolbar: ToolbarSync,
    state: SessionState,
    dirty_since: Option<Instant>,
}

impl EditorSession<MarkupSurface> {
    /// Open a session on a fresh [`MarkupSurface`]
    pub fn open(store: &mut DocumentStore, route: &DocumentRoute) -> Result<Opened, StoreError> {
        Self::open_with(store, route, MarkupSurface::new())
    }
}

impl<S: FormatSurface> EditorSession<S> {
    /// Open a session rendering into `surface`
    pub fn open_with(
        store: &mut DocumentStore,
        route: &DocumentRoute,
        mut surface: S,
    ) -> Result<Opened<S>, StoreError> {
        let (id, title, is_new, loaded_content) = match route {
            DocumentRoute::New => {
                surface.load_markup(PLACEHOLDER_CONTENT);
                (store.new_id(), String::new(), true, None)
            }
            DocumentRoute::Existing(id) => match store.get_by_id(id)? {
                Some(doc) => {
                    surface.load_markup(&doc.content);
                    (doc.id, doc.title, false, Some(doc.content))
                }
                None => {
                    tracing::info!("Document {} not found, returning to list", id);
                    return Ok(Opened::Redirect(Redirect::ToList));
                }
            },
        };

        tracing::debug!("Opened editor session for {} (new: {})", id, is_new);
        Ok(Opened::Editing(Self {
            id,
            title,
            is_new,
            surface,
            loaded_content,
            toolbar: ToolbarSync::new(),
            state: SessionState::Editing,
            dirty_since: None,
        }))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title for headers, with the placeholder when empty
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            UNTITLED_TITLE
        } else {
            trimmed
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.mark_dirty();
        }
    }

    /// Whether the document has never been saved
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn format_state(&self) -> FormatState {
        self.toolbar.flags()
    }

    fn mark_dirty(&mut self) {
        self.state = SessionState::Editing;
        self.dirty_since.get_or_insert_with(Instant::now);
    }

    fn mark_content_edited(&mut self) {
        self.loaded_content = None;
        self.mark_dirty();
    }

    /// Current content; what was loaded until the surface has been edited
    pub fn content(&self) -> String {
        self.loaded_content
            .clone()
            .unwrap_or_else(|| self.surface.markup())
    }

    /// Mutate the content, then resync the toolbar
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.surface);
        self.mark_content_edited();
        self.toolbar.sync(&self.surface);
        result
    }

    /// Move the cursor or selection without changing content
    pub fn navigate<R>(&mut self, event: SurfaceEvent, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.surface);
        self.toolbar.handle_event(event, &self.surface);
        result
    }

    /// Toolbar action on the current selection
    pub fn apply_format(&mut self, command: FormatCommand) -> FormatState {
        self.mark_content_edited();
        self.toolbar.apply(&mut self.surface, command)
    }

    /// Insert a fragment at the cursor, or append it when there is none
    pub fn insert_fragment(&mut self, fragment: &str) {
        self.edit(|surface| {
            if surface.has_cursor() {
                surface.insert_markup(fragment);
            } else {
                surface.append_markup(fragment);
            }
        });
    }

    /// Insert text produced by the assistant as a new paragraph
    pub fn insert_generated_text(&mut self, text: &str) -> &'static str {
        self.insert_fragment(&format!("<p>{}</p>", escape_text(text)));
        INSERTED_NOTICE
    }

    /// Insert an image reference followed by an empty line
    pub fn insert_image(&mut self, src: &str) {
        let src = escape_text(src).replace('"', "&quot;");
        self.insert_fragment(&format!(
            "<img src=\"{src}\" alt=\"{IMAGE_ALT}\"><div><br></div>"
        ));
    }

    /// Record built from the current state, as it would be saved
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new(self.id.clone(), self.display_title(), self.content());
        doc.kind = DocumentKind::Doc;
        doc
    }

    /// Write the working copy back to the store.
    ///
    /// On failure the in-memory state is left untouched so the save can be
    /// retried.
    pub fn save(&mut self, store: &mut DocumentStore) -> Result<SaveOutcome, StoreError> {
        store.save(self.to_document())?;

        let redirect = if self.is_new {
            self.is_new = false;
            Some(Redirect::ToDocument(self.id.clone()))
        } else {
            None
        };
        self.state = SessionState::Saved;
        self.dirty_since = None;

        tracing::info!("Saved document {} ({})", self.id, self.display_title());
        Ok(SaveOutcome {
            id: self.id.clone(),
            redirect,
            notice: SAVED_NOTICE,
        })
    }

    /// Whether auto-save should run now: only for documents that already
    /// exist in the store and have been dirty for at least `interval`
    pub fn auto_save_due(&self, now: Instant, interval: Duration) -> bool {
        !self.is_new
            && self
                .dirty_since
                .is_some_and(|since| now.saturating_duration_since(since) >= interval)
    }

    /// Read-only view for exporters
    pub fn export_source(&self) -> ExportSource {
        ExportSource {
            title: self.display_title().to_string(),
            content: self.content(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StorageError;
    use crate::core::storage::MemoryStorage;
    use crate::core::surface::Caret;

    fn store() -> DocumentStore {
        DocumentStore::new(Box::new(MemoryStorage::new()))
    }

    fn open(store: &mut DocumentStore, segment: &str) -> Opened {
        EditorSession::open(store, &DocumentRoute::parse(segment)).unwrap()
    }

    fn editing(opened: Opened) -> EditorSession {
        match opened {
            Opened::Editing(session) => session,
            Opened::Redirect(r) => panic!("unexpected redirect: {r:?}"),
        }
    }

    #[test]
    fn test_route_parsing() {
        assert_eq!(DocumentRoute::parse("new"), DocumentRoute::New);
        assert_eq!(
            DocumentRoute::parse("42"),
            DocumentRoute::Existing("42".to_string())
        );
        assert_eq!(DocumentRoute::Existing("42".to_string()).segment(), "42");
    }

    #[test]
    fn test_new_session_defaults() {
        let mut store = store();
        let session = editing(open(&mut store, "new"));
        assert!(session.is_new());
        assert_eq!(session.title(), "");
        assert_eq!(session.display_title(), UNTITLED_TITLE);
        assert_eq!(session.surface().markup(), PLACEHOLDER_CONTENT);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_two_new_sessions_get_distinct_ids() {
        let mut store = store();
        let a = editing(open(&mut store, "new"));
        let b = editing(open(&mut store, "new"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_existing_document_is_hydrated() {
        let mut store = store();
        let session = editing(open(&mut store, "2"));
        assert_eq!(session.id(), "2");
        assert_eq!(session.title(), "Proje Teklifi - Acme");
        assert_eq!(
            session.surface().markup(),
            "<h1>Acme Corp Proje Teklifi</h1><p>Giriş ve amaçlar...</p>"
        );
    }

    #[test]
    fn test_missing_document_redirects_to_list() {
        let mut store = store();
        assert!(store.get_by_id("nonexistent-id").unwrap().is_none());
        match open(&mut store, "nonexistent-id") {
            Opened::Redirect(Redirect::ToList) => {}
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_first_save_redirects_then_updates_in_place() {
        let mut store = store();
        let mut session = editing(open(&mut store, "new"));
        session.set_title("Toplantı Notları");

        let first = session.save(&mut store).unwrap();
        assert_eq!(first.redirect, Some(Redirect::ToDocument(session.id().to_string())));
        assert_eq!(first.notice, SAVED_NOTICE);
        assert!(!session.is_new());

        session.set_title("Toplantı Notları v2");
        let second = session.save(&mut store).unwrap();
        assert_eq!(second.redirect, None);

        let docs = store.list_all().unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].id, session.id());
        assert_eq!(docs[0].title, "Toplantı Notları v2");
    }

    #[test]
    fn test_unedited_content_is_saved_verbatim() {
        let mut store = store();
        let content = r#"<p>See <a href="https://x.y">link</a></p><blockquote>quoted</blockquote><ul><li><p>item</p></li></ul><p style="text-align:center">c</p>"#;
        let mut doc = Document::new("rich", "Zengin", content);
        doc.kind = DocumentKind::Doc;
        store.save(doc).unwrap();

        let mut session = editing(open(&mut store, "rich"));
        session.navigate(SurfaceEvent::Click, |s| s.set_caret(Caret::new(0, 2)));
        session.set_title("Zengin metin");
        session.save(&mut store).unwrap();

        let saved = store.get_by_id("rich").unwrap().unwrap();
        assert_eq!(saved.content, content);
        assert_eq!(saved.title, "Zengin metin");
        assert_eq!(session.export_source().content, content);

        // Editing switches to the surface's markup
        session.navigate(SurfaceEvent::Click, |s| s.clear_cursor());
        session.insert_generated_text("yeni");
        session.save(&mut store).unwrap();
        let saved = store.get_by_id("rich").unwrap().unwrap();
        assert_ne!(saved.content, content);
        assert!(saved.content.contains("<ul><li>item</li></ul>"));
        assert!(saved.content.ends_with("<p>yeni</p>"));
    }

    #[test]
    fn test_save_moves_state_to_saved() {
        let mut store = store();
        let mut session = editing(open(&mut store, "2"));
        assert_eq!(session.state(), SessionState::Editing);
        session.set_title("Teklif");
        session.save(&mut store).unwrap();
        assert_eq!(session.state(), SessionState::Saved);
        session.set_title("Teklif v2");
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[test]
    fn test_blank_title_saved_as_placeholder() {
        let mut store = store();
        let mut session = editing(open(&mut store, "new"));
        session.set_title("   ");
        let outcome = session.save(&mut store).unwrap();

        let doc = store.get_by_id(&outcome.id).unwrap().unwrap();
        assert_eq!(doc.title, UNTITLED_TITLE);
        assert_eq!(doc.kind, DocumentKind::Doc);
        assert_eq!(doc.icon, "description");
        assert_eq!(doc.color, "text-blue-600");
        assert_eq!(doc.is_shared, Some(false));
    }

    #[test]
    fn test_saving_shared_seed_resets_defaults() {
        let mut store = store();
        let mut session = editing(open(&mut store, "1"));
        session.save(&mut store).unwrap();

        let doc = store.get_by_id("1").unwrap().unwrap();
        assert!(!doc.is_shared());
        assert_eq!(store.list_all().unwrap()[0].id, "1");
    }

    #[test]
    fn test_failed_save_keeps_session_intact() {
        let mut store = DocumentStore::new(Box::new(MemoryStorage::with_quota(4096)));
        let mut session = editing(open(&mut store, "new"));
        session.set_title("Büyük");
        session.insert_generated_text(&"x".repeat(8192));
        let markup = session.surface().markup();

        let err = session.save(&mut store).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert!(session.is_new());
        assert!(session.is_dirty());
        assert_eq!(session.surface().markup(), markup);
        assert_eq!(session.title(), "Büyük");
    }

    #[test]
    fn test_generated_text_goes_to_cursor_or_end() {
        let mut store = store();
        let mut session = editing(open(&mut store, "3"));

        let notice = session.insert_generated_text("a < b");
        assert_eq!(notice, INSERTED_NOTICE);
        assert_eq!(
            session.surface().markup(),
            "<p>Marka renk paleti ve logo kullanımları.</p><p>a &lt; b</p>"
        );

        session.navigate(SurfaceEvent::Click, |s| s.set_caret(Caret::new(0, 5)));
        session.insert_generated_text("ara");
        assert_eq!(session.surface().blocks()[1].text(), "ara");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_insert_image_adds_trailing_line() {
        let mut store = store();
        let mut session = editing(open(&mut store, "new"));
        session.insert_image("data:image/png;base64,AAAA");
        assert_eq!(
            session.surface().markup(),
            "<p>Buraya yazmaya başlayın...</p><img src=\"data:image/png;base64,AAAA\" alt=\"Yüklenen Görsel\"><p><br></p>"
        );
    }

    #[test]
    fn test_format_through_session_updates_toolbar() {
        let mut store = store();
        let mut session = editing(open(&mut store, "2"));
        session.navigate(SurfaceEvent::Click, |s| s.set_caret(Caret::new(1, 3)));
        assert!(!session.format_state().heading2);

        let state = session.apply_format(FormatCommand::Block(
            crate::core::surface::BlockStyle::Heading(2),
        ));
        assert!(state.heading2);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_auto_save_only_for_existing_documents() {
        let mut store = store();
        let interval = Duration::from_secs(30);

        let mut fresh = editing(open(&mut store, "new"));
        fresh.set_title("x");
        assert!(!fresh.auto_save_due(Instant::now() + interval, interval));

        let mut existing = editing(open(&mut store, "2"));
        assert!(!existing.auto_save_due(Instant::now() + interval, interval));
        existing.set_title("y");
        assert!(!existing.auto_save_due(Instant::now(), interval));
        assert!(existing.auto_save_due(Instant::now() + interval, interval));
    }

    #[test]
    fn test_export_source_reflects_working_copy() {
        let mut store = store();
        let mut session = editing(open(&mut store, "new"));
        session.set_title("Rapor");
        let source = session.export_source();
        assert_eq!(source.title, "Rapor");
        assert_eq!(source.content, PLACEHOLDER_CONTENT);
    }
}
