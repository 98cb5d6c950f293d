//! Per-page editing session
//!
//! An [`EditorSession`] wraps the page currently under edit: a shared
//! optimistic working copy the UI renders from, plus one independent
//! [`Autosave`] tracker per high-frequency field (story text, image
//! settings). Switching pages cancels the old session's pending timers so a
//! stale debounce can never persist against the wrong page.

use crate::autosave::{Autosave, SaveOutcome, SaveSink, IMAGE_SETTINGS_SAVE_DELAY, TEXT_SAVE_DELAY};
use crate::error::PersistenceError;
use crate::persistence::BookRepository;
use crate::types::{ImageSettings, Page};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Editing surface for a single selected page
pub struct EditorSession {
    working: Arc<RwLock<Page>>,
    text: Autosave<String>,
    image_settings: Autosave<ImageSettings>,
}

impl EditorSession {
    /// Open a session over a snapshot of the selected page
    pub fn new(repo: Arc<dyn BookRepository>, page: Page) -> Self {
        let initial_text = page.text.clone();
        let initial_settings = page.image_settings.unwrap_or_default();
        let working = Arc::new(RwLock::new(page));

        let text_sink: Arc<dyn SaveSink<String>> = Arc::new(PageFieldSink {
            repo: Arc::clone(&repo),
            working: Arc::clone(&working),
            apply: |page: &mut Page, text: String| page.text = text,
            _marker: PhantomData,
        });
        let settings_sink: Arc<dyn SaveSink<ImageSettings>> = Arc::new(PageFieldSink {
            repo,
            working: Arc::clone(&working),
            apply: |page: &mut Page, settings: ImageSettings| page.image_settings = Some(settings),
            _marker: PhantomData,
        });

        Self {
            working,
            text: Autosave::with_initial(text_sink, TEXT_SAVE_DELAY, initial_text),
            image_settings: Autosave::with_initial(
                settings_sink,
                IMAGE_SETTINGS_SAVE_DELAY,
                initial_settings,
            ),
        }
    }

    /// Id of the page under edit
    pub fn page_id(&self) -> Uuid {
        self.working.read().unwrap().id
    }

    /// Apply a text edit optimistically and schedule its debounced save
    pub fn edit_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.working.write().unwrap().text = text.clone();
        self.text.edit(text);
    }

    /// Apply an image-settings edit optimistically and schedule its save
    pub fn edit_image_settings(&self, settings: ImageSettings) {
        self.working.write().unwrap().image_settings = Some(settings);
        self.image_settings.edit(settings);
    }

    /// Current optimistic state of the page
    pub fn snapshot(&self) -> Page {
        self.working.read().unwrap().clone()
    }

    /// Whether any field has a save pending or in flight
    pub fn saving(&self) -> bool {
        self.text.saving() || self.image_settings.saving()
    }

    /// Outcome channel for text saves
    pub fn text_outcomes(&self) -> mpsc::UnboundedReceiver<SaveOutcome> {
        self.text.outcomes()
    }

    /// Outcome channel for image-settings saves
    pub fn image_settings_outcomes(&self) -> mpsc::UnboundedReceiver<SaveOutcome> {
        self.image_settings.outcomes()
    }

    /// Drop all pending edits without persisting (page switch path)
    pub fn cancel(&self) {
        self.text.cancel();
        self.image_settings.cancel();
    }

    /// Persist all pending edits immediately (editor teardown path)
    pub async fn flush(&self) {
        self.text.flush_now().await;
        self.image_settings.flush_now().await;
    }
}

/// Sink that folds one field's value into the shared working copy and
/// persists the whole page through the repository.
struct PageFieldSink<T, F> {
    repo: Arc<dyn BookRepository>,
    working: Arc<RwLock<Page>>,
    apply: F,
    _marker: PhantomData<fn(T)>,
}

#[async_trait]
impl<T, F> SaveSink<T> for PageFieldSink<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&mut Page, T) + Send + Sync,
{
    async fn save(&self, value: T) -> Result<(), PersistenceError> {
        let page = {
            let mut working = self.working.write().unwrap();
            (self.apply)(&mut working, value);
            working.clone()
        };
        self.repo.update_page(&page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryRepository;
    use crate::types::{Book, Position};
    use std::time::Duration;

    async fn session_over_new_book() -> (Arc<MemoryRepository>, Book, EditorSession) {
        let repo = Arc::new(MemoryRepository::new());
        let book = Book::new("Session Test");
        repo.create_book(&book).await.unwrap();
        let session = EditorSession::new(
            repo.clone() as Arc<dyn BookRepository>,
            book.pages[0].clone(),
        );
        (repo, book, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_burst_persists_once() {
        let (repo, book, session) = session_over_new_book().await;
        let mut outcomes = session.text_outcomes();

        session.edit_text("Once");
        session.edit_text("Once upon");
        session.edit_text("Once upon a time");
        assert!(session.saving());

        assert!(matches!(outcomes.recv().await, Some(SaveOutcome::Saved)));
        assert!(!session.saving());

        let stored = repo.load_book(book.id).await.unwrap();
        assert_eq!(stored.pages[0].text, "Once upon a time");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fields_save_independently() {
        let (repo, book, session) = session_over_new_book().await;
        let mut text_outcomes = session.text_outcomes();
        let mut settings_outcomes = session.image_settings_outcomes();

        session.edit_text("dragged while typing");
        session.edit_image_settings(ImageSettings {
            scale: 2.0,
            position: Position::new(10.0, 5.0),
            ..ImageSettings::default()
        });

        // The shorter image-settings delay fires first; both settle.
        assert!(matches!(
            settings_outcomes.recv().await,
            Some(SaveOutcome::Saved)
        ));
        assert!(matches!(text_outcomes.recv().await, Some(SaveOutcome::Saved)));

        let stored = repo.load_book(book.id).await.unwrap();
        assert_eq!(stored.pages[0].text, "dragged while typing");
        assert_eq!(stored.pages[0].image_settings.unwrap().scale, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_on_page_switch_drops_pending_text() {
        let (repo, book, session) = session_over_new_book().await;

        session.edit_text("should never hit the backend");
        session.cancel();
        assert!(!session.saving());

        tokio::time::sleep(Duration::from_secs(5)).await;
        let stored = repo.load_book(book.id).await.unwrap();
        assert_eq!(stored.pages[0].text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_persists_pending_on_teardown() {
        let (repo, book, session) = session_over_new_book().await;

        session.edit_text("closing time");
        session.flush().await;

        let stored = repo.load_book(book.id).await.unwrap();
        assert_eq!(stored.pages[0].text, "closing time");
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reflects_optimistic_edit_immediately() {
        let (_repo, _book, session) = session_over_new_book().await;
        session.edit_text("instant");
        assert_eq!(session.snapshot().text, "instant");
    }
}
