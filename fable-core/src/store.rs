//! In-memory book store with optimistic persistence
//!
//! [`BookStore`] owns the book list and the current selection. Every
//! mutation is applied in memory first, then pushed to the persistence
//! collaborator; a failed push is logged, broadcast as a [`StoreEvent`], and
//! never rolls the local edit back. The in-memory page sequences are only
//! ever mutated through the `ops` module, so the ordering invariant holds
//! across every code path.

use crate::assets::AssetStore;
use crate::error::{OpsError, PersistenceError, Result};
use crate::ops;
use crate::persistence::BookRepository;
use crate::session::EditorSession;
use crate::types::{Book, BookTemplate, Page, PageImage};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Non-fatal notifications surfaced to the UI layer
#[derive(Debug, Clone)]
pub enum StoreEvent {
    BookCreated(Uuid),

    BookDeleted(Uuid),

    /// A persistence call failed; local state was kept
    SaveFailed { book_id: Uuid, reason: String },

    /// Stored assets for a deleted page/book could not be removed
    AssetCleanupFailed { book_id: Uuid, reason: String },
}

/// The collection of books under edit and the current selection
pub struct BookStore {
    repo: Arc<dyn BookRepository>,
    assets: Arc<dyn AssetStore>,
    books: Vec<Book>,
    current_book: Option<Uuid>,
    current_page: Option<Uuid>,
    events: broadcast::Sender<StoreEvent>,
}

impl BookStore {
    pub fn new(repo: Arc<dyn BookRepository>, assets: Arc<dyn AssetStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            repo,
            assets,
            books: Vec::new(),
            current_book: None,
            current_page: None,
            events,
        }
    }

    /// Subscribe to non-fatal store notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Load every stored book. Unlike the optimistic mutation paths, a
    /// failure here propagates - there is no local state to fall back on.
    pub async fn load_all(&mut self) -> Result<()> {
        self.books = self.repo.load_books().await?;
        Ok(())
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Look up a book by id
    pub fn book(&self, id: Uuid) -> Result<&Book> {
        self.books
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| OpsError::BookNotFound(id).into())
    }

    /// Create a blank single-page book and select it
    pub async fn create_book(&mut self, title: impl Into<String>) -> Result<Uuid> {
        self.insert_book(Book::new(title)).await
    }

    /// Create a book from a template and select it
    pub async fn create_book_from_template(
        &mut self,
        title: impl Into<String>,
        template: &BookTemplate,
    ) -> Result<Uuid> {
        self.insert_book(template.build(title)).await
    }

    async fn insert_book(&mut self, book: Book) -> Result<Uuid> {
        let id = book.id;
        if let Err(err) = self.repo.create_book(&book).await {
            self.report_save_failure(id, &err);
        }
        self.current_page = book.pages.first().map(|p| p.id);
        self.current_book = Some(id);
        self.books.push(book);
        let _ = self.events.send(StoreEvent::BookCreated(id));
        Ok(id)
    }

    /// Replace a book's metadata/state wholesale and persist it
    pub async fn update_book(&mut self, mut book: Book) -> Result<()> {
        let id = book.id;
        let slot = self
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(OpsError::BookNotFound(id))?;
        book.touch();
        *slot = book;
        self.persist_book(id).await;
        Ok(())
    }

    /// Delete a book, cascading best-effort cleanup of its stored assets
    pub async fn delete_book(&mut self, id: Uuid) -> Result<()> {
        let index = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(OpsError::BookNotFound(id))?;
        let book = self.books.remove(index);
        for page in &book.pages {
            self.cleanup_page_assets(book.id, page).await;
        }
        if let Err(err) = self.repo.delete_book(id).await {
            self.report_save_failure(id, &err);
        }
        if self.current_book == Some(id) {
            self.current_book = None;
            self.current_page = None;
        }
        let _ = self.events.send(StoreEvent::BookDeleted(id));
        Ok(())
    }

    /// Select a book; the selection moves to its first page
    pub fn select_book(&mut self, id: Uuid) -> Result<()> {
        let first_page = self.book(id)?.pages.first().map(|p| p.id);
        self.current_book = Some(id);
        self.current_page = first_page;
        Ok(())
    }

    pub fn current_book(&self) -> Option<&Book> {
        self.books.iter().find(|b| Some(b.id) == self.current_book)
    }

    /// Select a page within the current book
    pub fn select_page(&mut self, page_id: Uuid) -> Result<()> {
        let book = self
            .current_book()
            .ok_or(OpsError::NoBookSelected)?;
        if book.page(page_id).is_none() {
            return Err(OpsError::PageNotFound(page_id).into());
        }
        self.current_page = Some(page_id);
        Ok(())
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.current_book()?.page(self.current_page?)
    }

    /// Append a page to the current book and select it
    pub async fn add_page(&mut self) -> Result<Uuid> {
        let (book_id, page) = {
            let book = self.current_book_mut()?;
            let id = ops::add_page(book);
            let page = book.page(id).cloned().ok_or(OpsError::PageNotFound(id))?;
            (book.id, page)
        };
        self.current_page = Some(page.id);
        if let Err(err) = self.repo.create_page(&page).await {
            self.report_save_failure(book_id, &err);
        }
        Ok(page.id)
    }

    /// Duplicate a page of the current book and select the clone
    pub async fn duplicate_page(&mut self, page_id: Uuid) -> Result<Uuid> {
        let (book_id, page) = {
            let book = self.current_book_mut()?;
            let new_id = ops::duplicate_page(book, page_id)?;
            let page = book
                .page(new_id)
                .cloned()
                .ok_or(OpsError::PageNotFound(new_id))?;
            (book.id, page)
        };
        self.current_page = Some(page.id);
        if let Err(err) = self.repo.create_page(&page).await {
            self.report_save_failure(book_id, &err);
        }
        // The duplicate shifted every later page number
        self.persist_book(book_id).await;
        Ok(page.id)
    }

    /// Delete a page of the current book, cleaning up its stored assets
    pub async fn delete_page(&mut self, page_id: Uuid) -> Result<()> {
        let (book_id, removed) = {
            let book = self.current_book_mut()?;
            let removed = ops::delete_page(book, page_id)?;
            (book.id, removed)
        };
        if self.current_page == Some(page_id) {
            self.current_page = self
                .current_book()
                .and_then(|b| b.pages.first())
                .map(|p| p.id);
        }
        self.cleanup_page_assets(book_id, &removed).await;
        if let Err(err) = self.repo.delete_page(book_id, page_id).await {
            self.report_save_failure(book_id, &err);
        }
        self.persist_book(book_id).await;
        Ok(())
    }

    /// Move a page of the current book to a new position.
    ///
    /// A move to the page's current position is a no-op and triggers no
    /// persistence call.
    pub async fn move_page(&mut self, page_id: Uuid, new_index: usize) -> Result<()> {
        let (book_id, moved) = {
            let book = self.current_book_mut()?;
            let moved = ops::move_page(book, page_id, new_index)?;
            (book.id, moved)
        };
        if moved {
            self.persist_book(book_id).await;
        }
        Ok(())
    }

    /// Set a page's text in one shot (non-debounced path, used by fan-out)
    pub async fn set_page_text(&mut self, page_id: Uuid, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let (book_id, page) = self.mutate_page(page_id, move |p| p.text = text)?;
        if let Err(err) = self.repo.update_page(&page).await {
            self.report_save_failure(book_id, &err);
        }
        Ok(())
    }

    /// Replace a page's illustration
    pub async fn set_page_image(&mut self, page_id: Uuid, image: PageImage) -> Result<()> {
        let (book_id, page) = self.mutate_page(page_id, move |p| p.image = Some(image))?;
        if let Err(err) = self.repo.update_page(&page).await {
            self.report_save_failure(book_id, &err);
        }
        Ok(())
    }

    /// Resolve a page's inline image data to a durable URL.
    ///
    /// Best-effort: if the upload fails, the page keeps showing its inline
    /// data and the failure is reported as an event.
    pub async fn persist_page_image(&mut self, page_id: Uuid) -> Result<()> {
        let book_id = self.current_book.ok_or(OpsError::NoBookSelected)?;
        let data = {
            let book = self.book(book_id)?;
            let page = book.page(page_id).ok_or(OpsError::PageNotFound(page_id))?;
            match &page.image {
                Some(PageImage::Inline { data, .. }) => data.clone(),
                // Nothing to resolve
                _ => return Ok(()),
            }
        };
        match self.assets.upload_image(&data, book_id, page_id).await {
            Ok(url) => {
                let (book_id, page) =
                    self.mutate_page(page_id, move |p| p.image = Some(PageImage::url(url)))?;
                if let Err(err) = self.repo.update_page(&page).await {
                    self.report_save_failure(book_id, &err);
                }
            }
            Err(err) => {
                tracing::warn!(page = %page_id, error = %err, "image upload failed, keeping inline data");
                let _ = self.events.send(StoreEvent::SaveFailed {
                    book_id,
                    reason: err.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Upload narration audio for a page and record its URL
    pub async fn set_page_narration(&mut self, page_id: Uuid, audio: &[u8]) -> Result<()> {
        let book_id = self.current_book.ok_or(OpsError::NoBookSelected)?;
        let url = self.assets.upload_audio(audio, book_id, page_id).await?;
        let (book_id, page) = self.mutate_page(page_id, move |p| p.narration_url = Some(url))?;
        if let Err(err) = self.repo.update_page(&page).await {
            self.report_save_failure(book_id, &err);
        }
        Ok(())
    }

    /// Open an editing session over a page, selecting it first.
    ///
    /// The caller must `cancel()` (or `flush()`) the previous session before
    /// opening a new one, so a stale timer cannot save against the old page.
    pub fn begin_editing(&mut self, page_id: Uuid) -> Result<EditorSession> {
        self.select_page(page_id)?;
        let page = self
            .selected_page()
            .cloned()
            .ok_or(OpsError::PageNotFound(page_id))?;
        Ok(EditorSession::new(Arc::clone(&self.repo), page))
    }

    /// Fold a session's working copy back into the in-memory book.
    ///
    /// The session has already persisted the page; position stays owned by
    /// the book, so the stored `page_number` wins over the snapshot's.
    pub fn apply_page(&mut self, page: Page) -> Result<()> {
        let book = self
            .books
            .iter_mut()
            .find(|b| b.id == page.book_id)
            .ok_or(OpsError::BookNotFound(page.book_id))?;
        let index = book
            .page_index(page.id)
            .ok_or(OpsError::PageNotFound(page.id))?;
        let page_number = book.pages[index].page_number;
        book.pages[index] = Page {
            page_number,
            ..page
        };
        book.touch();
        Ok(())
    }

    fn current_book_mut(&mut self) -> Result<&mut Book> {
        let id = self.current_book.ok_or(OpsError::NoBookSelected)?;
        self.books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| OpsError::BookNotFound(id).into())
    }

    /// Apply an in-place page mutation and return a snapshot for persistence
    fn mutate_page<F>(&mut self, page_id: Uuid, mutate: F) -> Result<(Uuid, Page)>
    where
        F: FnOnce(&mut Page),
    {
        let book = self.current_book_mut()?;
        let book_id = book.id;
        let page = book
            .page_mut(page_id)
            .ok_or(OpsError::PageNotFound(page_id))?;
        mutate(page);
        let page = page.clone();
        book.touch();
        Ok((book_id, page))
    }

    async fn persist_book(&self, book_id: Uuid) {
        let Some(book) = self.books.iter().find(|b| b.id == book_id) else {
            return;
        };
        if let Err(err) = self.repo.update_book(book).await {
            self.report_save_failure(book_id, &err);
        }
    }

    fn report_save_failure(&self, book_id: Uuid, err: &PersistenceError) {
        tracing::warn!(book = %book_id, error = %err, "persistence call failed, keeping local state");
        let _ = self.events.send(StoreEvent::SaveFailed {
            book_id,
            reason: err.to_string(),
        });
    }

    async fn cleanup_page_assets(&self, book_id: Uuid, page: &Page) {
        if matches!(page.image, Some(PageImage::Url { .. })) {
            if let Err(err) = self.assets.delete_image(book_id, page.id).await {
                tracing::warn!(book = %book_id, page = %page.id, error = %err, "failed to delete stored illustration");
                let _ = self.events.send(StoreEvent::AssetCleanupFailed {
                    book_id,
                    reason: err.to_string(),
                });
            }
        }
        if page.narration_url.is_some() {
            if let Err(err) = self.assets.delete_audio(book_id, page.id).await {
                tracing::warn!(book = %book_id, page = %page.id, error = %err, "failed to delete stored narration");
                let _ = self.events.send(StoreEvent::AssetCleanupFailed {
                    book_id,
                    reason: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::error::FableError;
    use crate::persistence::MemoryRepository;
    use crate::types::template_by_name;

    fn store() -> (Arc<MemoryRepository>, Arc<MemoryAssets>, BookStore) {
        let repo = Arc::new(MemoryRepository::new());
        let assets = Arc::new(MemoryAssets::new());
        let store = BookStore::new(
            repo.clone() as Arc<dyn BookRepository>,
            assets.clone() as Arc<dyn AssetStore>,
        );
        (repo, assets, store)
    }

    #[tokio::test]
    async fn test_create_book_selects_it_and_persists() {
        let (repo, _assets, mut store) = store();
        let id = store.create_book("The Moon Rabbit").await.unwrap();

        assert_eq!(store.current_book().unwrap().id, id);
        assert!(store.selected_page().is_some());
        assert_eq!(repo.load_book(id).await.unwrap().title, "The Moon Rabbit");
    }

    #[tokio::test]
    async fn test_create_from_template() {
        let (_repo, _assets, mut store) = store();
        let template = template_by_name("picture-book").unwrap();
        let id = store
            .create_book_from_template("Goodnight Fox", template)
            .await
            .unwrap();
        assert_eq!(store.book(id).unwrap().pages.len(), 8);
    }

    #[tokio::test]
    async fn test_structural_ops_persist_renumbering() {
        let (repo, _assets, mut store) = store();
        let id = store.create_book("Ordering").await.unwrap();
        let p0 = store.book(id).unwrap().pages[0].id;
        let p1 = store.add_page().await.unwrap();
        let p2 = store.add_page().await.unwrap();

        store.move_page(p2, 0).await.unwrap();

        let stored = repo.load_book(id).await.unwrap();
        let order: Vec<Uuid> = stored.pages.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![p2, p0, p1]);
        for (i, page) in stored.pages.iter().enumerate() {
            assert_eq!(page.page_number as usize, i);
        }
    }

    #[tokio::test]
    async fn test_delete_last_page_rejected_by_store() {
        let (_repo, _assets, mut store) = store();
        let id = store.create_book("One Pager").await.unwrap();
        let only = store.book(id).unwrap().pages[0].id;

        let err = store.delete_page(only).await.unwrap_err();
        assert!(matches!(
            err,
            FableError::Ops(OpsError::MinimumPageCount)
        ));
        assert_eq!(store.book(id).unwrap().pages.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_page_cleans_up_assets() {
        let (_repo, assets, mut store) = store();
        store.create_book("Cleanup").await.unwrap();
        let doomed = store.add_page().await.unwrap();

        store
            .set_page_image(doomed, PageImage::inline(vec![1, 2, 3], "image/png"))
            .await
            .unwrap();
        store.persist_page_image(doomed).await.unwrap();
        assert_eq!(assets.len(), 1);

        store.delete_page(doomed).await.unwrap();
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_persist_page_image_swaps_inline_for_url() {
        let (repo, _assets, mut store) = store();
        let id = store.create_book("Art").await.unwrap();
        let page_id = store.book(id).unwrap().pages[0].id;

        store
            .set_page_image(page_id, PageImage::inline(vec![9, 9], "image/png"))
            .await
            .unwrap();
        store.persist_page_image(page_id).await.unwrap();

        let page = store.selected_page().unwrap();
        assert!(matches!(page.image, Some(PageImage::Url { .. })));
        let stored = repo.load_book(id).await.unwrap();
        assert!(matches!(stored.pages[0].image, Some(PageImage::Url { .. })));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_local_state_and_notifies() {
        let (repo, assets, mut store) = store();
        let id = store.create_book("Resilient").await.unwrap();
        let mut events = store.subscribe();

        // Make the backend lose the record, then edit
        repo.delete_book(id).await.unwrap();
        let page_id = store.book(id).unwrap().pages[0].id;
        store.set_page_text(page_id, "still here").await.unwrap();

        // The optimistic edit survives and the failure is surfaced
        assert_eq!(store.book(id).unwrap().pages[0].text, "still here");
        loop {
            match events.try_recv().unwrap() {
                StoreEvent::SaveFailed { book_id, .. } => {
                    assert_eq!(book_id, id);
                    break;
                }
                _ => continue,
            }
        }
        drop(assets);
    }

    #[tokio::test]
    async fn test_delete_book_cascades_and_clears_selection() {
        let (repo, assets, mut store) = store();
        let id = store.create_book("Doomed").await.unwrap();
        let page_id = store.book(id).unwrap().pages[0].id;
        store
            .set_page_image(page_id, PageImage::inline(vec![7], "image/png"))
            .await
            .unwrap();
        store.persist_page_image(page_id).await.unwrap();
        assert_eq!(assets.len(), 1);

        store.delete_book(id).await.unwrap();

        assert!(store.current_book().is_none());
        assert!(store.selected_page().is_none());
        assert!(assets.is_empty());
        assert!(repo.load_book(id).await.is_err());
    }

    #[tokio::test]
    async fn test_load_all_restores_library() {
        let (repo, _assets, mut store) = store();
        let a = store.create_book("First").await.unwrap();
        let b = store.create_book("Second").await.unwrap();

        let mut fresh = BookStore::new(
            repo.clone() as Arc<dyn BookRepository>,
            Arc::new(MemoryAssets::new()) as Arc<dyn AssetStore>,
        );
        fresh.load_all().await.unwrap();
        let ids: Vec<Uuid> = fresh.books().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
