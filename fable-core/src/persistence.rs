//! Persistence backend abstraction
//!
//! The store talks to its backend only through [`BookRepository`]; failures
//! are recoverable and never fatal to the editing session. Two reference
//! implementations ship with the crate: an in-memory one for tests and a
//! JSON-file one backing the CLI.

use crate::error::PersistenceError;
use crate::types::{Book, Page};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

/// Result type for persistence operations
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// Abstract persistence backend for books and pages
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Store a newly created book
    async fn create_book(&self, book: &Book) -> PersistenceResult<()>;

    /// Load a single book by id
    async fn load_book(&self, id: Uuid) -> PersistenceResult<Book>;

    /// Load every stored book, oldest first
    async fn load_books(&self) -> PersistenceResult<Vec<Book>>;

    /// Replace a stored book wholesale
    async fn update_book(&self, book: &Book) -> PersistenceResult<()>;

    /// Delete a book record
    async fn delete_book(&self, id: Uuid) -> PersistenceResult<()>;

    /// Store a newly created page within its book
    async fn create_page(&self, page: &Page) -> PersistenceResult<()>;

    /// Replace a stored page wholesale
    async fn update_page(&self, page: &Page) -> PersistenceResult<()>;

    /// Delete a page record
    async fn delete_page(&self, book_id: Uuid, page_id: Uuid) -> PersistenceResult<()>;
}

/// In-memory repository (for testing)
#[derive(Default)]
pub struct MemoryRepository {
    books: RwLock<HashMap<Uuid, Book>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for MemoryRepository {
    async fn create_book(&self, book: &Book) -> PersistenceResult<()> {
        self.books.write().unwrap().insert(book.id, book.clone());
        Ok(())
    }

    async fn load_book(&self, id: Uuid) -> PersistenceResult<Book> {
        self.books
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn load_books(&self) -> PersistenceResult<Vec<Book>> {
        let mut books: Vec<Book> = self.books.read().unwrap().values().cloned().collect();
        books.sort_by_key(|b| b.created_at);
        Ok(books)
    }

    async fn update_book(&self, book: &Book) -> PersistenceResult<()> {
        let mut books = self.books.write().unwrap();
        match books.get_mut(&book.id) {
            Some(slot) => {
                *slot = book.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound(book.id.to_string())),
        }
    }

    async fn delete_book(&self, id: Uuid) -> PersistenceResult<()> {
        self.books
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create_page(&self, page: &Page) -> PersistenceResult<()> {
        let mut books = self.books.write().unwrap();
        let book = books
            .get_mut(&page.book_id)
            .ok_or_else(|| PersistenceError::NotFound(page.book_id.to_string()))?;
        let index = (page.page_number as usize).min(book.pages.len());
        book.pages.insert(index, page.clone());
        Ok(())
    }

    async fn update_page(&self, page: &Page) -> PersistenceResult<()> {
        let mut books = self.books.write().unwrap();
        let book = books
            .get_mut(&page.book_id)
            .ok_or_else(|| PersistenceError::NotFound(page.book_id.to_string()))?;
        match book.pages.iter_mut().find(|p| p.id == page.id) {
            Some(slot) => {
                *slot = page.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound(page.id.to_string())),
        }
    }

    async fn delete_page(&self, book_id: Uuid, page_id: Uuid) -> PersistenceResult<()> {
        let mut books = self.books.write().unwrap();
        let book = books
            .get_mut(&book_id)
            .ok_or_else(|| PersistenceError::NotFound(book_id.to_string()))?;
        let index = book
            .pages
            .iter()
            .position(|p| p.id == page_id)
            .ok_or_else(|| PersistenceError::NotFound(page_id.to_string()))?;
        book.pages.remove(index);
        Ok(())
    }
}

/// File-backed repository storing one pretty-printed JSON file per book
pub struct JsonRepository {
    root: PathBuf,
}

impl JsonRepository {
    /// Create a repository rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn book_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn read_book(&self, id: Uuid) -> PersistenceResult<Book> {
        let path = self.book_path(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a book atomically: temp file then rename, so a crash mid-write
    /// never leaves a truncated record behind.
    async fn write_book(&self, book: &Book) -> PersistenceResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let data = serde_json::to_string_pretty(book)?;
        let path = self.book_path(book.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Load, apply a page-level mutation, and write back
    async fn with_book<F>(&self, book_id: Uuid, mutate: F) -> PersistenceResult<()>
    where
        F: FnOnce(&mut Book) -> PersistenceResult<()> + Send,
    {
        let mut book = self.read_book(book_id).await?;
        mutate(&mut book)?;
        self.write_book(&book).await
    }
}

#[async_trait]
impl BookRepository for JsonRepository {
    async fn create_book(&self, book: &Book) -> PersistenceResult<()> {
        self.write_book(book).await
    }

    async fn load_book(&self, id: Uuid) -> PersistenceResult<Book> {
        self.read_book(id).await
    }

    async fn load_books(&self) -> PersistenceResult<Vec<Book>> {
        let mut books = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            // Missing root means no books have been stored yet
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(books),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data = tokio::fs::read_to_string(&path).await?;
            books.push(serde_json::from_str(&data)?);
        }
        books.sort_by_key(|b: &Book| b.created_at);
        Ok(books)
    }

    async fn update_book(&self, book: &Book) -> PersistenceResult<()> {
        self.write_book(book).await
    }

    async fn delete_book(&self, id: Uuid) -> PersistenceResult<()> {
        match tokio::fs::remove_file(self.book_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PersistenceError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_page(&self, page: &Page) -> PersistenceResult<()> {
        let page = page.clone();
        self.with_book(page.book_id, move |book| {
            let index = (page.page_number as usize).min(book.pages.len());
            book.pages.insert(index, page);
            Ok(())
        })
        .await
    }

    async fn update_page(&self, page: &Page) -> PersistenceResult<()> {
        let page = page.clone();
        self.with_book(page.book_id, move |book| {
            match book.pages.iter_mut().find(|p| p.id == page.id) {
                Some(slot) => {
                    *slot = page;
                    Ok(())
                }
                None => Err(PersistenceError::NotFound(page.id.to_string())),
            }
        })
        .await
    }

    async fn delete_page(&self, book_id: Uuid, page_id: Uuid) -> PersistenceResult<()> {
        self.with_book(book_id, move |book| {
            let index = book
                .pages
                .iter()
                .position(|p| p.id == page_id)
                .ok_or_else(|| PersistenceError::NotFound(page_id.to_string()))?;
            book.pages.remove(index);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_repository_roundtrip() {
        let repo = MemoryRepository::new();
        let book = Book::new("Memory Test");

        repo.create_book(&book).await.unwrap();
        assert_eq!(repo.load_book(book.id).await.unwrap(), book);

        let mut updated = book.clone();
        updated.title = "Renamed".to_string();
        repo.update_book(&updated).await.unwrap();
        assert_eq!(repo.load_book(book.id).await.unwrap().title, "Renamed");

        repo.delete_book(book.id).await.unwrap();
        assert!(repo.load_book(book.id).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_repository_page_ops() {
        let repo = MemoryRepository::new();
        let book = Book::new("Pages");
        repo.create_book(&book).await.unwrap();

        let page = Page::new(book.id, 1).with_text("second");
        repo.create_page(&page).await.unwrap();
        assert_eq!(repo.load_book(book.id).await.unwrap().pages.len(), 2);

        let mut edited = page.clone();
        edited.text = "second, edited".to_string();
        repo.update_page(&edited).await.unwrap();
        let stored = repo.load_book(book.id).await.unwrap();
        assert_eq!(stored.pages[1].text, "second, edited");

        repo.delete_page(book.id, page.id).await.unwrap();
        assert_eq!(repo.load_book(book.id).await.unwrap().pages.len(), 1);
    }

    #[tokio::test]
    async fn test_json_repository_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRepository::new(dir.path());

        // Empty root reads as an empty library
        assert!(repo.load_books().await.unwrap().is_empty());

        let book = Book::new("On Disk").with_author("A. Writer");
        repo.create_book(&book).await.unwrap();

        let loaded = repo.load_book(book.id).await.unwrap();
        assert_eq!(loaded, book);

        let all = repo.load_books().await.unwrap();
        assert_eq!(all.len(), 1);

        repo.delete_book(book.id).await.unwrap();
        assert!(matches!(
            repo.load_book(book.id).await,
            Err(PersistenceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_json_repository_page_update() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRepository::new(dir.path());
        let book = Book::new("Paged");
        repo.create_book(&book).await.unwrap();

        let mut page = book.pages[0].clone();
        page.text = "hello from disk".to_string();
        repo.update_page(&page).await.unwrap();

        let loaded = repo.load_book(book.id).await.unwrap();
        assert_eq!(loaded.pages[0].text, "hello from disk");
    }
}
