//! Command implementations

pub mod list;
pub mod new;
pub mod page;
pub mod show;

use anyhow::{Context, Result};
use fable_core::assets::LocalAssets;
use fable_core::persistence::JsonRepository;
use fable_core::{Book, BookStore};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Open the library at the given root, loading every stored book
pub(crate) async fn open_store(library: &Path) -> Result<BookStore> {
    let repo = Arc::new(JsonRepository::new(library.join("books")));
    let assets = Arc::new(LocalAssets::new(library.join("assets")));
    let mut store = BookStore::new(repo, assets);
    store
        .load_all()
        .await
        .with_context(|| format!("Failed to load library at {}", library.display()))?;
    tracing::debug!(books = store.books().len(), root = %library.display(), "library loaded");
    Ok(store)
}

/// Parse a book id argument
pub(crate) fn parse_book_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid book id"))
}

/// Resolve a 0-based page number to the page's id
pub(crate) fn resolve_page(book: &Book, number: usize) -> Result<Uuid> {
    book.pages
        .get(number)
        .map(|p| p.id)
        .with_context(|| format!("Book '{}' has no page {number}", book.title))
}
