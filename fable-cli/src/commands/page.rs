//! Page-level command implementations

use super::{open_store, parse_book_id, resolve_page};
use anyhow::{Context, Result};
use std::path::Path;

/// Append a page to a book
pub async fn add(library: &Path, book: &str) -> Result<()> {
    let mut store = open_store(library).await?;
    let book_id = parse_book_id(book)?;
    store.select_book(book_id)?;

    store.add_page().await.context("Failed to add page")?;

    let book = store.book(book_id)?;
    println!("Added page {} to '{}'", book.pages.len() - 1, book.title);
    Ok(())
}

/// Duplicate a page, inserting the copy directly after it
pub async fn duplicate(library: &Path, book: &str, page: usize) -> Result<()> {
    let mut store = open_store(library).await?;
    let book_id = parse_book_id(book)?;
    store.select_book(book_id)?;
    let page_id = resolve_page(store.book(book_id)?, page)?;

    store
        .duplicate_page(page_id)
        .await
        .context("Failed to duplicate page")?;

    println!("Duplicated page {page} (copy is page {})", page + 1);
    Ok(())
}

/// Remove a page
pub async fn remove(library: &Path, book: &str, page: usize) -> Result<()> {
    let mut store = open_store(library).await?;
    let book_id = parse_book_id(book)?;
    store.select_book(book_id)?;
    let page_id = resolve_page(store.book(book_id)?, page)?;

    store
        .delete_page(page_id)
        .await
        .context("Failed to remove page")?;

    println!(
        "Removed page {page}; {} pages remain",
        store.book(book_id)?.pages.len()
    );
    Ok(())
}

/// Move a page to a new position
pub async fn move_to(library: &Path, book: &str, page: usize, to: usize) -> Result<()> {
    let mut store = open_store(library).await?;
    let book_id = parse_book_id(book)?;
    store.select_book(book_id)?;
    let page_id = resolve_page(store.book(book_id)?, page)?;

    store
        .move_page(page_id, to)
        .await
        .context("Failed to move page")?;

    println!("Moved page {page} to position {to}");
    Ok(())
}

/// Set the story text of a page
pub async fn set_text(library: &Path, book: &str, page: usize, text: &str) -> Result<()> {
    let mut store = open_store(library).await?;
    let book_id = parse_book_id(book)?;
    store.select_book(book_id)?;
    let page_id = resolve_page(store.book(book_id)?, page)?;

    store
        .set_page_text(page_id, text)
        .await
        .context("Failed to set page text")?;

    println!("Updated text on page {page}");
    Ok(())
}
