//! Structural operations over a book's page sequence
//!
//! All four operations keep the ordering invariant: after each call,
//! `pages[i].page_number == i` for every index, and a book never drops below
//! one page. Operations are synchronous and purely in-memory; persistence is
//! a separate step owned by the store.

use crate::error::OpsError;
use crate::types::{Book, Page};
use uuid::Uuid;

/// Append a new default page and return its id
pub fn add_page(book: &mut Book) -> Uuid {
    let page = Page::new(book.id, book.pages.len() as u32);
    let id = page.id;
    book.pages.push(page);
    book.touch();
    id
}

/// Clone a page directly after its source and return the clone's id.
///
/// The clone keeps all content fields (text, layout, formatting, image
/// settings) but gets a fresh identity.
pub fn duplicate_page(book: &mut Book, page_id: Uuid) -> Result<Uuid, OpsError> {
    let index = book
        .page_index(page_id)
        .ok_or(OpsError::PageNotFound(page_id))?;
    let clone = book.pages[index].duplicated();
    let id = clone.id;
    book.pages.insert(index + 1, clone);
    renumber(book);
    book.touch();
    Ok(id)
}

/// Remove a page and return it so the caller can clean up its stored assets.
///
/// Deleting the last remaining page is rejected with
/// [`OpsError::MinimumPageCount`] and leaves the book unchanged.
pub fn delete_page(book: &mut Book, page_id: Uuid) -> Result<Page, OpsError> {
    let index = book
        .page_index(page_id)
        .ok_or(OpsError::PageNotFound(page_id))?;
    if book.pages.len() == 1 {
        return Err(OpsError::MinimumPageCount);
    }
    let removed = book.pages.remove(index);
    renumber(book);
    book.touch();
    Ok(removed)
}

/// Move a page to `new_index` (clamped to the valid range).
///
/// Returns `Ok(false)` without touching the book when the clamped target
/// equals the current position, so callers can skip the persistence step.
pub fn move_page(book: &mut Book, page_id: Uuid, new_index: usize) -> Result<bool, OpsError> {
    let index = book
        .page_index(page_id)
        .ok_or(OpsError::PageNotFound(page_id))?;
    let target = new_index.min(book.pages.len() - 1);
    if target == index {
        return Ok(false);
    }
    let page = book.pages.remove(index);
    book.pages.insert(target, page);
    renumber(book);
    book.touch();
    Ok(true)
}

fn renumber(book: &mut Book) {
    for (i, page) in book.pages.iter_mut().enumerate() {
        page.page_number = i as u32;
    }
}
