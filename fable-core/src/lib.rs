//! Fable Core Library
//!
//! State-transition core of a children's-book editor: an in-memory book
//! store with structural page operations, a debounced autosave tracker, and
//! application of AI-generated content, persisted through pluggable async
//! collaborators (a book repository, an asset store, a story generator).

pub mod ai;
pub mod assets;
pub mod autosave;
pub mod error;
pub mod ops;
pub mod persistence;
pub mod session;
pub mod store;
pub mod types;

pub use error::{AssetError, ContentError, FableError, OpsError, PersistenceError, Result};
pub use store::{BookStore, StoreEvent};
pub use types::{
    Book, BookTemplate, Dimensions, FitMethod, ImageSettings, ImageStyle, Layout, Orientation,
    Page, PageImage, Position, TextAlignment, TextFormatting,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_creation() {
        let book = Book::new("Test Book");
        assert_eq!(book.title, "Test Book");
        assert_eq!(book.pages.len(), 1);
    }
}
