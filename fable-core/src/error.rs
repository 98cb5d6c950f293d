//! Error types for Fable Core

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using FableError
pub type Result<T> = std::result::Result<T, FableError>;

/// Top-level error type for all Fable operations
#[derive(Debug, Error)]
pub enum FableError {
    #[error("Page operation error: {0}")]
    Ops(#[from] OpsError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

/// Errors from the structural page-collection operations
///
/// These are synchronous and reported immediately; a failed operation leaves
/// the book unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OpsError {
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    #[error("Page not found: {0}")]
    PageNotFound(Uuid),

    #[error("A book must keep at least one page")]
    MinimumPageCount,

    #[error("No book is currently selected")]
    NoBookSelected,
}

/// Errors from the persistence backend
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors from the object-storage backend holding illustrations and narration
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset path: {0}")]
    InvalidPath(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Errors from generated-content handling
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Generated text contained no usable segments")]
    NoUsableSegments,

    #[error("No page is selected to receive the generated content")]
    NoPageSelected,

    #[error("Generation failed: {0}")]
    Generation(String),
}
