//! The Book type - root of the document model

use super::Page;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A complete book: metadata plus the ordered page sequence
///
/// Page order is semantically meaningful - it is the reading order, and every
/// page's `page_number` matches its index in `pages` after each structural
/// operation (see the `ops` module).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier for this book, assigned at creation
    pub id: Uuid,

    /// Book title
    pub title: String,

    /// Author name
    pub author: String,

    /// Back-cover style description/summary
    pub description: String,

    /// Page orientation
    pub orientation: Orientation,

    /// Physical page dimensions in inches
    pub dimensions: Dimensions,

    /// Ordered page sequence (reading order)
    pub pages: Vec<Page>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation to the book or any of its pages
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a new book with a single default page.
    ///
    /// Books are never empty: the minimum-page-count invariant holds from
    /// creation onward.
    pub fn new(title: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            author: String::new(),
            description: String::new(),
            orientation: Orientation::default(),
            dimensions: Dimensions::default(),
            pages: vec![Page::new(id, 0)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the orientation
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the page dimensions
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Look up a page by id
    pub fn page(&self, page_id: Uuid) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Look up a page by id, mutably
    pub fn page_mut(&mut self, page_id: Uuid) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == page_id)
    }

    /// Index of a page within the sequence
    pub fn page_index(&self, page_id: Uuid) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page_id)
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Page orientation for the whole book
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Physical page dimensions in inches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Dimensions {
    /// US letter, 8.5 x 11 inches
    fn default() -> Self {
        Self {
            width: 8.5,
            height: 11.0,
        }
    }
}
