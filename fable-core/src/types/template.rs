//! Built-in book templates

use super::{Book, Dimensions, Layout, Orientation, Page};

/// A starting-point descriptor for new books
#[derive(Debug, Clone, Copy)]
pub struct BookTemplate {
    /// Stable template name used for lookup
    pub name: &'static str,

    pub orientation: Orientation,
    pub dimensions: Dimensions,

    /// Layout applied to every seeded page
    pub layout: Layout,

    /// Number of pages the new book starts with (at least 1)
    pub page_count: usize,
}

impl BookTemplate {
    /// Build a new book from this template
    pub fn build(&self, title: impl Into<String>) -> Book {
        let mut book = Book::new(title)
            .with_orientation(self.orientation)
            .with_dimensions(self.dimensions);
        book.pages.clear();
        for number in 0..self.page_count.max(1) {
            book.pages
                .push(Page::new(book.id, number as u32).with_layout(self.layout));
        }
        book
    }
}

/// The built-in template catalog
pub const TEMPLATES: &[BookTemplate] = &[
    BookTemplate {
        name: "storybook",
        orientation: Orientation::Portrait,
        dimensions: Dimensions {
            width: 8.5,
            height: 11.0,
        },
        layout: Layout::TextLeftImageRight,
        page_count: 12,
    },
    BookTemplate {
        name: "picture-book",
        orientation: Orientation::Portrait,
        dimensions: Dimensions {
            width: 8.5,
            height: 8.5,
        },
        layout: Layout::FullPageImage,
        page_count: 8,
    },
    BookTemplate {
        name: "board-book",
        orientation: Orientation::Landscape,
        dimensions: Dimensions {
            width: 11.0,
            height: 8.5,
        },
        layout: Layout::ImageTopTextBottom,
        page_count: 6,
    },
];

/// Look up a built-in template by name
pub fn template_by_name(name: &str) -> Option<&'static BookTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}
