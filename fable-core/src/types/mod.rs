//! Core types for the Fable book model

mod book;
mod formatting;
mod layout;
mod page;
mod template;

pub use book::{Book, Dimensions, Orientation};
pub use formatting::{
    FitMethod, ImageSettings, ImageStyle, Position, TextAlignment, TextFormatting,
};
pub use layout::Layout;
pub use page::{Page, PageImage};
pub use template::{template_by_name, BookTemplate, TEMPLATES};
