//! Page type representing a single page of a book

use super::{ImageSettings, Layout, TextFormatting};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single page: story text, an optional illustration, and a layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// Unique identifier for this page
    pub id: Uuid,

    /// Owning book (relation only - the book owns the page via its sequence)
    pub book_id: Uuid,

    /// 0-based position, always equal to the page's index in the book
    pub page_number: u32,

    /// Story text for this page
    pub text: String,

    /// Optional illustration
    pub image: Option<PageImage>,

    /// Visual template governing text/image placement
    pub layout: Layout,

    /// Optional text styling overrides
    pub text_formatting: Option<TextFormatting>,

    /// User-adjustable view transform over the illustration
    pub image_settings: Option<ImageSettings>,

    /// Optional page background color (CSS color string)
    pub background_color: Option<String>,

    /// URL of the narration audio, once uploaded
    pub narration_url: Option<String>,
}

impl Page {
    /// Create a default page at the given position
    pub fn new(book_id: Uuid, page_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            page_number,
            text: String::new(),
            image: None,
            layout: Layout::default(),
            text_formatting: None,
            image_settings: None,
            background_color: None,
            narration_url: None,
        }
    }

    /// Set the story text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the layout
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Clone all content fields into a new page with a fresh identity.
    ///
    /// The clone keeps the source's position; the caller is responsible for
    /// placing it and renumbering.
    pub fn duplicated(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// An illustration reference - exactly one representation is active at a time.
///
/// Freshly generated images start out inline; the persistence step uploads
/// them and swaps in the durable URL. The swap is best-effort: on upload
/// failure the page keeps showing the inline data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageImage {
    /// Encoded image bytes held in memory, pre-persistence
    Inline {
        #[serde(with = "base64_serde")]
        data: Vec<u8>,
        mime_type: String,
    },

    /// Durable URL in the object store, post-persistence
    Url { url: String },
}

impl PageImage {
    /// Create an inline image
    pub fn inline(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        PageImage::Inline {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Create a URL reference
    pub fn url(url: impl Into<String>) -> Self {
        PageImage::Url { url: url.into() }
    }

    /// Whether this image still holds inline data awaiting upload
    pub fn is_inline(&self) -> bool {
        matches!(self, PageImage::Inline { .. })
    }
}

/// Base64 serialization for binary data
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
