//! Page layout templates

use serde::{Deserialize, Serialize};

/// Visual template governing text/image placement on a page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Text on the left half, image on the right
    #[default]
    TextLeftImageRight,

    /// Image on the left half, text on the right
    ImageLeftTextRight,

    /// Text across the top, image below
    TextTopImageBottom,

    /// Image across the top, text below
    ImageTopTextBottom,

    /// Image fills the page, text overlaid
    FullPageImage,

    /// Text only, no image region
    FullPageText,
}

impl Layout {
    /// Whether this layout renders an image region at all
    pub fn has_image(&self) -> bool {
        !matches!(self, Layout::FullPageText)
    }
}
