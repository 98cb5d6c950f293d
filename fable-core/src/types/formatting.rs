//! Text styling and image view-transform types

use serde::{Deserialize, Serialize};

/// Per-page text styling overrides
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextFormatting {
    /// Font family name
    pub font_family: String,

    /// Font size in points
    pub font_size: f32,

    /// Font color (CSS color string)
    pub font_color: String,

    pub bold: bool,
    pub italic: bool,

    /// Horizontal text alignment
    pub alignment: TextAlignment,

    /// Illustration style requested for generated images on this page
    pub image_style: Option<ImageStyle>,
}

impl Default for TextFormatting {
    fn default() -> Self {
        Self {
            font_family: "Georgia".to_string(),
            font_size: 18.0,
            font_color: "#000000".to_string(),
            bold: false,
            italic: false,
            alignment: TextAlignment::default(),
            image_style: None,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Illustration style passed through to the image generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    #[default]
    Cartoon,
    Watercolor,
    PencilSketch,
    Digital,
    Storybook,
}

/// User-adjustable view transform over a page's illustration.
///
/// Independent of the underlying image content: panning and zooming never
/// modify the stored image, only how it is framed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImageSettings {
    /// Zoom factor, 1.0 = fit
    pub scale: f32,

    /// Pan offset from the centered position
    pub position: Position,

    /// How the image fills its frame
    pub fit_method: FitMethod,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Position::default(),
            fit_method: FitMethod::default(),
        }
    }
}

/// A 2D offset in layout units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How an image fills its frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Letterbox: the whole image is visible
    #[default]
    Contain,

    /// Fill: the frame is covered, edges may crop
    Cover,
}
