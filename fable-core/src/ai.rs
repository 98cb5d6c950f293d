//! AI generation collaborator and content application
//!
//! The core is vendor-agnostic: it consumes a text or image payload from a
//! [`StoryGenerator`] and applies it to the editing surface. Multi-page text
//! is fanned out across newly created pages; segments are assigned by the
//! page id returned from creation, never by position.

use crate::error::{ContentError, Result};
use crate::store::BookStore;
use crate::types::{ImageStyle, PageImage};
use async_trait::async_trait;
use uuid::Uuid;

/// Marker the prompt layer instructs the model to emit between pages.
/// Exact-match and case-sensitive; both sides of the contract use this
/// constant.
pub const PAGE_BREAK_DELIMITER: &str = "---PAGE BREAK---";

/// Tuning knobs passed through to the text model
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Sampling temperature
    pub temperature: f32,

    /// Rough per-page word budget, if the caller wants one
    pub words_per_page: Option<u32>,

    /// Target reading age, free-form ("3-5", "early reader", ...)
    pub reading_age: Option<String>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            words_per_page: None,
            reading_age: None,
        }
    }
}

/// Abstract text/image generation backend
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate story text for a prompt. Multi-page output separates pages
    /// with [`PAGE_BREAK_DELIMITER`].
    async fn generate_text(
        &self,
        prompt: &str,
        params: &TextParams,
    ) -> std::result::Result<String, ContentError>;

    /// Generate an illustration, returning encoded image bytes
    async fn generate_image(
        &self,
        prompt: &str,
        style: ImageStyle,
    ) -> std::result::Result<Vec<u8>, ContentError>;
}

/// Split generated text on the page-break marker, trimming each segment and
/// discarding empties.
pub fn split_segments(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Pages touched by a text fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedText {
    /// The already-existing page whose text was replaced
    pub updated_page: Uuid,

    /// Pages created for the remaining segments, in reading order
    pub created_pages: Vec<Uuid>,
}

/// Apply generated story text to the store.
///
/// The first surviving segment replaces the selected page's text in place;
/// each subsequent segment goes onto a page created through the store and is
/// assigned by that page's id. If no segment survives trimming, nothing is
/// mutated and [`ContentError::NoUsableSegments`] is reported.
pub async fn apply_generated_text(store: &mut BookStore, text: &str) -> Result<AppliedText> {
    let segments = split_segments(text);
    let Some((first, rest)) = segments.split_first() else {
        return Err(ContentError::NoUsableSegments.into());
    };
    if store.current_book().is_none() {
        return Err(ContentError::NoPageSelected.into());
    }

    let target = match store.selected_page() {
        Some(page) => page.id,
        None => store.add_page().await?,
    };
    store.set_page_text(target, first.clone()).await?;

    let mut created = Vec::with_capacity(rest.len());
    for segment in rest {
        let page_id = store.add_page().await?;
        store.set_page_text(page_id, segment.clone()).await?;
        created.push(page_id);
    }
    Ok(AppliedText {
        updated_page: target,
        created_pages: created,
    })
}

/// Apply a generated illustration to the selected page, creating a page
/// first when none is selected.
pub async fn apply_generated_image(
    store: &mut BookStore,
    data: Vec<u8>,
    mime_type: &str,
) -> Result<Uuid> {
    if store.current_book().is_none() {
        return Err(ContentError::NoPageSelected.into());
    }
    let target = match store.selected_page() {
        Some(page) => page.id,
        None => store.add_page().await?,
    };
    store
        .set_page_image(target, PageImage::inline(data, mime_type))
        .await?;
    Ok(target)
}
