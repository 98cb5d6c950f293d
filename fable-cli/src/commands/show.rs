//! Show command implementation

use super::{open_store, parse_book_id};
use anyhow::Result;
use fable_core::PageImage;
use std::path::Path;

/// Display one book with its pages
pub async fn run(library: &Path, book: &str, json: bool) -> Result<()> {
    let store = open_store(library).await?;
    let book = store.book(parse_book_id(book)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(book)?);
        return Ok(());
    }

    println!("Title:       {}", book.title);
    if !book.author.is_empty() {
        println!("Author:      {}", book.author);
    }
    if !book.description.is_empty() {
        println!("Description: {}", book.description);
    }
    println!("Format:      {:?}, {}x{}\"", book.orientation, book.dimensions.width, book.dimensions.height);
    println!("Pages:       {}", book.pages.len());
    println!();
    for page in &book.pages {
        let image = match &page.image {
            Some(PageImage::Url { url }) => format!("image: {url}"),
            Some(PageImage::Inline { data, .. }) => format!("image: inline ({} bytes)", data.len()),
            None => "no image".to_string(),
        };
        let text = if page.text.is_empty() {
            "(empty)".to_string()
        } else if page.text.chars().count() > 60 {
            let head: String = page.text.chars().take(57).collect();
            format!("{head}...")
        } else {
            page.text.clone()
        };
        println!("  [{}] {:?}  {}  {}", page.page_number, page.layout, image, text);
    }
    Ok(())
}
