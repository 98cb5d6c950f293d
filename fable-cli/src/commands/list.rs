//! List and templates command implementations

use super::open_store;
use anyhow::Result;
use fable_core::types::TEMPLATES;
use serde::Serialize;
use std::path::Path;

/// Book summary for list output
#[derive(Serialize)]
struct BookSummary {
    id: String,
    title: String,
    author: String,
    pages: usize,
    updated_at: String,
}

/// List the books in the library
pub async fn run(library: &Path, json: bool) -> Result<()> {
    let store = open_store(library).await?;

    let summaries: Vec<BookSummary> = store
        .books()
        .iter()
        .map(|book| BookSummary {
            id: book.id.to_string(),
            title: book.title.clone(),
            author: book.author.clone(),
            pages: book.pages.len(),
            updated_at: book.updated_at.to_rfc3339(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No books in the library yet");
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {:<30} {:>3} pages  {}",
            summary.id, summary.title, summary.pages, summary.updated_at
        );
    }
    Ok(())
}

/// List the built-in book templates
pub fn templates() -> Result<()> {
    for template in TEMPLATES {
        println!(
            "{:<14} {:?} {}x{}\"  {} pages",
            template.name,
            template.orientation,
            template.dimensions.width,
            template.dimensions.height,
            template.page_count
        );
    }
    Ok(())
}
