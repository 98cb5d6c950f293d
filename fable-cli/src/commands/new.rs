//! New command implementation

use super::open_store;
use anyhow::{bail, Result};
use fable_core::types::{template_by_name, TEMPLATES};
use std::path::Path;

/// Create a new book, blank or from a built-in template
pub async fn run(
    library: &Path,
    title: &str,
    author: Option<&str>,
    template: Option<&str>,
) -> Result<()> {
    let mut store = open_store(library).await?;

    let id = match template {
        Some(name) => {
            let Some(template) = template_by_name(name) else {
                let known: Vec<&str> = TEMPLATES.iter().map(|t| t.name).collect();
                bail!("Unknown template '{name}' (available: {})", known.join(", "));
            };
            store.create_book_from_template(title, template).await?
        }
        None => store.create_book(title).await?,
    };

    if let Some(author) = author {
        let book = store.book(id)?.clone().with_author(author);
        store.update_book(book).await?;
    }

    let book = store.book(id)?;
    println!("Created '{}' ({} pages)", book.title, book.pages.len());
    println!("Id: {id}");
    Ok(())
}
