//! Fable CLI - command-line front end for the book editing core

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fable")]
#[command(author, version, about = "Children's-book editor", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Library directory holding books and assets
    #[arg(long, global = true, default_value = "./fable_library")]
    library: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new book
    New {
        /// Book title
        title: String,

        /// Author name
        #[arg(short, long)]
        author: Option<String>,

        /// Start from a built-in template instead of a blank book
        #[arg(short, long)]
        template: Option<String>,
    },

    /// List the books in the library
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display one book with its pages
    Show {
        /// Book id
        book: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in book templates
    Templates,

    /// Append a page to a book
    AddPage {
        /// Book id
        book: String,
    },

    /// Duplicate a page, inserting the copy directly after it
    DuplicatePage {
        /// Book id
        book: String,

        /// Page number (0-based)
        page: usize,
    },

    /// Remove a page (a book always keeps at least one)
    RemovePage {
        /// Book id
        book: String,

        /// Page number (0-based)
        page: usize,
    },

    /// Move a page to a new position
    MovePage {
        /// Book id
        book: String,

        /// Page number (0-based)
        page: usize,

        /// Target position (clamped to the valid range)
        to: usize,
    },

    /// Set the story text of a page
    SetText {
        /// Book id
        book: String,

        /// Page number (0-based)
        page: usize,

        /// New story text
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "fable_cli=debug,fable_core=debug"
    } else {
        "fable_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::New {
            title,
            author,
            template,
        } => commands::new::run(&cli.library, &title, author.as_deref(), template.as_deref()).await,
        Commands::List { json } => commands::list::run(&cli.library, json).await,
        Commands::Show { book, json } => commands::show::run(&cli.library, &book, json).await,
        Commands::Templates => commands::list::templates(),
        Commands::AddPage { book } => commands::page::add(&cli.library, &book).await,
        Commands::DuplicatePage { book, page } => {
            commands::page::duplicate(&cli.library, &book, page).await
        }
        Commands::RemovePage { book, page } => {
            commands::page::remove(&cli.library, &book, page).await
        }
        Commands::MovePage { book, page, to } => {
            commands::page::move_to(&cli.library, &book, page, to).await
        }
        Commands::SetText { book, page, text } => {
            commands::page::set_text(&cli.library, &book, page, &text).await
        }
    }
}
