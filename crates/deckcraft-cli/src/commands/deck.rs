//! Stored deck commands

use super::{check_format, preview};
use anyhow::Result;
use clap::Subcommand;
use deckcraft_core::DeckId;
use deckcraft_gen::{DeckcraftConfig, FileDeckStore};

#[derive(Subcommand)]
pub enum DeckCommands {
    /// List stored decks, newest first
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show a stored deck
    Show {
        /// Deck ID
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

pub fn run(cmd: DeckCommands) -> Result<()> {
    let config = DeckcraftConfig::load()?;
    let store = FileDeckStore::from_config(&config.storage);

    match cmd {
        DeckCommands::List { format } => {
            check_format(&format)?;
            let decks = store.list()?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&decks)?);
                return Ok(());
            }
            if decks.is_empty() {
                println!("No decks found in {}", store.root().display());
                return Ok(());
            }

            println!("{} deck(s):\n", decks.len());
            for meta in &decks {
                println!(
                    "  {} {} [{}] {} {}",
                    meta.deck_id, meta.title, meta.template_id, meta.overall_status, meta.created_at
                );
            }
            Ok(())
        }
        DeckCommands::Show { id, format } => {
            check_format(&format)?;
            let id: DeckId = id.parse()?;
            let deck = store.load(&id)?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&deck)?);
                return Ok(());
            }

            let meta = &deck.metadata;
            println!("Deck: {}", meta.title);
            println!("  ID: {}", meta.deck_id);
            println!("  Template: {}", meta.template_id);
            println!("  Status: {}", meta.overall_status);
            println!("  Created: {}", meta.created_at);
            println!("  Request: {}", meta.request_hash);
            if !meta.description.is_empty() {
                println!("  Description: {}", meta.description);
            }
            println!();
            for slide in &deck.slides {
                println!("  {}. {}", slide.order + 1, slide.title);
                println!("      {}", preview(&slide.content, 72));
                if let Some(url) = &slide.background_image {
                    println!("      Image ({}): {}", slide.image_source, url);
                }
            }
            Ok(())
        }
    }
}
