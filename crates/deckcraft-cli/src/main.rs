//! DeckCraft CLI - generate investor pitch decks from a business description

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{deck, generate, health, research, templates};

#[derive(Parser)]
#[command(name = "deckcraft")]
#[command(about = "Generate investor pitch decks with AI content and imagery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a complete deck and store it
    Generate {
        /// Company name
        #[arg(long)]
        company_name: String,

        /// Industry (e.g., "technology")
        #[arg(long)]
        industry: String,

        /// What the business does
        #[arg(long)]
        description: String,

        /// Who the deck is for
        #[arg(long, default_value = "investors")]
        audience: String,

        /// Funding stage (e.g., "seed", "series-a")
        #[arg(long, default_value = "seed")]
        stage: String,

        /// Use stock art only; never call the image service
        #[arg(long)]
        no_images: bool,

        /// Deck template id
        #[arg(long)]
        template: Option<String>,

        /// Content provider override (perplexity, mock)
        #[arg(long)]
        content_provider: Option<String>,

        /// Image provider override (fal, mock)
        #[arg(long)]
        image_provider: Option<String>,

        /// Budget for the whole run in seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List deck templates
    Templates {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Stored deck operations
    #[command(subcommand)]
    Deck(deck::DeckCommands),

    /// Run a research query (market, competitive, content)
    Research {
        /// Research type: market, competitive, content
        kind: String,

        /// The question to research
        #[arg(long, short)]
        query: String,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long)]
        company: Option<String>,

        /// Content provider override
        #[arg(long)]
        provider: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Report which providers are configured
    Health {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            company_name,
            industry,
            description,
            audience,
            stage,
            no_images,
            template,
            content_provider,
            image_provider,
            deadline_secs,
            format,
        } => generate::run(generate::GenerateArgs {
            company_name,
            industry,
            description,
            audience,
            stage,
            no_images,
            template,
            content_provider,
            image_provider,
            deadline_secs,
            format,
        }),
        Commands::Templates { format } => templates::run(&format),
        Commands::Deck(cmd) => deck::run(cmd),
        Commands::Research {
            kind,
            query,
            industry,
            company,
            provider,
            format,
        } => research::run(research::ResearchArgs {
            kind,
            query,
            industry,
            company,
            provider,
            format,
        }),
        Commands::Health { format } => health::run(&format),
    }
}
