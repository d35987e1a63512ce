//! Deck generation command

use super::{check_format, preview};
use anyhow::Result;
use deckcraft_gen::{
    ContentStatus, DeckGenerationRequest, DeckcraftConfig, FileDeckStore, GeneratedDeck,
    PipelineOrchestrator, ServiceClients,
};
use std::time::Instant;

pub struct GenerateArgs {
    pub company_name: String,
    pub industry: String,
    pub description: String,
    pub audience: String,
    pub stage: String,
    pub no_images: bool,
    pub template: Option<String>,
    pub content_provider: Option<String>,
    pub image_provider: Option<String>,
    pub deadline_secs: Option<u64>,
    pub format: String,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    check_format(&args.format)?;
    if args.company_name.trim().is_empty() {
        anyhow::bail!("--company-name must not be empty");
    }

    let mut config = DeckcraftConfig::load()?;
    if let Some(secs) = args.deadline_secs {
        log::debug!("deadline overridden to {}s", secs);
        config.pipeline.deadline_secs = secs;
    }

    let clients = ServiceClients::from_config(
        &config,
        args.content_provider.as_deref(),
        args.image_provider.as_deref(),
    )?;
    let orchestrator =
        PipelineOrchestrator::from_config(&config, &clients, args.template.as_deref())?;
    let store = FileDeckStore::from_config(&config.storage);
    log::debug!("storing decks in {}", store.root().display());

    let request = DeckGenerationRequest {
        company_name: args.company_name,
        industry: args.industry,
        business_description: args.description,
        target_audience: args.audience,
        funding_stage: args.stage,
        auto_populate_images: !args.no_images,
    };

    let started = Instant::now();
    let deck = orchestrator.generate_and_store(&request, &store);
    clients.shutdown();

    if args.format == "json" {
        let output = serde_json::json!({
            "deck_id": deck.deck_id.map(|id| id.to_string()),
            "template_id": orchestrator.catalog().template_id(),
            "overall_status": deck.result.overall_status,
            "slides": deck.result.slides,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&request, &deck, orchestrator.catalog().name());
        println!("  Done in {:.1}s", started.elapsed().as_secs_f64());
    }

    if deck.deck_id.is_none() {
        anyhow::bail!(
            "Deck generated but could not be stored in {}",
            store.root().display()
        );
    }
    Ok(())
}

fn print_summary(request: &DeckGenerationRequest, deck: &GeneratedDeck, template_name: &str) {
    let result = &deck.result;
    println!("{} ({})", request.deck_title(), template_name);
    println!("  Status: {}", result.overall_status);
    println!(
        "  Content: {}/{} slides generated",
        result.content_ok_count(),
        result.slides.len()
    );
    if let Some(id) = deck.deck_id {
        println!("  Deck ID: {}", id);
    }
    println!();

    for slide in &result.slides {
        let marker = match slide.content_status {
            ContentStatus::Ok => "ok",
            ContentStatus::Degraded => "DEGRADED",
        };
        println!(
            "  {:>2}. {:<24} [{}] image: {}",
            slide.order + 1,
            slide.title,
            marker,
            slide.image_source
        );
        println!("      {}", preview(&slide.content, 72));
    }
}
