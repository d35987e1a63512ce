//! Research command

use super::check_format;
use anyhow::Result;
use deckcraft_gen::research::{run_research, ResearchKind, ResearchQuery};
use deckcraft_gen::{DeckcraftConfig, ServiceClients};

pub struct ResearchArgs {
    pub kind: String,
    pub query: String,
    pub industry: Option<String>,
    pub company: Option<String>,
    pub provider: Option<String>,
    pub format: String,
}

pub fn run(args: ResearchArgs) -> Result<()> {
    check_format(&args.format)?;
    let kind: ResearchKind = args.kind.parse()?;

    let config = DeckcraftConfig::load()?;
    let clients = ServiceClients::from_config(&config, args.provider.as_deref(), None)?;

    let mut query = ResearchQuery::new(kind, &args.query);
    query.industry = args.industry;
    query.company = args.company;

    log::debug!("running {} research via {}", kind, clients.content.name());
    let report = run_research(
        clients.content.as_ref(),
        &query,
        config.pipeline.content_timeout(),
    );
    clients.shutdown();
    let report = report?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Research: {} (via {})", report.research_type, report.provider);
    println!();
    println!("{}", report.content);
    if !report.citations.is_empty() {
        println!();
        println!("Citations:");
        for (i, citation) in report.citations.iter().enumerate() {
            println!("  [{}] {}", i + 1, citation);
        }
    }
    Ok(())
}
