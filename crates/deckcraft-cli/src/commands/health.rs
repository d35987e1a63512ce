//! Health command

use super::check_format;
use anyhow::Result;
use deckcraft_gen::health::HealthReport;
use deckcraft_gen::{DeckcraftConfig, ServiceClients};

pub fn run(format: &str) -> Result<()> {
    check_format(format)?;
    let config = DeckcraftConfig::load()?;
    let clients = ServiceClients::from_config(&config, None, None)?;
    let report = HealthReport::check(&clients);
    clients.shutdown();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Status: {}", report.status);
    println!("  Checked: {}", report.timestamp);
    for provider in &report.providers {
        println!(
            "  {:<8} {:<12} {}",
            provider.role, provider.provider, provider.status
        );
    }
    Ok(())
}
