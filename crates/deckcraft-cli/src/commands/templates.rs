//! Template listing command

use super::check_format;
use anyhow::Result;
use deckcraft_gen::catalog::templates;

pub fn run(format: &str) -> Result<()> {
    check_format(format)?;
    let list = templates()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{} template(s):\n", list.len());
    for template in &list {
        println!("  {} - {}", template.id, template.name);
        println!("    {}", template.description);
        if template.slides.is_empty() {
            println!("    (blank canvas, no slides)");
        } else {
            println!("    Slides: {}", template.slides.join(", "));
        }
    }
    Ok(())
}
