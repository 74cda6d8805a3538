//! `codetag langs` command implementation.

use colored::Colorize;

use codetag::Result;
use codetag::languages::LANGUAGES;
use codetag::text::display_name;

use super::Context;

/// Run the langs command.
pub async fn run(ctx: &Context) -> Result<()> {
    let cache = ctx.settings.grammar_cache();

    println!(
        "{} languages ({} with symbol tags):",
        LANGUAGES.len().to_string().green().bold(),
        LANGUAGES.iter().filter(|l| l.is_taggable()).count()
    );
    println!();

    for spec in LANGUAGES {
        let cached = match &cache {
            Some(cache) => cache.exists(spec.name).await,
            None => false,
        };
        println!(
            "  {:<12} {:<12} {:<28} {} {}",
            spec.name.white().bold(),
            display_name(spec.name),
            spec.extensions.join(" ").dimmed(),
            if spec.is_taggable() { "tags".green() } else { "parse-only".yellow() },
            if cached { "cached".cyan() } else { "".normal() }
        );
    }

    Ok(())
}
