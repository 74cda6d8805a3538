//! `codetag suggest` command implementation.

use std::path::Path;

use colored::Colorize;

use codetag::Result;
use codetag::suggest::{rank, score};

use super::Context;
use super::display::line_range;

/// Run the suggest command.
pub async fn run(ctx: &Context, file: &Path, query: Option<&str>, limit: usize) -> Result<()> {
    if !ctx.settings.enable_tag_search {
        println!(
            "{}: tag search is disabled (enable-tag-search: false)",
            "hint".dimmed()
        );
        return Ok(());
    }

    let tree = ctx.parse(file).await?;
    let ranked = rank(&tree, query);

    if ranked.is_empty() {
        println!("No symbols found in {}", file.display());
        return Ok(());
    }

    for node in ranked.into_iter().take(limit) {
        let path = node.tag_path();
        let shown = query.map(|q| format!("{:5.1}", score(q, &path.tags().join(","))));
        println!(
            "  {} {} {}",
            shown.unwrap_or_default().dimmed(),
            path.to_string().white().bold(),
            format!("[{}]", line_range(node)).dimmed()
        );
    }

    Ok(())
}
