//! `codetag fetch` command implementation.

use colored::Colorize;

use codetag::grammar::PreloadProgress;
use codetag::languages;
use codetag::text::display_name;
use codetag::{Error, Result};

use super::Context;

/// Run the fetch command.
pub async fn run(ctx: &Context, langs: &[String]) -> Result<()> {
    let langs: Vec<String> = if !langs.is_empty() {
        langs.to_vec()
    } else if !ctx.settings.pre_download_langs.is_empty() {
        ctx.settings.pre_download_langs.clone()
    } else {
        languages::taggable().map(|spec| spec.name.to_string()).collect()
    };

    let loader = ctx.loader().await?;
    let report = loader
        .preload(&langs, |progress: PreloadProgress<'_>| {
            let counter = format!("[{}/{}]", progress.completed, progress.total);
            match progress.outcome {
                Ok(()) => println!(
                    "{} {} {}",
                    counter.dimmed(),
                    display_name(progress.lang),
                    "ok".green()
                ),
                Err(e) => println!(
                    "{} {} {}: {e}",
                    counter.dimmed(),
                    display_name(progress.lang),
                    "failed".red()
                ),
            }
        })
        .await;

    if report.is_complete() {
        println!(
            "\nFetched {} grammars",
            report.loaded.len().to_string().green().bold()
        );
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} of {} grammars failed to load",
            report.failed.len(),
            langs.len()
        )))
    }
}
