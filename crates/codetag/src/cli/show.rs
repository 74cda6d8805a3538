//! `codetag show` command implementation.

use std::path::Path;

use colored::Colorize;

use codetag::text::dedent;
use codetag::{CodeLink, Error, Result, TagPath};

use super::Context;

/// Run the show command.
pub async fn run(ctx: &Context, link: &str) -> Result<()> {
    let link = CodeLink::parse_inner(link)
        .ok_or_else(|| Error::Config(format!("'{link}' is not a code link")))?;
    let file = Path::new(&link.file_link);

    let Some(path) = &link.tag_path else {
        print!("{}", dedent(&tokio::fs::read_to_string(file).await?));
        return Ok(());
    };

    let tree = ctx.parse(file).await?;
    let node = tree.at(path).ok_or_else(|| {
        Error::Config(format!(
            "no symbol at '{path}' in {}. Run 'codetag tags {}' to list paths",
            file.display(),
            file.display()
        ))
    })?;

    let footer = ctx.settings.show_path_in_embed.then_some(node.tag_path());
    println!("{}", embed(node.content(), footer));
    Ok(())
}

/// Symbol content, followed by its tag path when one is given.
fn embed(content: &str, path: Option<&TagPath>) -> String {
    match path {
        Some(path) => format!("{content}\n\n{}", path.to_string().dimmed()),
        None => content.to_string(),
    }
}
