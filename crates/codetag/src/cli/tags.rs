//! `codetag tags` command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use codetag::{Error, Result, SymbolNode, TagTree};

use super::Context;
use super::display::print_tree;

/// JSON shape of one symbol.
#[derive(Serialize)]
struct JsonNode {
    name: String,
    tag: String,
    path: String,
    start_line: usize,
    end_line: usize,
    children: Vec<JsonNode>,
}

impl JsonNode {
    fn from_node(tree: &TagTree, node: &SymbolNode) -> Self {
        Self {
            name: node.name().to_string(),
            tag: node.tag().to_string(),
            path: node.tag_path().to_string(),
            start_line: node.start_line() + 1,
            end_line: node.end_line() + 1,
            children: tree
                .children(node)
                .into_iter()
                .map(|child| Self::from_node(tree, child))
                .collect(),
        }
    }
}

/// Run the tags command.
pub async fn run(ctx: &Context, file: &Path, json: bool) -> Result<()> {
    let tree = ctx.parse(file).await?;

    if json {
        let nodes: Vec<JsonNode> = tree
            .nodes()
            .into_iter()
            .map(|node| JsonNode::from_node(&tree, node))
            .collect();
        let out = serde_json::to_string_pretty(&nodes)
            .map_err(|e| Error::Config(format!("JSON error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if tree.is_empty() {
        println!("No symbols found in {}", file.display());
        return Ok(());
    }

    println!(
        "{} symbols in {}:",
        tree.len().to_string().green().bold(),
        file.display().to_string().cyan()
    );
    println!();
    print_tree(&tree);

    Ok(())
}
