//! Common display utilities for CLI commands.

use colored::Colorize;

use codetag::{SymbolNode, TagTree};

/// `12-18` style 1-based line range.
pub fn line_range(node: &SymbolNode) -> String {
    let (start, end) = (node.start_line() + 1, node.end_line() + 1);
    if start == end {
        start.to_string()
    } else {
        format!("{start}-{end}")
    }
}

/// Print `tree` as an indented outline, children under their parents.
pub fn print_tree(tree: &TagTree) {
    for node in tree.nodes() {
        print_node(tree, node, 0);
    }
}

fn print_node(tree: &TagTree, node: &SymbolNode, depth: usize) {
    println!(
        "{}{} {} {}",
        "  ".repeat(depth),
        node.name().white().bold(),
        format!("[{}]", line_range(node)).dimmed(),
        node.tag_path().to_string().cyan()
    );
    for child in tree.children(node) {
        print_node(tree, child, depth + 1);
    }
}
