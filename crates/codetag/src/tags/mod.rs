//! Symbol trees ("tag trees") built from tree-sitter query captures.
//!
//! This module handles:
//! - Running a language's tags query over a syntax tree ([`match_tags`])
//! - Rebuilding the containment hierarchy among matched symbols ([`TagTree`])
//! - Addressing symbols by hierarchical path ([`TagPath`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use codetag::tags::{TagPath, TagTree, match_tags};
//!
//! # fn demo(language: &tree_sitter::Language) -> Result<(), Box<dyn std::error::Error>> {
//! let source = "class Greeter:\n    def hello(self):\n        pass\n";
//! let mut parser = tree_sitter::Parser::new();
//! parser.set_language(language)?;
//! let tree = parser.parse(source, None).ok_or("parse failed")?;
//! let query = tree_sitter::Query::new(language, "(function_definition name: (identifier) @name) @def")?;
//!
//! let matches = match_tags(&query, tree.root_node(), source.as_bytes());
//! let tags = TagTree::build(&tree, matches, Arc::from(source));
//! let hello = tags.at(&TagPath::from("hello"));
//! # Ok(())
//! # }
//! ```

mod matcher;
mod node;
mod path;
mod tree;

pub use matcher::{TagMatch, match_tags};
pub use node::{NodeId, SourceSpan, SymbolNode, sanitize_tag};
pub use path::TagPath;
pub use tree::TagTree;

use std::sync::Arc;

use tree_sitter::{Parser, Query};

use crate::error::{Error, Result};

/// Parse `source` and build its tag tree in one step.
///
/// With no query (parse-only languages) the tree is parsed anyway and an
/// empty tag tree is returned.
///
/// # Errors
///
/// Returns [`Error::Parser`] if tree-sitter produces no tree, which happens
/// when the parser has no language set or parsing was cancelled.
pub fn build_tag_tree(
    parser: &mut Parser,
    query: Option<&Query>,
    source: impl Into<Arc<str>>,
) -> Result<TagTree> {
    let source: Arc<str> = source.into();
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| Error::Parser("tree-sitter returned no tree".to_string()))?;

    let Some(query) = query else {
        return Ok(TagTree::empty(&tree, source));
    };

    let matches = match_tags(query, tree.root_node(), source.as_bytes());
    Ok(TagTree::build(&tree, matches, source))
}
