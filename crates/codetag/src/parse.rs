//! File parse orchestration: path in, tag tree out.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Result;
use crate::grammar::{GrammarHandle, GrammarLoader};
use crate::languages;
use crate::tags::{TagTree, build_tag_tree};

/// Parses files into [`TagTree`]s, acquiring grammars as needed.
///
/// Nothing is cached between calls: every call reads and parses the file
/// again.
#[derive(Debug, Clone)]
pub struct CodeFileParser {
    loader: Arc<GrammarLoader>,
}

impl CodeFileParser {
    /// Create a parser over a shared loader.
    #[must_use]
    pub fn new(loader: Arc<GrammarLoader>) -> Self {
        Self { loader }
    }

    /// The loader grammars come from.
    #[must_use]
    pub fn loader(&self) -> &Arc<GrammarLoader> {
        &self.loader
    }

    /// Parse the file at `path`.
    ///
    /// Returns `Ok(None)` when the extension maps to no language or the
    /// grammar engine has not been bootstrapped yet. Parse-only languages
    /// yield a tree with no symbols.
    ///
    /// # Errors
    ///
    /// Acquisition failures propagate, as do read errors and query errors.
    pub async fn parse(&self, path: &Path) -> Result<Option<TagTree>> {
        let Some(spec) = languages::for_path(path) else {
            trace!(path = %path.display(), "No language for file");
            return Ok(None);
        };
        if !self.loader.is_ready() {
            debug!(path = %path.display(), "Grammar engine not ready, skipping parse");
            return Ok(None);
        }

        let handle = self.loader.load(spec.name).await?;
        let source = tokio::fs::read_to_string(path).await?;

        let tree = parse_source(&handle, source)?;
        debug!(
            path = %path.display(),
            lang = spec.name,
            symbols = tree.len(),
            "Parsed file"
        );
        Ok(Some(tree))
    }
}

/// Parse `source` with a loaded grammar.
///
/// # Errors
///
/// Returns an error if a parser cannot be built, the tags query does not
/// compile, or tree-sitter produces no tree.
pub fn parse_source(handle: &GrammarHandle, source: impl Into<Arc<str>>) -> Result<TagTree> {
    let mut parser = handle.parser()?;
    let query = handle.tags_query()?;
    build_tag_tree(&mut parser, query.as_ref(), source)
}
