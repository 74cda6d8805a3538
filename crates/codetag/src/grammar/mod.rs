//! Grammar acquisition.
//!
//! This module handles:
//! - Locating grammar payloads for a distribution version ([`GrammarSource`])
//! - Downloading them with retry and cancellation ([`Fetcher`], [`retry`])
//! - Persisting them on disk ([`GrammarCache`])
//! - Turning them into grammars and parsers ([`GrammarRuntime`])
//! - Tying it together with an in-memory cache and in-flight registry
//!   ([`GrammarLoader`])

mod cache;
mod fetch;
mod loader;
pub mod retry;
mod runtime;
mod source;
#[cfg(feature = "wasm")]
mod wasm;

pub use cache::{CACHE_NAMESPACE, GrammarCache};
pub use fetch::{Fetcher, HttpFetcher};
pub use loader::{GrammarLoader, GrammarLoaderBuilder, PreloadProgress, PreloadReport};
pub use retry::RetryPolicy;
pub use runtime::{EngineCell, GrammarRuntime, Strategy};
pub use source::{DEFAULT_GRAMMAR_VERSION, DEFAULT_URL_TEMPLATE, GrammarSource};
#[cfg(feature = "wasm")]
pub use wasm::WasmRuntime;

use std::sync::Arc;

use tree_sitter::{Language, Parser, Query};

use crate::error::{Error, Result};
use crate::languages::LanguageSpec;

/// A loaded grammar together with its tags query.
///
/// Cheap to clone. Each call to [`parser`](Self::parser) or
/// [`tags_query`](Self::tags_query) builds a fresh object, so concurrent
/// parses never share one.
#[derive(Clone)]
pub struct GrammarHandle {
    spec: &'static LanguageSpec,
    language: Language,
    runtime: Arc<dyn GrammarRuntime>,
}

impl std::fmt::Debug for GrammarHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarHandle")
            .field("name", &self.spec.name)
            .field("taggable", &self.spec.is_taggable())
            .finish_non_exhaustive()
    }
}

impl GrammarHandle {
    pub(crate) fn new(
        spec: &'static LanguageSpec,
        language: Language,
        runtime: Arc<dyn GrammarRuntime>,
    ) -> Self {
        Self {
            spec,
            language,
            runtime,
        }
    }

    /// Grammar id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Registry entry for this grammar.
    #[must_use]
    pub fn spec(&self) -> &'static LanguageSpec {
        self.spec
    }

    /// The loaded grammar.
    #[must_use]
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Source text of the tags query, `None` for parse-only languages.
    #[must_use]
    pub fn query_source(&self) -> Option<&'static str> {
        self.spec.tags_query
    }

    /// A fresh parser for this grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot attach the grammar.
    pub fn parser(&self) -> Result<Parser> {
        self.runtime.new_parser(&self.language)
    }

    /// Compile the tags query against this grammar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the bundled query does not match the
    /// grammar's node types.
    pub fn tags_query(&self) -> Result<Option<Query>> {
        let Some(source) = self.spec.tags_query else {
            return Ok(None);
        };
        Query::new(&self.language, source)
            .map(Some)
            .map_err(|e| Error::Query {
                lang: self.spec.name.to_string(),
                message: e.to_string(),
            })
    }
}
