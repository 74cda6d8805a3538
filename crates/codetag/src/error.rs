//! Error types for codetag operations.
//!
//! Errors are split into two layers:
//!
//! - **`AcquireError`**: failures while obtaining a grammar (download, cache,
//!   engine bootstrap). Each variant carries its own retry semantics.
//! - **`Error`**: the top-level error returned by parsing and configuration
//!   entry points. It wraps `AcquireError` so acquisition failures propagate
//!   to the caller of [`CodeFileParser::parse`](crate::CodeFileParser::parse)
//!   unchanged.
//!
//! ## What is *not* an error
//!
//! A file whose extension maps to no known language, or a parse requested
//! before the grammar engine is ready, is a legitimate "nothing to do"
//! outcome and is reported as `Ok(None)`. Failing to persist a downloaded
//! grammar is logged and swallowed: the grammar is still usable in memory.

use thiserror::Error;

/// Result type for codetag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for codetag operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Obtaining the grammar for a language failed
    #[error(transparent)]
    Acquire(#[from] AcquireError),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A grammar could not be attached to a parser
    #[error("language error: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The symbol capture query did not compile against its grammar
    #[error("invalid tags query for {lang}: {message}")]
    Query {
        /// Language whose query failed
        lang: String,
        /// Compiler message from tree-sitter
        message: String,
    },

    /// Tree-sitter parsing infrastructure failed
    #[error("parser error: {0}")]
    Parser(String),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure while acquiring a grammar.
///
/// Only [`AcquireError::Network`] is transient. Everything else either
/// reflects a caller mistake, a deliberate cancellation, or a payload that
/// would fail the same way on every attempt.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The language is not in the registry
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Another load of the same language is still running
    #[error("acquisition of {0} is already in progress")]
    InProgress(String),

    /// The load was cancelled through `abort`/`unload`
    #[error("acquisition of {0} was aborted")]
    Aborted(String),

    /// Downloading the grammar payload failed
    #[error("failed to fetch {url}: {message}")]
    Network {
        /// Location that was requested
        url: String,
        /// Transport or status description
        message: String,
    },

    /// The grammar engine could not be initialized; nothing can be parsed
    #[error("grammar engine failed to initialize: {0}")]
    EngineInit(String),

    /// The payload was fetched but is not a loadable grammar
    #[error("invalid grammar payload for {lang}: {message}")]
    InvalidGrammar {
        /// Language whose payload was rejected
        lang: String,
        /// Loader message
        message: String,
    },

    /// Reading a cached payload from disk failed
    #[error("grammar cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    /// Returns `true` if retrying the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns `true` for cancellation, which callers usually keep quiet about.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Create a network error for a location.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-payload error for a language.
    #[must_use]
    pub fn invalid_grammar(lang: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGrammar {
            lang: lang.into(),
            message: message.into(),
        }
    }
}
