//! The grammar engine seam.
//!
//! A [`GrammarRuntime`] turns downloaded payload bytes into a
//! [`tree_sitter::Language`] and builds parsers able to use it. The runtime
//! owns a one-time engine bootstrap that must succeed before either is
//! possible.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tree_sitter::{Language, Parser};

use super::retry::{RetryError, RetryPolicy, with_retry};
use crate::error::{AcquireError, Result};

/// Capability to construct grammars and parsers.
#[async_trait]
pub trait GrammarRuntime: Send + Sync {
    /// Initialize the engine. Idempotent: calls after a success are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::EngineInit`] once every strategy is exhausted.
    async fn bootstrap(&self) -> std::result::Result<(), AcquireError>;

    /// Whether [`bootstrap`](Self::bootstrap) has succeeded.
    fn is_ready(&self) -> bool;

    /// Build a grammar from a payload.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::InvalidGrammar`] if `bytes` is not a grammar
    /// for `lang`, or [`AcquireError::EngineInit`] before bootstrap.
    fn load_grammar(&self, lang: &str, bytes: &[u8]) -> std::result::Result<Language, AcquireError>;

    /// A fresh parser with `language` set.
    ///
    /// # Errors
    ///
    /// Returns an error if the language cannot be attached to a parser.
    fn new_parser(&self, language: &Language) -> Result<Parser>;
}

/// A named way of creating the engine.
pub struct Strategy<T> {
    name: &'static str,
    create: Box<dyn Fn() -> std::result::Result<T, String> + Send + Sync>,
}

impl<T> Strategy<T> {
    /// Wrap a constructor.
    pub fn new(
        name: &'static str,
        create: impl Fn() -> std::result::Result<T, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            create: Box::new(create),
        }
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A memoized engine with ordered fallback strategies.
///
/// Each strategy is retried under the policy before the next one is tried.
/// A failed bootstrap leaves the cell empty, so a later call starts over.
#[derive(Debug)]
pub struct EngineCell<T> {
    engine: OnceCell<T>,
    strategies: Vec<Strategy<T>>,
    policy: RetryPolicy,
}

impl<T> EngineCell<T> {
    /// Create an empty cell.
    #[must_use]
    pub fn new(strategies: Vec<Strategy<T>>, policy: RetryPolicy) -> Self {
        Self {
            engine: OnceCell::new(),
            strategies,
            policy,
        }
    }

    /// The engine, if bootstrapped.
    pub fn get(&self) -> Option<&T> {
        self.engine.get()
    }

    /// Bootstrap the engine, or return the existing one.
    ///
    /// Concurrent callers share one initialization.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::EngineInit`] listing every strategy's failure.
    pub async fn get_or_init(&self) -> std::result::Result<&T, AcquireError> {
        self.engine.get_or_try_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> std::result::Result<T, AcquireError> {
        let never = CancellationToken::new();
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let attempt = with_retry(
                self.policy,
                &never,
                |_: &String| true,
                || std::future::ready((strategy.create)()),
            )
            .await;

            match attempt {
                Ok(engine) => {
                    info!(strategy = strategy.name, "Grammar engine ready");
                    return Ok(engine);
                }
                Err(RetryError::Failed(e)) => {
                    warn!(strategy = strategy.name, error = %e, "Engine strategy exhausted");
                    failures.push(format!("{}: {e}", strategy.name));
                }
                Err(RetryError::Aborted) => failures.push(format!("{}: aborted", strategy.name)),
            }
        }

        if failures.is_empty() {
            failures.push("no engine strategy configured".to_string());
        }
        Err(AcquireError::EngineInit(failures.join("; ")))
    }
}
