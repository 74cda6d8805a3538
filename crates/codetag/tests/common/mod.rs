//! Common test utilities shared across integration tests.
//!
//! `StaticRuntime` stands in for the WASM engine with grammars linked into
//! the test binary, and `MockFetcher` serves payloads without a network.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use codetag::grammar::{Fetcher, GrammarCache, RetryPolicy};
use codetag::{AcquireError, GrammarLoader, GrammarRuntime};
use parking_lot::Mutex;
use tree_sitter::{Language, Parser};

/// Payload the mock fetcher serves for `lang`.
pub fn payload(lang: &str) -> Vec<u8> {
    format!("grammar:{lang}").into_bytes()
}

/// Extract `lang` from a `.../tree-sitter-{lang}.wasm` URL.
fn lang_from_url(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .and_then(|file| file.strip_prefix("tree-sitter-"))
        .and_then(|file| file.strip_suffix(".wasm"))
        .unwrap_or(url)
}

/// Grammar runtime backed by statically linked grammars.
///
/// Accepts only payloads produced by [`payload`].
pub struct StaticRuntime {
    ready: AtomicBool,
    fail_bootstrap: bool,
}

impl StaticRuntime {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            fail_bootstrap: false,
        }
    }

    /// A runtime whose engine never starts.
    pub fn broken() -> Self {
        Self {
            ready: AtomicBool::new(false),
            fail_bootstrap: true,
        }
    }

    fn grammar(lang: &str) -> Option<Language> {
        let language = match lang {
            "python" => tree_sitter_python::LANGUAGE.into(),
            "rust" => tree_sitter_rust::LANGUAGE.into(),
            "javascript" => tree_sitter_javascript::LANGUAGE.into(),
            "typescript" => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            "tsx" => tree_sitter_typescript::LANGUAGE_TSX.into(),
            "c" => tree_sitter_c::LANGUAGE.into(),
            "cpp" => tree_sitter_cpp::LANGUAGE.into(),
            "go" => tree_sitter_go::LANGUAGE.into(),
            _ => return None,
        };
        Some(language)
    }
}

#[async_trait]
impl GrammarRuntime for StaticRuntime {
    async fn bootstrap(&self) -> Result<(), AcquireError> {
        if self.fail_bootstrap {
            return Err(AcquireError::EngineInit("no engine in this test".to_string()));
        }
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn load_grammar(&self, lang: &str, bytes: &[u8]) -> Result<Language, AcquireError> {
        if bytes != payload(lang).as_slice() {
            return Err(AcquireError::invalid_grammar(lang, "unexpected payload"));
        }
        Self::grammar(lang)
            .ok_or_else(|| AcquireError::invalid_grammar(lang, "not linked into tests"))
    }

    fn new_parser(&self, language: &Language) -> codetag::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(parser)
    }
}

/// Fetcher that counts calls, optionally sleeps, and can fail on demand.
pub struct MockFetcher {
    calls: AtomicUsize,
    delay: Duration,
    failures_left: AtomicUsize,
    garbage: bool,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            failures_left: AtomicUsize::new(0),
            garbage: false,
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `n` calls with a network error.
    pub fn failing(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Answer with bytes no runtime accepts.
    pub fn serving_garbage(mut self) -> Self {
        self.garbage = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AcquireError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(AcquireError::network(url, "connection reset"));
        }

        if self.garbage {
            return Ok(b"<html>not found</html>".to_vec());
        }
        Ok(payload(lang_from_url(url)))
    }
}

/// A loader over the static runtime and `fetcher`, with an optional disk cache.
pub fn loader(fetcher: &Arc<MockFetcher>, cache_dir: Option<&Path>) -> GrammarLoader {
    loader_with_runtime(fetcher, cache_dir, Arc::new(StaticRuntime::new()))
}

pub fn loader_with_runtime(
    fetcher: &Arc<MockFetcher>,
    cache_dir: Option<&Path>,
    runtime: Arc<dyn GrammarRuntime>,
) -> GrammarLoader {
    let mut builder = GrammarLoader::builder(runtime)
        .fetcher(Arc::clone(fetcher) as Arc<dyn Fetcher>)
        .retry_policy(RetryPolicy::default());
    if let Some(dir) = cache_dir {
        builder = builder.cache(GrammarCache::new(dir));
    }
    builder.build()
}
