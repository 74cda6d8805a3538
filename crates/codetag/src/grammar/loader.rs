//! The acquisition service.
//!
//! [`GrammarLoader`] maps a language id to a ready [`GrammarHandle`]:
//!
//! 1. Unknown ids fail fast with [`AcquireError::UnsupportedLanguage`].
//! 2. The runtime is bootstrapped (memoized).
//! 3. In one lock section: a loaded grammar is returned, a load already in
//!    flight rejects this one with [`AcquireError::InProgress`], otherwise
//!    this load registers itself with a fresh cancellation token.
//! 4. The payload is read from disk, or downloaded under the retry policy
//!    and persisted. A failed write is logged and the language skips
//!    persistence from then on.
//! 5. The runtime builds the grammar; the handle is cached unless the load
//!    was aborted meanwhile.
//!
//! The lock is never held across an `.await`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::GrammarHandle;
use super::cache::GrammarCache;
use super::fetch::{Fetcher, HttpFetcher};
use super::retry::{RetryError, RetryPolicy, with_retry};
use super::runtime::GrammarRuntime;
use super::source::GrammarSource;
use crate::error::AcquireError;
use crate::languages::{self, LanguageSpec};

type AcquireResult<T> = std::result::Result<T, AcquireError>;

/// A load that has registered itself and may be cancelled.
struct Flight {
    id: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct LoaderState {
    loaded: HashMap<String, GrammarHandle>,
    in_flight: HashMap<String, Flight>,
    skip_persist: HashSet<String>,
    next_flight: u64,
}

/// Progress of a [`GrammarLoader::preload`] batch, reported after each language.
#[derive(Debug)]
pub struct PreloadProgress<'a> {
    /// Languages finished so far, this one included.
    pub completed: usize,
    /// Size of the batch.
    pub total: usize,
    /// The language just attempted.
    pub lang: &'a str,
    /// How it went.
    pub outcome: Result<(), &'a AcquireError>,
}

/// Result of a [`GrammarLoader::preload`] batch.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// Languages that are now loaded.
    pub loaded: Vec<String>,
    /// Languages that failed, with the reason.
    pub failed: Vec<(String, AcquireError)>,
}

impl PreloadReport {
    /// Whether every language loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Acquires grammars on demand and keeps them in memory.
pub struct GrammarLoader {
    source: GrammarSource,
    fetcher: Arc<dyn Fetcher>,
    runtime: Arc<dyn GrammarRuntime>,
    cache: Option<GrammarCache>,
    policy: RetryPolicy,
    state: Mutex<LoaderState>,
}

impl std::fmt::Debug for GrammarLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarLoader")
            .field("source", &self.source)
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`GrammarLoader`].
pub struct GrammarLoaderBuilder {
    source: GrammarSource,
    fetcher: Option<Arc<dyn Fetcher>>,
    runtime: Arc<dyn GrammarRuntime>,
    cache: Option<GrammarCache>,
    policy: RetryPolicy,
}

impl GrammarLoaderBuilder {
    /// Use a different distribution.
    #[must_use]
    pub fn source(mut self, source: GrammarSource) -> Self {
        self.source = source;
        self
    }

    /// Use a different transport. Defaults to [`HttpFetcher`].
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Persist payloads in `cache`. Without one, every process downloads.
    #[must_use]
    pub fn cache(mut self, cache: GrammarCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Retry policy for downloads.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> GrammarLoader {
        GrammarLoader {
            source: self.source,
            fetcher: self
                .fetcher
                .unwrap_or_else(|| Arc::new(HttpFetcher::new())),
            runtime: self.runtime,
            cache: self.cache,
            policy: self.policy,
            state: Mutex::new(LoaderState::default()),
        }
    }
}

/// Clears this load's in-flight entry on every exit path.
struct FlightGuard<'a> {
    state: &'a Mutex<LoaderState>,
    lang: &'a str,
    id: u64,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.in_flight.get(self.lang).is_some_and(|f| f.id == self.id) {
            state.in_flight.remove(self.lang);
        }
    }
}

/// Where a payload came from.
enum Payload {
    Disk(Vec<u8>),
    Network(Vec<u8>),
}

impl GrammarLoader {
    /// Start building a loader around `runtime`.
    pub fn builder(runtime: Arc<dyn GrammarRuntime>) -> GrammarLoaderBuilder {
        GrammarLoaderBuilder {
            source: GrammarSource::default(),
            fetcher: None,
            runtime,
            cache: None,
            policy: RetryPolicy::default(),
        }
    }

    /// Whether a grammar for `lang` is loaded in memory.
    #[must_use]
    pub fn has(&self, lang: &str) -> bool {
        self.state.lock().loaded.contains_key(lang)
    }

    /// Whether a load of `lang` is in flight.
    #[must_use]
    pub fn is_acquiring(&self, lang: &str) -> bool {
        self.state.lock().in_flight.contains_key(lang)
    }

    /// Ids of every loaded grammar, sorted.
    #[must_use]
    pub fn loaded(&self) -> Vec<String> {
        let mut names: Vec<_> = self.state.lock().loaded.keys().cloned().collect();
        names.sort();
        names
    }

    /// The on-disk cache, if configured.
    #[must_use]
    pub fn cache(&self) -> Option<&GrammarCache> {
        self.cache.as_ref()
    }

    /// The distribution payloads are downloaded from.
    #[must_use]
    pub fn source(&self) -> &GrammarSource {
        &self.source
    }

    /// Whether the payload for `lang` has been persisted.
    pub async fn is_cached_on_disk(&self, lang: &str) -> bool {
        match &self.cache {
            Some(cache) => cache.exists(lang).await,
            None => false,
        }
    }

    /// Initialize the grammar engine. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::EngineInit`] if every engine strategy fails.
    pub async fn bootstrap(&self) -> AcquireResult<()> {
        self.runtime.bootstrap().await
    }

    /// Whether the grammar engine is initialized.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.runtime.is_ready()
    }

    /// Load the grammar for `lang`, acquiring it if needed.
    ///
    /// # Errors
    ///
    /// - [`AcquireError::UnsupportedLanguage`] for ids not in the registry
    /// - [`AcquireError::InProgress`] if another load of `lang` is running
    /// - [`AcquireError::Aborted`] if [`abort`](Self::abort) was called meanwhile
    /// - [`AcquireError::Network`] once the retry budget is spent
    /// - [`AcquireError::EngineInit`] or [`AcquireError::InvalidGrammar`] from
    ///   the runtime
    pub async fn load(&self, lang: &str) -> AcquireResult<GrammarHandle> {
        let spec = languages::lookup(lang)
            .ok_or_else(|| AcquireError::UnsupportedLanguage(lang.to_string()))?;

        if let Some(handle) = self.cached(lang) {
            return Ok(handle);
        }

        self.runtime.bootstrap().await?;

        let flight = match self.begin(lang)? {
            Begin::Loaded(handle) => return Ok(handle),
            Begin::Started(flight) => flight,
        };
        let _guard = FlightGuard {
            state: &self.state,
            lang,
            id: flight.id,
        };

        self.acquire(spec, &flight.cancel).await
    }

    /// Cancel any in-flight load of `lang` and evict it from memory.
    ///
    /// Returns `true` if there was anything to cancel or evict.
    pub fn abort(&self, lang: &str) -> bool {
        let mut state = self.state.lock();
        let flight = state.in_flight.remove(lang);
        if let Some(flight) = &flight {
            flight.cancel.cancel();
        }
        let evicted = state.loaded.remove(lang).is_some();

        if flight.is_some() || evicted {
            debug!(lang, aborted = flight.is_some(), evicted, "Grammar unloaded");
            true
        } else {
            false
        }
    }

    /// Same as [`abort`](Self::abort).
    pub fn unload(&self, lang: &str) -> bool {
        self.abort(lang)
    }

    /// Load each language in turn, reporting progress after each.
    ///
    /// Failures are logged and recorded; they never stop the batch.
    pub async fn preload<S, F>(&self, langs: &[S], mut observer: F) -> PreloadReport
    where
        S: AsRef<str>,
        F: FnMut(PreloadProgress<'_>),
    {
        let total = langs.len();
        let mut report = PreloadReport::default();

        for (i, lang) in langs.iter().enumerate() {
            let lang = lang.as_ref();
            match self.load(lang).await {
                Ok(_) => {
                    observer(PreloadProgress {
                        completed: i + 1,
                        total,
                        lang,
                        outcome: Ok(()),
                    });
                    report.loaded.push(lang.to_string());
                }
                Err(e) => {
                    warn!(lang, error = %e, "Failed to preload grammar");
                    observer(PreloadProgress {
                        completed: i + 1,
                        total,
                        lang,
                        outcome: Err(&e),
                    });
                    report.failed.push((lang.to_string(), e));
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Preload finished"
        );
        report
    }

    fn cached(&self, lang: &str) -> Option<GrammarHandle> {
        self.state.lock().loaded.get(lang).cloned()
    }

    /// Check-then-register in a single critical section.
    fn begin(&self, lang: &str) -> AcquireResult<Begin> {
        let mut state = self.state.lock();

        if let Some(handle) = state.loaded.get(lang) {
            return Ok(Begin::Loaded(handle.clone()));
        }
        if state.in_flight.contains_key(lang) {
            debug!(lang, "Rejecting duplicate load");
            return Err(AcquireError::InProgress(lang.to_string()));
        }

        state.next_flight += 1;
        let id = state.next_flight;
        let cancel = CancellationToken::new();
        state.in_flight.insert(
            lang.to_string(),
            Flight {
                id,
                cancel: cancel.clone(),
            },
        );
        Ok(Begin::Started(Flight { id, cancel }))
    }

    async fn acquire(
        &self,
        spec: &'static LanguageSpec,
        cancel: &CancellationToken,
    ) -> AcquireResult<GrammarHandle> {
        let lang = spec.name;
        let aborted = || AcquireError::Aborted(lang.to_string());

        let bytes = match self.payload(lang, cancel).await? {
            Payload::Disk(bytes) => bytes,
            Payload::Network(bytes) => {
                self.persist(lang, &bytes).await;
                bytes
            }
        };

        if cancel.is_cancelled() {
            return Err(aborted());
        }

        let language = self.runtime.load_grammar(lang, &bytes)?;
        let handle = GrammarHandle::new(spec, language, Arc::clone(&self.runtime));

        let mut state = self.state.lock();
        if cancel.is_cancelled() {
            return Err(aborted());
        }
        state.loaded.insert(lang.to_string(), handle.clone());
        drop(state);

        info!(lang, "Grammar loaded");
        Ok(handle)
    }

    async fn payload(&self, lang: &str, cancel: &CancellationToken) -> AcquireResult<Payload> {
        if let Some(cache) = &self.cache
            && cache.exists(lang).await
        {
            match cache.read(lang).await {
                Ok(bytes) => {
                    debug!(lang, path = %cache.path(lang).display(), "Grammar cache hit");
                    return Ok(Payload::Disk(bytes));
                }
                Err(e) => warn!(lang, error = %e, "Unreadable cached grammar, downloading again"),
            }
        }

        let url = self.source.location(lang);
        info!(lang, url = %url, "Downloading grammar");

        let fetcher = &self.fetcher;
        let url = url.as_str();
        match with_retry(self.policy, cancel, AcquireError::is_retryable, move || {
            fetcher.fetch(url)
        })
        .await
        {
            Ok(bytes) => Ok(Payload::Network(bytes)),
            Err(RetryError::Aborted) => Err(AcquireError::Aborted(lang.to_string())),
            Err(RetryError::Failed(e)) => Err(e),
        }
    }

    async fn persist(&self, lang: &str, bytes: &[u8]) {
        let Some(cache) = &self.cache else {
            return;
        };
        if self.state.lock().skip_persist.contains(lang) {
            debug!(lang, "Skipping grammar persistence");
            return;
        }

        if let Err(e) = cache.write(lang, bytes).await {
            warn!(
                lang,
                path = %cache.path(lang).display(),
                error = %e,
                "Failed to persist grammar, keeping it in memory only"
            );
            self.state.lock().skip_persist.insert(lang.to_string());
        }
    }
}

enum Begin {
    Loaded(GrammarHandle),
    Started(Flight),
}
