//! Grammar runtime backed by tree-sitter's WASM store.

use async_trait::async_trait;
use tree_sitter::wasmtime::{Config, Engine, OptLevel};
use tree_sitter::{Language, Parser, WasmStore};

use super::retry::RetryPolicy;
use super::runtime::{EngineCell, GrammarRuntime, Strategy};
use crate::error::{AcquireError, Result};

/// Loads `tree-sitter-{lang}.wasm` payloads into a shared wasmtime engine.
///
/// The engine is created on [`bootstrap`](GrammarRuntime::bootstrap): an
/// optimizing configuration first, then an unoptimized one. Stores are not
/// `Send`, so every grammar load and every parser gets its own store on that
/// engine.
pub struct WasmRuntime {
    engine: EngineCell<Engine>,
}

impl Default for WasmRuntime {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl std::fmt::Debug for WasmRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmRuntime")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl WasmRuntime {
    /// Create a runtime whose bootstrap retries under `policy`.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        let strategies = vec![
            Strategy::new("optimized", || engine_with(OptLevel::Speed)),
            Strategy::new("baseline", || engine_with(OptLevel::None)),
        ];
        Self {
            engine: EngineCell::new(strategies, policy),
        }
    }

    fn engine(&self) -> std::result::Result<&Engine, AcquireError> {
        self.engine.get().ok_or_else(|| {
            AcquireError::EngineInit("grammar engine is not bootstrapped".to_string())
        })
    }

    fn store(&self) -> std::result::Result<WasmStore, AcquireError> {
        WasmStore::new(self.engine()?).map_err(|e| AcquireError::EngineInit(e.to_string()))
    }
}

fn engine_with(level: OptLevel) -> std::result::Result<Engine, String> {
    let mut config = Config::new();
    config.cranelift_opt_level(level);
    Engine::new(&config).map_err(|e| e.to_string())
}

#[async_trait]
impl GrammarRuntime for WasmRuntime {
    async fn bootstrap(&self) -> std::result::Result<(), AcquireError> {
        self.engine.get_or_init().await.map(|_| ())
    }

    fn is_ready(&self) -> bool {
        self.engine.get().is_some()
    }

    fn load_grammar(
        &self,
        lang: &str,
        bytes: &[u8],
    ) -> std::result::Result<Language, AcquireError> {
        let mut store = self.store()?;
        store
            .load_language(lang, bytes)
            .map_err(|e| AcquireError::invalid_grammar(lang, e.to_string()))
    }

    fn new_parser(&self, language: &Language) -> Result<Parser> {
        let store = self.store()?;

        let mut parser = Parser::new();
        parser.set_wasm_store(store)?;
        parser.set_language(language)?;
        Ok(parser)
    }
}
