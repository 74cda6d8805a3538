//! CLI command implementations.

mod display;

pub mod fetch;
pub mod langs;
pub mod show;
pub mod suggest;
pub mod tags;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use codetag::{CodeFileParser, Error, GrammarLoader, Result, Settings, TagTree, WasmRuntime};

/// Settings shared by every command.
pub struct Context {
    pub settings: Settings,
}

impl Context {
    /// Load settings from `path`, or the default location.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let settings = match path.or_else(Settings::default_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading settings");
                Settings::load_or_default(&path).await?
            }
            None => Settings::default(),
        };
        Ok(Self { settings })
    }

    /// A bootstrapped grammar loader.
    pub async fn loader(&self) -> Result<Arc<GrammarLoader>> {
        let runtime = Arc::new(WasmRuntime::new(self.settings.retry_policy()));
        let loader = Arc::new(self.settings.grammar_loader(runtime)?);
        loader.bootstrap().await?;
        Ok(loader)
    }

    /// Parse `file`, failing if its extension has no grammar.
    pub async fn parse(&self, file: &Path) -> Result<TagTree> {
        let parser = CodeFileParser::new(self.loader().await?);
        parser.parse(file).await?.ok_or_else(|| {
            Error::Config(format!(
                "no grammar for '{}'. Run 'codetag langs' to list supported extensions",
                file.display()
            ))
        })
    }
}
