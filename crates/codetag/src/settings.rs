//! User settings.
//!
//! Settings are a plain struct read from and written to YAML. Nothing is
//! persisted implicitly: callers that change a field call [`Settings::save`]
//! themselves.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};
use crate::grammar::{
    CACHE_NAMESPACE, DEFAULT_GRAMMAR_VERSION, DEFAULT_URL_TEMPLATE, GrammarCache, GrammarLoader,
    GrammarRuntime, GrammarSource, RetryPolicy,
};

/// Name of the settings file inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Settings controlling search, display and grammar acquisition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Offer tag suggestions while typing a code link
    pub enable_tag_search: bool,

    /// Render the tag path under an embedded symbol
    pub show_path_in_embed: bool,

    /// Languages to download at startup
    pub pre_download_langs: Vec<String>,

    /// Grammar distribution version
    pub grammar_version: String,

    /// Payload URL with `{version}` and `{lang}` placeholders
    pub grammar_url_template: String,

    /// Overrides the platform cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Download retries after the first attempt
    pub retry_attempts: u32,

    /// Delay before the first retry, in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_tag_search: true,
            show_path_in_embed: true,
            pre_download_langs: Vec::new(),
            grammar_version: DEFAULT_GRAMMAR_VERSION.to_string(),
            grammar_url_template: DEFAULT_URL_TEMPLATE.to_string(),
            cache_dir: None,
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl Settings {
    /// `{platform config dir}/codetag/settings.yaml`, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CACHE_NAMESPACE).join(SETTINGS_FILE_NAME))
    }

    /// Load settings from a file.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or [`Error::Config`]
    /// if it is not valid settings YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let settings: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), except that a missing file is not an error.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path).await {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save settings to a file, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check field combinations that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a URL template without placeholders or an
    /// empty grammar version.
    pub fn validate(&self) -> Result<()> {
        if self.grammar_version.trim().is_empty() {
            return Err(Error::Config("grammar-version must not be empty".to_string()));
        }
        self.grammar_source().map(|_| ())
    }

    /// The configured grammar distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL template lacks a placeholder.
    pub fn grammar_source(&self) -> Result<GrammarSource> {
        GrammarSource::new(&self.grammar_url_template, &self.grammar_version)
    }

    /// Download retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    /// The grammar cache, honoring `cache-dir`.
    #[must_use]
    pub fn grammar_cache(&self) -> Option<GrammarCache> {
        self.cache_dir
            .clone()
            .or_else(GrammarCache::default_dir)
            .map(GrammarCache::new)
    }

    /// A loader wired to these settings over `runtime`, using HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the grammar source is invalid.
    pub fn grammar_loader(&self, runtime: Arc<dyn GrammarRuntime>) -> Result<GrammarLoader> {
        let mut builder = GrammarLoader::builder(runtime)
            .source(self.grammar_source()?)
            .retry_policy(self.retry_policy());
        if let Some(cache) = self.grammar_cache() {
            builder = builder.cache(cache);
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert!(settings.enable_tag_search);
        assert!(settings.show_path_in_embed);
        assert!(settings.pre_download_langs.is_empty());
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        settings.validate().unwrap();
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join(SETTINGS_FILE_NAME);

        let mut original = Settings::default();
        original.pre_download_langs = vec!["python".to_string(), "rust".to_string()];
        original.cache_dir = Some(temp_dir.path().join("cache"));
        original.save(&path).await.unwrap();

        let loaded = Settings::load(&path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_yaml_uses_kebab_case_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);

        Settings::default().save(&path).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();

        assert!(content.contains("enable-tag-search: true"));
        assert!(content.contains("retry-attempts: 3"));
        assert!(!content.contains("cache-dir"));
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);
        tokio::fs::write(&path, "enable-tag-search: false\n").await.unwrap();

        let settings = Settings::load(&path).await.unwrap();

        assert!(!settings.enable_tag_search);
        assert_eq!(settings.grammar_version, DEFAULT_GRAMMAR_VERSION);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::load_or_default(&temp_dir.path().join("absent.yaml"))
            .await
            .unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE_NAME);
        tokio::fs::write(&path, "retry-attempts: [not, a, number]\n")
            .await
            .unwrap();

        let result = Settings::load_or_default(&path).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_template_without_placeholders() {
        let settings = Settings {
            grammar_url_template: "https://example.com/grammar.wasm".to_string(),
            ..Settings::default()
        };

        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_cache_dir_override() {
        let settings = Settings {
            cache_dir: Some(PathBuf::from("/srv/grammars")),
            ..Settings::default()
        };

        let cache = settings.grammar_cache().unwrap();
        assert_eq!(cache.dir(), Path::new("/srv/grammars"));
    }
}
