//! On-disk grammar payload cache.
//!
//! One file per language, `tree-sitter-{lang}.wasm`, directly under the cache
//! directory. The presence of that file is the only record that a payload
//! was persisted.
//!
//! Writes go to `{file}.tmp` first and are then renamed over the target, so
//! a crash mid-write never leaves a truncated payload under the real name.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Directory name under the platform cache root.
pub const CACHE_NAMESPACE: &str = "codetag";

/// Per-language payload cache in a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarCache {
    dir: PathBuf,
}

impl GrammarCache {
    /// Use `dir` as the cache directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{platform cache dir}/codetag/langs`, if the platform has one.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join(CACHE_NAMESPACE).join("langs"))
    }

    /// The cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the payload for `lang` lives.
    #[must_use]
    pub fn path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("tree-sitter-{lang}.wasm"))
    }

    /// Whether a payload for `lang` has been persisted.
    pub async fn exists(&self, lang: &str) -> bool {
        tokio::fs::try_exists(self.path(lang)).await.unwrap_or(false)
    }

    /// Read the persisted payload for `lang`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, including `NotFound`.
    pub async fn read(&self, lang: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.path(lang)).await
    }

    /// Atomically persist `bytes` as the payload for `lang`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created, the temporary
    /// file cannot be written, or the rename fails. The previous payload, if
    /// any, is left intact in every case.
    pub async fn write(&self, lang: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path(lang);
        let temp_path = temp_path(&path);

        if let Err(e) = write_temp(&temp_path, bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
        Ok(())
    }

    /// Delete the persisted payload for `lang`. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than `NotFound`.
    pub async fn remove(&self, lang: &str) -> std::io::Result<()> {
        match tokio::fs::remove_file(self.path(lang)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_temp(temp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}
