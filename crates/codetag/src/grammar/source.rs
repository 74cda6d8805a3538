//! Where grammar payloads are published.

use crate::error::{Error, Result};

/// Distribution version used when none is configured.
pub const DEFAULT_GRAMMAR_VERSION: &str = "0.0.9";

/// CDN template for prebuilt WASM grammars.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://cdn.jsdelivr.net/npm/tree-sitter-wasm-prebuilt@{version}/wasm/tree-sitter-{lang}.wasm";

/// A versioned remote location for grammar payloads.
///
/// The template carries `{version}` and `{lang}` placeholders, substituted
/// per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSource {
    url_template: String,
    version: String,
}

impl Default for GrammarSource {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            version: DEFAULT_GRAMMAR_VERSION.to_string(),
        }
    }
}

impl GrammarSource {
    /// Create a source from a template and version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the template lacks `{version}` or `{lang}`.
    pub fn new(url_template: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let url_template = url_template.into();
        for placeholder in ["{version}", "{lang}"] {
            if !url_template.contains(placeholder) {
                return Err(Error::Config(format!(
                    "grammar URL template is missing {placeholder}: {url_template}"
                )));
            }
        }
        Ok(Self {
            url_template,
            version: version.into(),
        })
    }

    /// The distribution version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Remote location of the payload for `lang`.
    #[must_use]
    pub fn location(&self, lang: &str) -> String {
        self.url_template
            .replace("{version}", &self.version)
            .replace("{lang}", lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_location_points_at_cdn() {
        let source = GrammarSource::default();

        assert_eq!(
            source.location("python"),
            "https://cdn.jsdelivr.net/npm/tree-sitter-wasm-prebuilt@0.0.9/wasm/tree-sitter-python.wasm"
        );
    }

    #[test]
    fn substitutes_every_placeholder() {
        let source =
            GrammarSource::new("https://mirror/{version}/{lang}/{lang}.wasm", "1.2").unwrap();

        assert_eq!(source.location("go"), "https://mirror/1.2/go/go.wasm");
    }

    #[test]
    fn rejects_template_without_lang() {
        let err = GrammarSource::new("https://mirror/{version}/grammar.wasm", "1").unwrap_err();
        assert!(err.to_string().contains("{lang}"));
    }

    #[test]
    fn rejects_template_without_version() {
        assert!(GrammarSource::new("https://mirror/{lang}.wasm", "1").is_err());
    }
}
