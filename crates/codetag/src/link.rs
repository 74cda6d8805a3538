//! Code link syntax.
//!
//! A code link points at a file and optionally a symbol inside it:
//!
//! | Form     | Syntax                               |
//! |----------|--------------------------------------|
//! | wiki     | `[[fileLink#tagPath\|alias]]query`    |
//! | markdown | `[alias](fileLink#tagPath)query`     |
//! | inner    | `fileLink#tagPath\|alias`             |
//!
//! The wiki and markdown forms must end the text; whatever non-whitespace
//! follows the closing bracket is the *query* typed while completing the
//! link. The inner form is what sits between the wiki brackets.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::languages::{self, LanguageSpec};
use crate::tags::TagPath;

static INNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<file>[^#|\]]+)(?:#(?<path>[^#|\]]+))?(?:\|(?<alias>[^#|\]]+))?")
        .expect("Invalid inner link regex")
});

static WIKI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[\[(?<file>[^#|\]]+)(?:#(?<path>[^#|\]]+))?(?:\|(?<alias>[^#|\]]+))?\]\](?<query>\S*)$",
    )
    .expect("Invalid wiki link regex")
});

static MARKDOWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?<alias>[^\]]+)?\]\((?<file>[^#|)]+)(?:#(?<path>[^#|)]+))?\)(?<query>\S*)$")
        .expect("Invalid markdown link regex")
});

/// Syntax a link was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `[[file#path|alias]]`
    Wiki,
    /// `[alias](file#path)`
    Markdown,
    /// `file#path|alias`
    Inner,
}

/// A parsed code link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLink {
    /// The matched text, brackets and query included.
    pub text: String,
    /// Syntax the link was written in.
    pub kind: LinkKind,
    /// Link to the file, as written.
    pub file_link: String,
    /// Symbol path inside the file.
    pub tag_path: Option<TagPath>,
    /// Display alias.
    pub alias: Option<String>,
    /// Text typed after the link, used to rank suggestions.
    pub query: Option<String>,
}

impl CodeLink {
    /// Parse a wiki or markdown link that ends `text`.
    ///
    /// The wiki form is tried first.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        [(LinkKind::Wiki, &*WIKI_RE), (LinkKind::Markdown, &*MARKDOWN_RE)]
            .into_iter()
            .find_map(|(kind, re)| {
                re.captures(text)
                    .and_then(|caps| Self::from_captures(kind, &caps))
            })
    }

    /// Parse the inner form, e.g. `utils.py#MyClass>method`.
    #[must_use]
    pub fn parse_inner(text: &str) -> Option<Self> {
        INNER_RE
            .captures(text)
            .and_then(|caps| Self::from_captures(LinkKind::Inner, &caps))
    }

    fn from_captures(kind: LinkKind, caps: &Captures<'_>) -> Option<Self> {
        let group = |name| {
            caps.name(name)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
        };

        let file_link = group("file")?.to_string();
        Some(Self {
            text: caps.get(0)?.as_str().to_string(),
            kind,
            file_link,
            tag_path: group("path").map(TagPath::from),
            alias: group("alias").map(str::to_string),
            query: group("query").map(str::to_string),
        })
    }

    /// Language of the linked file, from its extension.
    #[must_use]
    pub fn language(&self) -> Option<&'static LanguageSpec> {
        languages::for_path(std::path::Path::new(&self.file_link))
    }

    /// The text that replaces this link once `path` is chosen.
    ///
    /// The form and alias are kept. Wiki and markdown links gain a trailing
    /// space so typing can continue after them.
    #[must_use]
    pub fn with_tag_path(&self, path: &TagPath) -> String {
        match self.kind {
            LinkKind::Wiki => {
                let alias = self
                    .alias
                    .as_deref()
                    .map(|a| format!("|{a}"))
                    .unwrap_or_default();
                format!("[[{}#{path}{alias}]] ", self.file_link)
            }
            LinkKind::Markdown => format!(
                "[{}]({}#{path}) ",
                self.alias.as_deref().unwrap_or_default(),
                self.file_link
            ),
            LinkKind::Inner => format!("{}#{path}", self.file_link),
        }
    }
}

impl fmt::Display for CodeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
