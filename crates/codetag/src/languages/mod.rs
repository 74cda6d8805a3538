//! Grammar registry: which languages exist and how their symbols are captured.
//!
//! The registry is a static table. Each entry names a grammar (the id used to
//! download `tree-sitter-{name}.wasm`), the file extensions that select it, and
//! an optional tags query.
//!
//! Languages without a tags query are *parse-only*: their grammar loads and
//! parses fine, but the resulting tag tree has no symbols.
//!
//! ## Tags query convention
//!
//! In every pattern the first capture is the symbol node (the subtree that
//! becomes a tag) and all following captures are the name tokens, joined with
//! a space. See [`crate::tags::match_tags`].
//!
//! ## Adding a New Language
//!
//! 1. Add a `LanguageSpec` to `LANGUAGES`
//! 2. If symbols should be taggable, add `queries/{name}.scm` and reference it
//! 3. Make sure the grammar is published by the configured distribution

mod tree_sitter_utils;

pub(crate) use tree_sitter_utils::node_text;

use std::path::Path;

/// Static description of one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Grammar id, e.g. `"python"` or `"c_sharp"`.
    pub name: &'static str,
    /// Extensions including the leading dot, matched case-sensitively.
    pub extensions: &'static [&'static str],
    /// Symbol capture query, `None` for parse-only languages.
    pub tags_query: Option<&'static str>,
}

impl LanguageSpec {
    /// Whether a tags query exists for this language.
    #[must_use]
    pub fn is_taggable(&self) -> bool {
        self.tags_query.is_some()
    }
}

const PYTHON_TAGS: &str = include_str!("queries/python.scm");
const RUST_TAGS: &str = include_str!("queries/rust.scm");
const JAVASCRIPT_TAGS: &str = include_str!("queries/javascript.scm");
const TYPESCRIPT_TAGS: &str = include_str!("queries/typescript.scm");
const GO_TAGS: &str = include_str!("queries/go.scm");
const C_TAGS: &str = include_str!("queries/c.scm");
const CPP_TAGS: &str = include_str!("queries/cpp.scm");

/// Every language the registry knows about.
pub static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        name: "c",
        extensions: &[".c", ".h"],
        tags_query: Some(C_TAGS),
    },
    LanguageSpec {
        name: "cpp",
        extensions: &[".cc", ".cpp", ".cxx", ".hpp", ".hh", ".hxx"],
        tags_query: Some(CPP_TAGS),
    },
    LanguageSpec {
        name: "go",
        extensions: &[".go"],
        tags_query: Some(GO_TAGS),
    },
    LanguageSpec {
        name: "javascript",
        extensions: &[".js", ".mjs", ".cjs", ".jsx"],
        tags_query: Some(JAVASCRIPT_TAGS),
    },
    LanguageSpec {
        name: "python",
        extensions: &[".py", ".pyi"],
        tags_query: Some(PYTHON_TAGS),
    },
    LanguageSpec {
        name: "rust",
        extensions: &[".rs"],
        tags_query: Some(RUST_TAGS),
    },
    LanguageSpec {
        name: "typescript",
        extensions: &[".ts", ".mts", ".cts"],
        tags_query: Some(TYPESCRIPT_TAGS),
    },
    // TSX shares every symbol-defining node with TypeScript.
    LanguageSpec {
        name: "tsx",
        extensions: &[".tsx"],
        tags_query: Some(TYPESCRIPT_TAGS),
    },
    // === Parse-only ===
    LanguageSpec {
        name: "bash",
        extensions: &[".sh", ".bash"],
        tags_query: None,
    },
    LanguageSpec {
        name: "c_sharp",
        extensions: &[".cs"],
        tags_query: None,
    },
    LanguageSpec {
        name: "css",
        extensions: &[".css"],
        tags_query: None,
    },
    LanguageSpec {
        name: "html",
        extensions: &[".html", ".htm"],
        tags_query: None,
    },
    LanguageSpec {
        name: "java",
        extensions: &[".java"],
        tags_query: None,
    },
    LanguageSpec {
        name: "json",
        extensions: &[".json"],
        tags_query: None,
    },
    LanguageSpec {
        name: "php",
        extensions: &[".php"],
        tags_query: None,
    },
    LanguageSpec {
        name: "ruby",
        extensions: &[".rb"],
        tags_query: None,
    },
];

/// Look up a language by grammar id.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES.iter().find(|spec| spec.name == name)
}

/// Look up a language by extension, including the leading dot (`".py"`).
///
/// Matching is exact and case-sensitive: `".PY"` is not Python.
#[must_use]
pub fn for_extension(ext: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES
        .iter()
        .find(|spec| spec.extensions.contains(&ext))
}

/// Resolve the language of a file path from its extension.
///
/// Returns `None` for paths without an extension or with an unknown one.
#[must_use]
pub fn for_path(path: &Path) -> Option<&'static LanguageSpec> {
    let ext = path.extension()?.to_str()?;
    for_extension(&format!(".{ext}"))
}

/// Languages that have a tags query.
pub fn taggable() -> impl Iterator<Item = &'static LanguageSpec> {
    LANGUAGES.iter().filter(|spec| spec.is_taggable())
}
