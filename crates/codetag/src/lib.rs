//! # Codetag: Addressable Symbol Trees for Source Files
//!
//! Codetag turns a source file into a tree of named symbols ("tags") that can
//! be addressed by path, e.g. `utils.py#MyClass>method`. Grammars are
//! downloaded on demand, cached on disk and loaded into tree-sitter.
//!
//! ## Design Philosophy
//!
//! - **File-local** - Paths address symbols within one file; nothing is resolved across files
//! - **Reparse, don't patch** - Every parse starts from scratch; trees are immutable once built
//! - **Pluggable acquisition** - Transport and grammar engine sit behind small traits
//! - **Library first, CLI second**
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "wasm")]
//! # async fn demo() -> codetag::Result<()> {
//! use std::path::Path;
//! use std::sync::Arc;
//! use codetag::{CodeFileParser, Settings, TagPath, WasmRuntime};
//!
//! let settings = Settings::default();
//! let loader = Arc::new(settings.grammar_loader(Arc::new(WasmRuntime::default()))?);
//! loader.bootstrap().await?;
//!
//! let parser = CodeFileParser::new(loader);
//! if let Some(tree) = parser.parse(Path::new("src/utils.py")).await? {
//!     if let Some(method) = tree.at(&TagPath::from("MyClass>method")) {
//!         println!("{}", method.content());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod grammar;
pub mod languages;
pub mod link;
mod parse;
pub mod settings;
pub mod suggest;
pub mod tags;
pub mod text;

pub use error::{AcquireError, Error, Result};
#[cfg(feature = "wasm")]
pub use grammar::WasmRuntime;
pub use grammar::{GrammarHandle, GrammarLoader, GrammarRuntime};
pub use link::{CodeLink, LinkKind};
pub use parse::{CodeFileParser, parse_source};
pub use settings::Settings;
pub use tags::{SymbolNode, TagPath, TagTree};
