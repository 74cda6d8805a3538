//! Symbol nodes of a tag tree.

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use tree_sitter::Point;

use super::TagPath;

/// Index of a node inside its [`TagTree`](super::TagTree).
///
/// Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The synthetic root of every tree.
    pub const ROOT: Self = Self(0);
}

/// Location of a symbol's syntax node in the parsed source.
///
/// Captured from the tree-sitter node at build time so the tag tree does not
/// borrow the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Identity of the syntax node; stable within one parse only.
    pub node_id: usize,
    /// Grammar node kind, e.g. `function_definition`.
    pub kind: &'static str,
    /// Byte range in the source.
    pub byte_range: Range<usize>,
    /// Zero-based start row and byte column.
    pub start: Point,
    /// Zero-based end row and byte column.
    pub end: Point,
}

impl SourceSpan {
    pub(crate) fn of(node: &tree_sitter::Node<'_>) -> Self {
        Self {
            node_id: node.id(),
            kind: node.kind(),
            byte_range: node.byte_range(),
            start: node.start_position(),
            end: node.end_position(),
        }
    }
}

/// One matched symbol occurrence.
///
/// Structural links (`parent`, `children`) and the tag path are fixed when
/// the tree is built; nodes are never mutated afterwards. `content` is
/// computed on first access and cached on the node.
#[derive(Debug)]
pub struct SymbolNode {
    pub(crate) index: NodeId,
    pub(crate) name: String,
    pub(crate) tag: String,
    pub(crate) tag_path: TagPath,
    pub(crate) span: SourceSpan,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) source: Arc<str>,
    pub(crate) content: OnceLock<String>,
}

impl SymbolNode {
    /// Position of this node in its tree.
    #[must_use]
    pub fn index(&self) -> NodeId {
        self.index
    }

    /// Identity of the underlying syntax node.
    #[must_use]
    pub fn id(&self) -> usize {
        self.span.node_id
    }

    /// Raw captured name, e.g. `Display for Point`. Empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path-safe form of the name, see [`sanitize_tag`].
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Root-exclusive chain of tags ending with this node.
    #[must_use]
    pub fn tag_path(&self) -> &TagPath {
        &self.tag_path
    }

    /// True only for the synthetic root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent index; `None` only for the root. Top-level symbols point at
    /// [`NodeId::ROOT`].
    #[must_use]
    pub fn parent_index(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child indices in discovery order.
    #[must_use]
    pub fn child_indices(&self) -> &[NodeId] {
        &self.children
    }

    /// Where the symbol sits in the source.
    #[must_use]
    pub fn span(&self) -> &SourceSpan {
        &self.span
    }

    /// Zero-based first row.
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.span.start.row
    }

    /// Zero-based last row.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.span.end.row
    }

    /// Raw source text of the symbol.
    #[must_use]
    pub fn text(&self) -> &str {
        self.source
            .get(self.span.byte_range.clone())
            .unwrap_or_default()
    }

    /// Source text with the symbol's own indentation removed from every line
    /// after the first.
    ///
    /// If the symbol starts at column `C`, lines 2..n lose their first `C`
    /// characters; the first line is untouched. With `C == 0` the raw text is
    /// returned unchanged.
    pub fn content(&self) -> &str {
        self.content
            .get_or_init(|| strip_indent(self.text(), self.span.start.column))
    }
}

/// Strip whitespace and the characters `< > # ( )` from a captured name.
///
/// The result is safe to use as a [`TagPath`] segment and inside a
/// `file#path` link. Sanitizing twice is the same as sanitizing once.
#[must_use]
pub fn sanitize_tag(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '<' | '>' | '#' | '(' | ')'))
        .collect()
}

fn strip_indent(text: &str, indent: usize) -> String {
    if indent == 0 {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if i == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        let cut = line
            .char_indices()
            .nth(indent)
            .map_or(line.len(), |(offset, _)| offset);
        out.push_str(&line[cut..]);
    }
    out
}
