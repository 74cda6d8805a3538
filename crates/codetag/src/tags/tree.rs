//! Tag tree construction and lookup.
//!
//! ## Building
//!
//! 1. Index every matched syntax node by its id.
//! 2. For each match, walk up the syntax tree from the node's parent until a
//!    matched node is found; that is the structural parent. Reaching the top
//!    without a hit makes the symbol top-level. Cost is O(n·h).
//! 3. Assign parent and children links in match order.
//! 4. Compute every tag path and fill the path index. A later symbol whose
//!    path collides with an earlier one replaces it in the index. Paths with
//!    an empty tag (a name that sanitizes to nothing) are not indexed.
//!
//! All links are assigned in one pass over a staging list before the tree is
//! handed out; [`TagTree`] exposes no way to change them afterwards.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, OnceLock};

use tree_sitter::{Node, Tree};

use super::TagPath;
use super::matcher::TagMatch;
use super::node::{NodeId, SourceSpan, SymbolNode, sanitize_tag};

/// Read-only tree of symbols for one parse of one file.
#[derive(Debug)]
pub struct TagTree {
    /// Arena of nodes; index 0 is the synthetic root.
    nodes: Vec<SymbolNode>,
    path_index: HashMap<String, NodeId>,
}

/// A matched symbol before its links are known.
struct Staged {
    name: String,
    span: SourceSpan,
    parent: NodeId,
}

impl TagTree {
    /// Build the tree for `tree` from the matches produced over it.
    ///
    /// `source` must be the text `tree` was parsed from.
    #[must_use]
    pub fn build(tree: &Tree, matches: Vec<TagMatch<'_>>, source: Arc<str>) -> Self {
        let root = tree.root_node();

        // Arena index of each match is its position + 1 (0 is the root).
        let by_syntax_id: HashMap<usize, NodeId> = matches
            .iter()
            .enumerate()
            .map(|(i, m)| (m.node.id(), NodeId(i + 1)))
            .collect();

        let staged: Vec<Staged> = matches
            .into_iter()
            .map(|m| Staged {
                parent: find_parent(m.node, &by_syntax_id),
                span: SourceSpan::of(&m.node),
                name: m.name,
            })
            .collect();

        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); staged.len() + 1];
        for (i, node) in staged.iter().enumerate() {
            children[node.parent.0].push(NodeId(i + 1));
        }

        let tags: Vec<String> = std::iter::once(String::new())
            .chain(staged.iter().map(|node| sanitize_tag(&node.name)))
            .collect();
        let parents: Vec<Option<NodeId>> = std::iter::once(None)
            .chain(staged.iter().map(|node| Some(node.parent)))
            .collect();

        let mut children = children.into_iter();
        let mut nodes = Vec::with_capacity(staged.len() + 1);
        nodes.push(SymbolNode {
            index: NodeId::ROOT,
            name: String::new(),
            tag: String::new(),
            tag_path: TagPath::default(),
            span: SourceSpan::of(&root),
            parent: None,
            children: children.next().unwrap_or_default(),
            source: Arc::clone(&source),
            content: OnceLock::new(),
        });

        let mut path_index = HashMap::with_capacity(staged.len());
        for ((i, node), node_children) in staged.into_iter().enumerate().zip(children) {
            let index = NodeId(i + 1);
            let tag_path = path_to(index, &parents, &tags);
            if is_addressable(&tag_path) {
                path_index.insert(tag_path.to_string(), index);
            }

            nodes.push(SymbolNode {
                index,
                tag: tags[index.0].clone(),
                name: node.name,
                tag_path,
                span: node.span,
                parent: Some(node.parent),
                children: node_children,
                source: Arc::clone(&source),
                content: OnceLock::new(),
            });
        }

        tracing::debug!(symbols = nodes.len() - 1, "Built tag tree");

        Self { nodes, path_index }
    }

    /// A tree with no symbols, used for parse-only languages.
    #[must_use]
    pub fn empty(tree: &Tree, source: Arc<str>) -> Self {
        Self::build(tree, Vec::new(), source)
    }

    /// The synthetic root. Its children are the top-level symbols.
    #[must_use]
    pub fn root(&self) -> &SymbolNode {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Node by index, `None` if the index belongs to another tree.
    #[must_use]
    pub fn get(&self, index: NodeId) -> Option<&SymbolNode> {
        self.nodes.get(index.0)
    }

    /// Number of symbols, root excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True when the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-level symbols in discovery order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&SymbolNode> {
        self.children(self.root())
    }

    /// Direct children of `node` in discovery order.
    #[must_use]
    pub fn children(&self, node: &SymbolNode) -> Vec<&SymbolNode> {
        node.children.iter().map(|&id| &self.nodes[id.0]).collect()
    }

    /// Structural parent. Top-level symbols return the root; the root
    /// returns `None`.
    #[must_use]
    pub fn parent(&self, node: &SymbolNode) -> Option<&SymbolNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    /// Enclosing symbols from outermost to innermost, root excluded.
    #[must_use]
    pub fn ancestors(&self, node: &SymbolNode) -> Vec<&SymbolNode> {
        let mut chain = Vec::new();
        let mut current = self.parent(node);
        while let Some(ancestor) = current.filter(|n| !n.is_root()) {
            chain.push(ancestor);
            current = self.parent(ancestor);
        }
        chain.reverse();
        chain
    }

    /// Every symbol in pre-order, siblings left to right.
    #[must_use]
    pub fn dfs(&self) -> Vec<&SymbolNode> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.root().children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every symbol level by level, siblings left to right.
    #[must_use]
    pub fn bfs(&self) -> Vec<&SymbolNode> {
        let mut out = Vec::with_capacity(self.len());
        let mut queue: VecDeque<NodeId> = self.root().children.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id.0];
            out.push(node);
            queue.extend(node.children.iter());
        }
        out
    }

    /// Look up a symbol by path in O(1).
    ///
    /// When two symbols share a path (e.g. overloaded siblings), the one
    /// discovered last wins. Symbols with an empty tag on their path are not
    /// addressable.
    #[must_use]
    pub fn at(&self, path: &TagPath) -> Option<&SymbolNode> {
        self.path_index
            .get(&path.to_string())
            .map(|id| &self.nodes[id.0])
    }

    /// Look up a symbol by descending from the root one tag at a time.
    ///
    /// Agrees with [`TagTree::at`], including the last-wins rule for
    /// colliding siblings; useful when no index is wanted.
    #[must_use]
    pub fn descend(&self, path: &TagPath) -> Option<&SymbolNode> {
        if !is_addressable(path) {
            return None;
        }
        let mut current = self.root();
        for tag in path.tags() {
            current = current
                .children
                .iter()
                .rev()
                .map(|id| &self.nodes[id.0])
                .find(|child| child.tag == *tag)?;
        }
        Some(current)
    }

    /// Path of `node` reconstructed from its parent links.
    #[must_use]
    pub fn path(&self, node: &SymbolNode) -> TagPath {
        let mut tags: Vec<String> = self
            .ancestors(node)
            .into_iter()
            .map(|n| n.tag.clone())
            .collect();
        if !node.is_root() {
            tags.push(node.tag.clone());
        }
        TagPath::new(tags)
    }

    /// Names of the symbol and its ancestors joined with ` > `.
    #[must_use]
    pub fn display(&self, node: &SymbolNode) -> String {
        let mut names: Vec<&str> = self.ancestors(node).iter().map(|n| n.name()).collect();
        names.push(node.name());
        names.join(" > ")
    }
}

/// A non-empty path whose every tag is non-empty. Only these round-trip
/// through the string form.
fn is_addressable(path: &TagPath) -> bool {
    !path.is_empty() && path.tags().iter().all(|tag| !tag.is_empty())
}

/// Nearest matched strict ancestor of `node`, or the root.
fn find_parent(node: Node<'_>, by_syntax_id: &HashMap<usize, NodeId>) -> NodeId {
    let mut current = node.parent();
    while let Some(syntax) = current {
        if let Some(&id) = by_syntax_id.get(&syntax.id()) {
            return id;
        }
        current = syntax.parent();
    }
    NodeId::ROOT
}

fn path_to(index: NodeId, parents: &[Option<NodeId>], tags: &[String]) -> TagPath {
    let mut chain = Vec::new();
    let mut current = index;
    while current != NodeId::ROOT {
        chain.push(tags[current.0].clone());
        match parents[current.0] {
            Some(parent) => current = parent,
            None => break,
        }
    }
    chain.reverse();
    TagPath::new(chain)
}
