//! Running a tags query over a syntax tree.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use crate::languages::node_text;

/// A symbol found by the tags query, still attached to its syntax node.
#[derive(Debug, Clone)]
pub struct TagMatch<'tree> {
    /// Display name assembled from the name captures.
    pub name: String,
    /// The symbol's syntax node (first capture of the match).
    pub node: Node<'tree>,
}

/// Run `query` under `root` and turn every match into a [`TagMatch`].
///
/// The first capture of a match is the symbol node; the remaining captures
/// are name tokens, joined with single spaces in capture order. Matches with
/// no captures are skipped.
pub fn match_tags<'tree>(query: &Query, root: Node<'tree>, source: &[u8]) -> Vec<TagMatch<'tree>> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);
    let mut tags = Vec::new();

    while let Some(m) = matches.next() {
        let Some((symbol, names)) = m.captures.split_first() else {
            continue;
        };

        let name = names
            .iter()
            .filter_map(|capture| node_text(&capture.node, source))
            .collect::<Vec<_>>()
            .join(" ");

        tags.push(TagMatch {
            name,
            node: symbol.node,
        });
    }

    tracing::trace!(count = tags.len(), "Tags query matched");
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn python_tree(source: &str) -> (tree_sitter::Tree, Query) {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = Parser::new();
        parser.set_language(&language).expect("python grammar loads");
        let tree = parser.parse(source, None).expect("parse succeeds");
        let query = Query::new(
            &language,
            crate::languages::lookup("python")
                .and_then(|spec| spec.tags_query)
                .expect("python has a tags query"),
        )
        .expect("query compiles");
        (tree, query)
    }

    #[test]
    fn first_capture_is_symbol_node() {
        let source = "def greet():\n    pass\n";
        let (tree, query) = python_tree(source);

        let tags = match_tags(&query, tree.root_node(), source.as_bytes());

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "greet");
        assert_eq!(tags[0].node.kind(), "function_definition");
    }

    #[test]
    fn multiple_name_captures_join_with_spaces() {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let query = Query::new(
            &language,
            "(function_definition name: (identifier) @name parameters: (parameters) @name) @def",
        )
        .expect("query compiles");
        let mut parser = Parser::new();
        parser.set_language(&language).expect("python grammar loads");
        let source = "def add(a, b):\n    return a + b\n";
        let tree = parser.parse(source, None).expect("parse succeeds");

        let tags = match_tags(&query, tree.root_node(), source.as_bytes());

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "add (a, b)");
    }

    #[test]
    fn symbol_only_capture_has_empty_name() {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let query = Query::new(&language, "(class_definition) @def").expect("query compiles");
        let mut parser = Parser::new();
        parser.set_language(&language).expect("python grammar loads");
        let source = "class A:\n    pass\n";
        let tree = parser.parse(source, None).expect("parse succeeds");

        let tags = match_tags(&query, tree.root_node(), source.as_bytes());

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "");
    }

    #[test]
    fn no_symbols_yields_no_matches() {
        let source = "x = 1\nprint(x)\n";
        let (tree, query) = python_tree(source);

        assert!(match_tags(&query, tree.root_node(), source.as_bytes()).is_empty());
    }
}
