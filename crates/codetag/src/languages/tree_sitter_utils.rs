//! Shared tree-sitter helpers.

/// Get the text of a tree-sitter node.
///
/// Returns `None` if the node's byte range is not valid UTF-8.
pub fn node_text<'a>(node: &tree_sitter::Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    match node.utf8_text(source) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::trace!(
                byte_range = ?node.byte_range(),
                error = %e,
                node_kind = %node.kind(),
                "Failed to decode node text as UTF-8"
            );
            None
        }
    }
}
