//! Ranking symbols against a partially typed query.

use crate::tags::{SymbolNode, TagTree};

/// Every symbol in `tree`, best match for `query` first.
///
/// Without a query (or with an empty one) symbols come in depth-first
/// order. Otherwise they are sorted by [`score`] of their tag path, and
/// symbols with equal scores keep their depth-first order.
#[must_use]
pub fn rank<'t>(tree: &'t TagTree, query: Option<&str>) -> Vec<&'t SymbolNode> {
    let mut nodes = tree.dfs();
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return nodes;
    };

    let mut scored: Vec<(f64, &SymbolNode)> = nodes
        .drain(..)
        .map(|node| (score(query, &node.tag_path().tags().join(",")), node))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, node)| node).collect()
}

/// Edit distance normalized to `0..=100`; lower is closer.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(query: &str, candidate: &str) -> f64 {
    let longest = query.chars().count().max(candidate.chars().count());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(query, candidate) as f64 * 100.0 / longest as f64
}

/// Character-level Levenshtein distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}
