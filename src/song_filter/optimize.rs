//! Expression-tree simplification (song-filter spec §4.5): flattens
//! nested conjunctions, collapses redundant double negation and
//! single-child groups, and drops duplicate children while keeping the
//! first occurrence's position stable.

use super::node::FilterNode;

/// Rewrite `node` into its simplified form. Idempotent: running this
/// again on the result returns something equal to the result.
pub fn optimize(node: FilterNode) -> FilterNode {
    match node {
        FilterNode::And(children) => {
            let mut flat = Vec::with_capacity(children.len());
            flatten_into(&mut flat, children);
            dedup_stable(&mut flat);
            match flat.len() {
                0 => FilterNode::And(Vec::new()),
                1 => flat.into_iter().next().expect("checked len == 1"),
                _ => FilterNode::And(flat),
            }
        }
        FilterNode::Not(inner) => match optimize(*inner) {
            FilterNode::Not(doubly_negated) => *doubly_negated,
            other => FilterNode::Not(Box::new(other)),
        },
        leaf => leaf,
    }
}

/// Optimize every top-level child independently, then splice any child
/// that is itself an `And` into the parent instead of nesting it.
fn flatten_into(out: &mut Vec<FilterNode>, children: Vec<FilterNode>) {
    for child in children {
        match optimize(child) {
            FilterNode::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }
}

fn dedup_stable(nodes: &mut Vec<FilterNode>) {
    let mut seen: Vec<FilterNode> = Vec::with_capacity(nodes.len());
    nodes.retain(|node| {
        if seen.contains(node) {
            false
        } else {
            seen.push(node.clone());
            true
        }
    });
}
