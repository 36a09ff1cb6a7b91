//! Leaf-wise filter transformation
//!
//! Every structural or value mutator reaches the tree through [`map_leaves`],
//! so none of them can skip a leaf or duplicate a subtree.

use super::Filter;

/// Rebuild `filter`, replacing each leaf with `transform(leaf)`.
///
/// Compound nodes keep their operator and child order. The transform sees
/// every leaf exactly once and may return any variant, including a compound.
pub fn map_leaves<F>(filter: &Filter, transform: &mut F) -> Filter
where
    F: FnMut(&Filter) -> Filter,
{
    match filter {
        Filter::And(children) => Filter::And(
            children
                .iter()
                .map(|child| map_leaves(child, transform))
                .collect(),
        ),
        Filter::Or(children) => Filter::Or(
            children
                .iter()
                .map(|child| map_leaves(child, transform))
                .collect(),
        ),
        Filter::Not(child) => Filter::Not(Box::new(map_leaves(child, transform))),
        leaf => transform(leaf),
    }
}
