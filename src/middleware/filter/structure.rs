//! Structural obfuscators - Change node shape without changing the match set

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::sync::Arc;

use super::strip_oid_prefix;
use crate::catalog::{canonical_oid, AttributeCatalog};
use crate::filter::{map_leaves, Filter, MatchingRuleAssertion};
use crate::middleware::values::{below, random_garbage, up_to};
use crate::middleware::{fresh_garbage_name, FilterMiddleware};

/// LDAP_MATCHING_RULE_BIT_AND
pub const BIT_AND_RULE: &str = "1.2.840.113556.1.4.803";
/// LDAP_MATCHING_RULE_BIT_OR
pub const BIT_OR_RULE: &str = "1.2.840.113556.1.4.804";

/// Wrap each leaf in single-child `And`/`Or` nodes
#[derive(Debug, Clone, Copy)]
pub struct RandAddBoolObf {
    max_depth: usize,
}

impl RandAddBoolObf {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl FilterMiddleware for RandAddBoolObf {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let depth = up_to(rng, self.max_depth);
            (0..depth).fold(leaf.clone(), |inner, _| {
                if rng.gen_bool(0.5) {
                    Filter::and(vec![inner])
                } else {
                    Filter::or(vec![inner])
                }
            })
        })
    }
}

/// Wrap each leaf in pairs of negations
#[derive(Debug, Clone, Copy)]
pub struct RandDblNegBoolObf {
    max_depth: usize,
}

impl RandDblNegBoolObf {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl FilterMiddleware for RandDblNegBoolObf {
    fn name(&self) -> &'static str {
        "dblneg"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let pairs = up_to(rng, self.max_depth);
            (0..pairs).fold(leaf.clone(), |inner, _| {
                Filter::not(Filter::not(inner))
            })
        })
    }
}

/// Shuffle the children of every `And`/`Or` node
#[derive(Debug, Clone, Copy, Default)]
pub struct RandBoolReorderObf;

impl RandBoolReorderObf {
    fn reorder(filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        match filter {
            Filter::And(children) => Filter::And(Self::shuffled(children, rng)),
            Filter::Or(children) => Filter::Or(Self::shuffled(children, rng)),
            Filter::Not(child) => Filter::not(Self::reorder(child, rng)),
            leaf => leaf.clone(),
        }
    }

    fn shuffled(children: &[Filter], rng: &mut dyn RngCore) -> Vec<Filter> {
        let mut out: Vec<Filter> = children
            .iter()
            .map(|child| Self::reorder(child, rng))
            .collect();
        out.shuffle(rng);
        out
    }
}

impl FilterMiddleware for RandBoolReorderObf {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        Self::reorder(filter, rng)
    }
}

/// OR each leaf with equality matches on attributes that do not exist.
///
/// An undefined attribute never matches, so the extra branches add nothing
/// to the result set.
pub struct RandGarbageObf {
    max_elems: usize,
    size: usize,
    charset: String,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandGarbageObf {
    pub fn new(
        max_elems: usize,
        size: usize,
        charset: impl Into<String>,
        catalog: Arc<dyn AttributeCatalog>,
    ) -> Self {
        Self {
            max_elems,
            size,
            charset: charset.into(),
            catalog,
        }
    }
}

impl FilterMiddleware for RandGarbageObf {
    fn name(&self) -> &'static str {
        "garbage"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        if self.max_elems == 0 {
            return filter.clone();
        }

        map_leaves(filter, &mut |leaf| {
            let count = 1 + below(rng, self.max_elems);
            let mut branches = Vec::with_capacity(count + 1);
            for _ in 0..count {
                let Some(name) =
                    fresh_garbage_name(self.catalog.as_ref(), self.size, &self.charset, rng)
                else {
                    break;
                };
                let value = random_garbage(self.size, &self.charset, rng);
                branches.push(Filter::eq(name, value));
            }

            if branches.is_empty() {
                return leaf.clone();
            }
            let at = up_to(rng, branches.len());
            branches.insert(at, leaf.clone());
            Filter::or(branches)
        })
    }
}

/// `(attr=value)` becomes `(attr:=value)`, optionally with `:dn`
#[derive(Debug, Clone, Copy)]
pub struct EqualityToExtensibleObf {
    append_dn: bool,
}

impl EqualityToExtensibleObf {
    pub fn new(append_dn: bool) -> Self {
        Self { append_dn }
    }
}

impl FilterMiddleware for EqualityToExtensibleObf {
    fn name(&self) -> &'static str {
        "extensible"
    }

    fn apply(&self, filter: &Filter, _rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| match leaf {
            Filter::EqualityMatch(ava) => Filter::ExtensibleMatch(MatchingRuleAssertion {
                matching_rule: None,
                attribute: Some(ava.attribute.clone()),
                value: ava.value.clone(),
                dn_attributes: self.append_dn,
            }),
            other => other.clone(),
        })
    }
}

/// Split bitwise AND/OR matches into one match per set bit.
///
/// `(uac:AND:=514)` becomes `(&(uac:AND:=2)(uac:AND:=512))` and the OR rule
/// becomes a disjunction the same way.
#[derive(Debug, Clone, Copy)]
pub struct BitwiseDecompositionObf {
    max_bits: usize,
}

impl BitwiseDecompositionObf {
    pub fn new(max_bits: usize) -> Self {
        Self { max_bits }
    }

    /// Flag values of the set bits, lowest first
    fn set_bits(value: &str) -> Option<Vec<u64>> {
        let parsed: i64 = value.trim().parse().ok()?;
        // Negative values are 32-bit flag words written as signed integers
        let bits = if parsed < 0 {
            u64::from(i32::try_from(parsed).ok()? as u32)
        } else {
            u64::try_from(parsed).ok()?
        };
        Some(
            (0..64)
                .map(|bit| 1u64 << bit)
                .filter(|flag| bits & flag != 0)
                .collect(),
        )
    }
}

impl FilterMiddleware for BitwiseDecompositionObf {
    fn name(&self) -> &'static str {
        "bitwise"
    }

    fn apply(&self, filter: &Filter, _rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let Filter::ExtensibleMatch(mra) = leaf else {
                return leaf.clone();
            };
            let Some(rule) = mra.matching_rule.as_deref() else {
                return leaf.clone();
            };
            let canonical = canonical_oid(strip_oid_prefix(rule));
            let is_and = canonical.as_deref() == Some(BIT_AND_RULE);
            let is_or = canonical.as_deref() == Some(BIT_OR_RULE);
            if !is_and && !is_or {
                return leaf.clone();
            }

            let Some(flags) = Self::set_bits(&mra.value) else {
                return leaf.clone();
            };
            if flags.len() < 2 || flags.len() > self.max_bits {
                return leaf.clone();
            }

            let parts = flags
                .into_iter()
                .map(|flag| {
                    Filter::ExtensibleMatch(MatchingRuleAssertion {
                        value: flag.to_string(),
                        ..mra.clone()
                    })
                })
                .collect();
            if is_and {
                Filter::and(parts)
            } else {
                Filter::or(parts)
            }
        })
    }
}
