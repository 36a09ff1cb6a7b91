//! Value obfuscators - Rewrite assertion values, gated on token format

use rand::{Rng, RngCore};
use std::sync::Arc;

use super::{is_anr, leaf_format, map_values, ValueSlot};
use crate::catalog::{AttributeCatalog, TokenFormat};
use crate::filter::{map_leaves, Filter, SubstringFilter};
use crate::middleware::values::{
    add_anr_spacing, add_dn_spacing, below, chance, prepend_zeros, randomly_hex_encode,
    replace_timestamp, token_boundaries, TimestampRecognizer,
};
use crate::middleware::FilterMiddleware;

/// Equality matches become approximate matches
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMatchObf;

impl FilterMiddleware for ApproxMatchObf {
    fn name(&self) -> &'static str {
        "approx"
    }

    fn apply(&self, filter: &Filter, _rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| match leaf {
            Filter::EqualityMatch(ava) => Filter::ApproxMatch(ava.clone()),
            other => other.clone(),
        })
    }
}

/// Hex-escape characters of Unicode string values
pub struct RandHexValueObf {
    prob: f32,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandHexValueObf {
    pub fn new(prob: f32, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self { prob, catalog }
    }
}

impl FilterMiddleware for RandHexValueObf {
    fn name(&self) -> &'static str {
        "hex"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            if leaf_format(self.catalog.as_ref(), leaf) != Some(TokenFormat::StringUnicode) {
                return leaf.clone();
            }
            map_values(leaf, |_, value| randomly_hex_encode(value, self.prob, rng))
        })
    }
}

/// Letter garbage in the fractional seconds of timestamp values.
///
/// Only attributes the catalog leaves unclassified are touched; a string or
/// integer attribute compares the garbage literally.
pub struct RandTimestampSuffixObf {
    prepend: bool,
    append: bool,
    max_chars: usize,
    recognizer: Arc<dyn TimestampRecognizer>,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandTimestampSuffixObf {
    pub fn new(
        prepend: bool,
        append: bool,
        max_chars: usize,
        recognizer: Arc<dyn TimestampRecognizer>,
        catalog: Arc<dyn AttributeCatalog>,
    ) -> Self {
        Self {
            prepend,
            append,
            max_chars,
            recognizer,
            catalog,
        }
    }
}

impl FilterMiddleware for RandTimestampSuffixObf {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            if leaf_format(self.catalog.as_ref(), leaf).is_some() {
                return leaf.clone();
            }
            map_values(leaf, |_, value| {
                replace_timestamp(
                    value,
                    self.prepend,
                    self.append,
                    self.max_chars,
                    self.recognizer.as_ref(),
                    rng,
                )
            })
        })
    }
}

/// Leading zeros on integer values
pub struct RandPrependZerosObf {
    max_zeros: usize,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandPrependZerosObf {
    pub fn new(max_zeros: usize, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self { max_zeros, catalog }
    }
}

impl FilterMiddleware for RandPrependZerosObf {
    fn name(&self) -> &'static str {
        "zeros"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            if !leaf_format(self.catalog.as_ref(), leaf).is_some_and(|f| f.is_integer()) {
                return leaf.clone();
            }
            // Zeros inside `any` or `final` would move a positional match
            map_values(leaf, |slot, value| match slot {
                ValueSlot::Assertion | ValueSlot::Extensible | ValueSlot::Initial => {
                    prepend_zeros(value, self.max_zeros, rng)
                }
                ValueSlot::Any | ValueSlot::Final => value.to_string(),
            })
        })
    }
}

/// Whitespace padding in ANR and DN values
pub struct RandSpacingObf {
    max_spaces: usize,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandSpacingObf {
    pub fn new(max_spaces: usize, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self {
            max_spaces,
            catalog,
        }
    }
}

impl FilterMiddleware for RandSpacingObf {
    fn name(&self) -> &'static str {
        "spacing"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let Some(attribute) = leaf.attribute() else {
                return leaf.clone();
            };

            if is_anr(self.catalog.as_ref(), attribute) {
                return map_values(leaf, |slot, value| match slot {
                    ValueSlot::Assertion | ValueSlot::Initial | ValueSlot::Final => {
                        add_anr_spacing(value, self.max_spaces, rng)
                    }
                    ValueSlot::Extensible | ValueSlot::Any => value.to_string(),
                });
            }

            if self.catalog.classify(attribute) == Some(TokenFormat::DnString) {
                return map_values(leaf, |slot, value| match slot {
                    ValueSlot::Assertion => add_dn_spacing(value, self.max_spaces, rng),
                    _ => value.to_string(),
                });
            }

            leaf.clone()
        })
    }
}

/// Turn equality matches into substring matches and split substring
/// components further
pub struct RandAddWildcardObf {
    prob: f32,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandAddWildcardObf {
    pub fn new(prob: f32, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self { prob, catalog }
    }

    fn split_equality(&self, attribute: &str, value: &str, rng: &mut dyn RngCore) -> Filter {
        let boundaries = token_boundaries(value);
        let at = boundaries[below(rng, boundaries.len())];
        let (initial, last) = value.split_at(at);
        Filter::Substrings(SubstringFilter {
            attribute: attribute.to_string(),
            initial: non_empty(initial),
            any: Vec::new(),
            r#final: non_empty(last),
        })
    }

    fn split_substrings(&self, sub: &SubstringFilter, rng: &mut dyn RngCore) -> SubstringFilter {
        let initial = sub.initial.as_deref().filter(|s| !s.is_empty());
        let last = sub.r#final.as_deref().filter(|s| !s.is_empty());
        let mut out = SubstringFilter {
            attribute: sub.attribute.clone(),
            initial: initial.map(str::to_string),
            any: sub.any.clone(),
            r#final: last.map(str::to_string),
        };

        if let Some(initial) = initial {
            let halves = split_interior(initial, rng);
            out.initial = None;
            out.any.splice(0..0, halves);
        } else if !sub.any.is_empty() {
            let index = below(rng, sub.any.len());
            let halves = split_interior(&sub.any[index], rng);
            out.any.splice(index..=index, halves);
        } else if let Some(last) = last {
            let halves = split_interior(last, rng);
            out.r#final = None;
            out.any.extend(halves);
        }

        out
    }
}

fn non_empty(part: &str) -> Option<String> {
    (!part.is_empty()).then(|| part.to_string())
}

/// Split a component at an interior token boundary, dropping empty halves.
/// Components shorter than two tokens come back whole.
fn split_interior(component: &str, rng: &mut dyn RngCore) -> Vec<String> {
    let boundaries = token_boundaries(component);
    let tokens = boundaries.len() - 1;
    if tokens < 2 {
        return non_empty(component).into_iter().collect();
    }
    let at = boundaries[rng.gen_range(1..tokens)];
    let (left, right) = component.split_at(at);
    vec![left.to_string(), right.to_string()]
}

impl FilterMiddleware for RandAddWildcardObf {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| match leaf {
            Filter::EqualityMatch(ava)
                if !ava.value.is_empty()
                    && !is_anr(self.catalog.as_ref(), &ava.attribute)
                    && self.catalog.classify(&ava.attribute)
                        == Some(TokenFormat::StringUnicode) =>
            {
                if chance(rng, self.prob) {
                    self.split_equality(&ava.attribute, &ava.value, rng)
                } else {
                    leaf.clone()
                }
            }
            Filter::Substrings(sub) => {
                if chance(rng, self.prob) {
                    Filter::Substrings(self.split_substrings(sub, rng))
                } else {
                    leaf.clone()
                }
            }
            other => other.clone(),
        })
    }
}
