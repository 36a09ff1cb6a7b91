//! Attribute obfuscators - Rewrite attribute descriptions and letter case

use rand::RngCore;
use std::sync::Arc;

use super::{attribute_base, leaf_format, map_values, with_attribute, ValueSlot};
use crate::catalog::{AttributeCatalog, TokenFormat};
use crate::filter::{map_leaves, Filter};
use crate::middleware::values::{random_case, up_to};
use crate::middleware::FilterMiddleware;

/// Flip letter case of attribute descriptions and case-insensitive values
pub struct RandCaseObf {
    prob: f32,
    catalog: Arc<dyn AttributeCatalog>,
}

impl RandCaseObf {
    pub fn new(prob: f32, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self { prob, catalog }
    }
}

impl FilterMiddleware for RandCaseObf {
    fn name(&self) -> &'static str {
        "case"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let format = leaf_format(self.catalog.as_ref(), leaf);
            let renamed = match leaf.attribute() {
                Some(attribute) => with_attribute(leaf, random_case(attribute, self.prob, rng)),
                None => leaf.clone(),
            };

            if !matches!(
                format,
                Some(TokenFormat::StringUnicode | TokenFormat::DnString)
            ) {
                return renamed;
            }

            // An explicit matching rule may be case sensitive
            let explicit_rule = matches!(
                &renamed,
                Filter::ExtensibleMatch(mra) if mra.matching_rule.is_some()
            );
            map_values(&renamed, |slot, value| {
                if slot == ValueSlot::Extensible && explicit_rule {
                    value.to_string()
                } else {
                    random_case(value, self.prob, rng)
                }
            })
        })
    }
}

/// Replace attribute names by their (zero-padded) OID
pub struct OidAttributeObf {
    max_zeros: usize,
    prepend_oid: bool,
    catalog: Arc<dyn AttributeCatalog>,
}

impl OidAttributeObf {
    pub fn new(max_zeros: usize, prepend_oid: bool, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self {
            max_zeros,
            prepend_oid,
            catalog,
        }
    }

    fn obfuscate(&self, description: &str, rng: &mut dyn RngCore) -> Option<String> {
        let base = attribute_base(description);
        let oid = self.catalog.lookup_oid(base)?;
        let options = &description[base.len()..];

        let arcs: Vec<String> = oid
            .split('.')
            .map(|arc| format!("{}{}", "0".repeat(up_to(rng, self.max_zeros)), arc))
            .collect();
        let prefix = if self.prepend_oid { "oID." } else { "" };
        Some(format!("{}{}{}", prefix, arcs.join("."), options))
    }
}

impl FilterMiddleware for OidAttributeObf {
    fn name(&self) -> &'static str {
        "oid"
    }

    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter {
        map_leaves(filter, &mut |leaf| {
            let Some(attribute) = leaf.attribute() else {
                return leaf.clone();
            };
            match self.obfuscate(attribute, rng) {
                Some(oid) => with_attribute(leaf, oid),
                None => leaf.clone(),
            }
        })
    }
}
