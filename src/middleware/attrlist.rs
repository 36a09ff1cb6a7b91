//! Attribute-List Middlewares - Obfuscators over the requested attribute list
//!
//! Garbage, wildcard-append and reorder leave an empty list alone. The
//! replace middlewares ignore their input entirely.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::sync::Arc;

use super::filter::attribute_base;
use super::values::{below, random_case};
use super::{fresh_garbage_name, AttrListMiddleware};
use crate::catalog::AttributeCatalog;

/// Flip letter case of each name
#[derive(Debug, Clone, Copy)]
pub struct CaseAttrs {
    prob: f32,
}

impl CaseAttrs {
    pub fn new(prob: f32) -> Self {
        Self { prob }
    }
}

impl AttrListMiddleware for CaseAttrs {
    fn name(&self) -> &'static str {
        "case"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        attrs
            .iter()
            .map(|attr| random_case(attr, self.prob, rng))
            .collect()
    }
}

/// Replace names with their OID where the catalog has one
pub struct OidAttrs {
    catalog: Arc<dyn AttributeCatalog>,
}

impl OidAttrs {
    pub fn new(catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self { catalog }
    }
}

impl AttrListMiddleware for OidAttrs {
    fn name(&self) -> &'static str {
        "oid"
    }

    fn apply(&self, attrs: &[String], _rng: &mut dyn RngCore) -> Vec<String> {
        attrs
            .iter()
            .map(|attr| {
                let base = attribute_base(attr);
                match self.catalog.lookup_oid(base) {
                    Some(oid) => format!("{}{}", oid, &attr[base.len()..]),
                    None => attr.clone(),
                }
            })
            .collect()
    }
}

/// Append `0..max_spaces` trailing spaces to each name
#[derive(Debug, Clone, Copy)]
pub struct SpacingAttrs {
    max_spaces: usize,
}

impl SpacingAttrs {
    pub fn new(max_spaces: usize) -> Self {
        Self { max_spaces }
    }
}

impl AttrListMiddleware for SpacingAttrs {
    fn name(&self) -> &'static str {
        "spacing"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        attrs
            .iter()
            .map(|attr| format!("{}{}", attr, " ".repeat(below(rng, self.max_spaces))))
            .collect()
    }
}

/// Repeat each name `1 + min + below(max)` times in a row
#[derive(Debug, Clone, Copy)]
pub struct DuplicateAttrs {
    min_dups: usize,
    max_dups: usize,
}

impl DuplicateAttrs {
    pub fn new(min_dups: usize, max_dups: usize) -> Self {
        Self { min_dups, max_dups }
    }
}

impl AttrListMiddleware for DuplicateAttrs {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        let mut out = Vec::with_capacity(attrs.len() * (1 + self.min_dups));
        for attr in attrs {
            let copies = 1 + self.min_dups + below(rng, self.max_dups);
            out.extend(std::iter::repeat(attr.clone()).take(copies));
        }
        out
    }
}

/// Append `1..=max` names picked from the catalog
pub struct GarbageExistingAttrs {
    max_garbage: usize,
    catalog: Arc<dyn AttributeCatalog>,
}

impl GarbageExistingAttrs {
    pub fn new(max_garbage: usize, catalog: Arc<dyn AttributeCatalog>) -> Self {
        Self {
            max_garbage,
            catalog,
        }
    }
}

impl AttrListMiddleware for GarbageExistingAttrs {
    fn name(&self) -> &'static str {
        "garbage-existing"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        let known = self.catalog.known_attribute_names();
        if attrs.is_empty() || known.is_empty() || self.max_garbage == 0 {
            return attrs.to_vec();
        }

        let mut out = attrs.to_vec();
        let count = 1 + below(rng, self.max_garbage);
        for _ in 0..count {
            if let Some(name) = known.choose(rng) {
                out.push(name.to_string());
            }
        }
        out
    }
}

/// Append `1..=max` random names that resolve to no attribute
pub struct GarbageNonExistingAttrs {
    max_garbage: usize,
    size: usize,
    charset: String,
    catalog: Arc<dyn AttributeCatalog>,
}

impl GarbageNonExistingAttrs {
    pub fn new(
        max_garbage: usize,
        size: usize,
        charset: impl Into<String>,
        catalog: Arc<dyn AttributeCatalog>,
    ) -> Self {
        Self {
            max_garbage,
            size,
            charset: charset.into(),
            catalog,
        }
    }
}

impl AttrListMiddleware for GarbageNonExistingAttrs {
    fn name(&self) -> &'static str {
        "garbage-new"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        if attrs.is_empty() || self.max_garbage == 0 {
            return attrs.to_vec();
        }

        let mut out = attrs.to_vec();
        let count = 1 + below(rng, self.max_garbage);
        for _ in 0..count {
            match fresh_garbage_name(self.catalog.as_ref(), self.size, &self.charset, rng) {
                Some(name) => out.push(name),
                None => break,
            }
        }
        out
    }
}

/// Append `*`
#[derive(Debug, Clone, Copy, Default)]
pub struct AddWildcardAttrs;

impl AttrListMiddleware for AddWildcardAttrs {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn apply(&self, attrs: &[String], _rng: &mut dyn RngCore) -> Vec<String> {
        let mut out = attrs.to_vec();
        if !out.is_empty() {
            out.push("*".to_string());
        }
        out
    }
}

/// Replace the list with `["*"]`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceWithWildcardAttrs;

impl AttrListMiddleware for ReplaceWithWildcardAttrs {
    fn name(&self) -> &'static str {
        "replace-wildcard"
    }

    fn apply(&self, _attrs: &[String], _rng: &mut dyn RngCore) -> Vec<String> {
        vec!["*".to_string()]
    }
}

/// Replace the list with an empty one
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceWithEmptyAttrs;

impl AttrListMiddleware for ReplaceWithEmptyAttrs {
    fn name(&self) -> &'static str {
        "replace-empty"
    }

    fn apply(&self, _attrs: &[String], _rng: &mut dyn RngCore) -> Vec<String> {
        Vec::new()
    }
}

/// Shuffle the list
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderAttrs;

impl AttrListMiddleware for ReorderAttrs {
    fn name(&self) -> &'static str {
        "reorder"
    }

    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String> {
        let mut out = attrs.to_vec();
        out.shuffle(rng);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn catalog() -> Arc<dyn AttributeCatalog> {
        Arc::new(StaticCatalog::builtin())
    }

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn list(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn case_flips_letters_only() {
        let out = CaseAttrs::new(1.0).apply(&list(&["cn", "msDS-X1"]), &mut rng(1));
        assert_eq!(out, list(&["CN", "MSds-x1"]));
    }

    #[test]
    fn oid_substitution() {
        let out = OidAttrs::new(catalog()).apply(&list(&["cn", "zzz", "CN;binary"]), &mut rng(1));
        assert_eq!(out, list(&["2.5.4.3", "zzz", "2.5.4.3;binary"]));
    }

    #[test]
    fn spacing_is_trailing_and_bounded() {
        let obf = SpacingAttrs::new(4);
        for seed in 0..30 {
            let out = obf.apply(&list(&["cn"]), &mut rng(seed));
            assert!(out[0].starts_with("cn"));
            assert_eq!(out[0].trim_end(), "cn");
            assert!(out[0].len() - 2 < 4);
        }
        let out = SpacingAttrs::new(0).apply(&list(&["cn"]), &mut rng(1));
        assert_eq!(out, list(&["cn"]));
    }

    #[test]
    fn duplicate_counts_are_bounded() {
        let obf = DuplicateAttrs::new(1, 3);
        for seed in 0..50 {
            let out = obf.apply(&list(&["cn", "mail"]), &mut rng(seed));
            let cn = out.iter().take_while(|a| *a == "cn").count();
            let mail = out.iter().skip(cn).take_while(|a| *a == "mail").count();
            assert_eq!(cn + mail, out.len());
            assert!((2..=4).contains(&cn));
            assert!((2..=4).contains(&mail));
        }
    }

    #[test]
    fn duplicate_with_zero_max_copies_exactly() {
        let out = DuplicateAttrs::new(2, 0).apply(&list(&["cn"]), &mut rng(1));
        assert_eq!(out, list(&["cn", "cn", "cn"]));
    }

    #[test]
    fn garbage_existing_appends_known_names() {
        let catalog = StaticCatalog::builtin();
        let obf = GarbageExistingAttrs::new(3, Arc::new(catalog.clone()));
        for seed in 0..30 {
            let out = obf.apply(&list(&["cn"]), &mut rng(seed));
            assert_eq!(out[0], "cn");
            assert!((2..=4).contains(&out.len()));
            for name in &out[1..] {
                assert!(catalog.is_known(name));
            }
        }
    }

    #[test]
    fn garbage_non_existing_avoids_real_names() {
        let catalog = StaticCatalog::builtin();
        let obf = GarbageNonExistingAttrs::new(4, 2, "cnsuid", Arc::new(catalog.clone()));
        for seed in 0..50 {
            let out = obf.apply(&list(&["mail"]), &mut rng(seed));
            assert!((2..=5).contains(&out.len()));
            for name in &out[1..] {
                assert_eq!(name.len(), 2);
                assert!(!catalog.is_known(name));
            }
        }
    }

    #[test]
    fn empty_input_short_circuits() {
        let empty: Vec<String> = Vec::new();
        let mut r = rng(1);
        assert!(GarbageExistingAttrs::new(3, catalog()).apply(&empty, &mut r).is_empty());
        assert!(GarbageNonExistingAttrs::new(3, 4, "abc", catalog())
            .apply(&empty, &mut r)
            .is_empty());
        assert!(AddWildcardAttrs.apply(&empty, &mut r).is_empty());
        assert!(ReorderAttrs.apply(&empty, &mut r).is_empty());
        assert_eq!(ReplaceWithWildcardAttrs.apply(&empty, &mut r), list(&["*"]));
        assert!(ReplaceWithEmptyAttrs.apply(&empty, &mut r).is_empty());
    }

    #[test]
    fn wildcard_variants() {
        let attrs = list(&["cn", "mail"]);
        let mut r = rng(1);
        assert_eq!(AddWildcardAttrs.apply(&attrs, &mut r), list(&["cn", "mail", "*"]));
        assert_eq!(ReplaceWithWildcardAttrs.apply(&attrs, &mut r), list(&["*"]));
        assert!(ReplaceWithEmptyAttrs.apply(&attrs, &mut r).is_empty());
    }

    #[test]
    fn reorder_preserves_multiplicity() {
        let attrs = list(&["cn", "mail", "cn", "sn", "uid"]);
        for seed in 0..20 {
            let mut out = ReorderAttrs.apply(&attrs, &mut rng(seed));
            let mut expected = attrs.clone();
            out.sort();
            expected.sort();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn input_is_not_modified() {
        let attrs = list(&["cn", "mail"]);
        let snapshot = attrs.clone();
        let _ = ReorderAttrs.apply(&attrs, &mut rng(3));
        let _ = DuplicateAttrs::new(0, 2).apply(&attrs, &mut rng(3));
        assert_eq!(attrs, snapshot);
    }
}
