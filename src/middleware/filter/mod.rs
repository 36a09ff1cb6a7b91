//! Filter Middlewares - Obfuscators over whole filter trees
//!
//! Value obfuscators look up the leaf's attribute in the catalog and only
//! touch value slots whose token format tolerates the rewrite. Structural
//! obfuscators change node shape but keep the set of matched entries.

pub mod attribute;
pub mod structure;
pub mod value;

use crate::catalog::{canonical_oid, AttributeCatalog, TokenFormat};
use crate::filter::{Filter, SubstringFilter};

pub use self::attribute::{OidAttributeObf, RandCaseObf};
pub use self::structure::{
    BitwiseDecompositionObf, EqualityToExtensibleObf, RandAddBoolObf, RandBoolReorderObf,
    RandDblNegBoolObf, RandGarbageObf,
};
pub use self::value::{
    ApproxMatchObf, RandAddWildcardObf, RandHexValueObf, RandPrependZerosObf, RandSpacingObf,
    RandTimestampSuffixObf,
};

/// Where a value sits inside a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSlot {
    /// Value of an equality, ordering or approximate match
    Assertion,
    /// Value of an extensible match
    Extensible,
    /// Substring `initial` component
    Initial,
    /// One substring `any` component
    Any,
    /// Substring `final` component
    Final,
}

/// Rebuild `leaf` with every value passed through `rewrite(slot, value)`.
///
/// Presence filters and compound nodes are returned unchanged.
pub(crate) fn map_values<F>(leaf: &Filter, mut rewrite: F) -> Filter
where
    F: FnMut(ValueSlot, &str) -> String,
{
    match leaf {
        Filter::EqualityMatch(ava) => {
            let mut ava = ava.clone();
            ava.value = rewrite(ValueSlot::Assertion, &ava.value);
            Filter::EqualityMatch(ava)
        }
        Filter::GreaterOrEqual(ava) => {
            let mut ava = ava.clone();
            ava.value = rewrite(ValueSlot::Assertion, &ava.value);
            Filter::GreaterOrEqual(ava)
        }
        Filter::LessOrEqual(ava) => {
            let mut ava = ava.clone();
            ava.value = rewrite(ValueSlot::Assertion, &ava.value);
            Filter::LessOrEqual(ava)
        }
        Filter::ApproxMatch(ava) => {
            let mut ava = ava.clone();
            ava.value = rewrite(ValueSlot::Assertion, &ava.value);
            Filter::ApproxMatch(ava)
        }
        Filter::ExtensibleMatch(mra) => {
            let mut mra = mra.clone();
            mra.value = rewrite(ValueSlot::Extensible, &mra.value);
            Filter::ExtensibleMatch(mra)
        }
        Filter::Substrings(sub) => Filter::Substrings(SubstringFilter {
            attribute: sub.attribute.clone(),
            initial: sub
                .initial
                .as_deref()
                .map(|v| rewrite(ValueSlot::Initial, v)),
            any: sub
                .any
                .iter()
                .map(|v| rewrite(ValueSlot::Any, v))
                .collect(),
            r#final: sub.r#final.as_deref().map(|v| rewrite(ValueSlot::Final, v)),
        }),
        Filter::Present(_) | Filter::And(_) | Filter::Or(_) | Filter::Not(_) => leaf.clone(),
    }
}

/// Token format of the leaf's attribute, `None` when it has no attribute or
/// the catalog cannot classify it
pub(crate) fn leaf_format(catalog: &dyn AttributeCatalog, leaf: &Filter) -> Option<TokenFormat> {
    leaf.attribute().and_then(|attr| catalog.classify(attr))
}

/// Attribute description with its `;options` removed
pub(crate) fn attribute_base(description: &str) -> &str {
    description.split(';').next().unwrap_or(description)
}

/// Dotted OID of the ANR pseudo-attribute
const ANR_OID: &str = "1.2.840.113556.1.4.1208";

/// Remove a case-insensitive `oid.` prefix
pub(crate) fn strip_oid_prefix(description: &str) -> &str {
    match description.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("oid.") => &description[4..],
        _ => description,
    }
}

/// True if the description names ANR, spelled as `anr`, its OID, or an
/// OID the catalog maps to `anr`
pub(crate) fn is_anr(catalog: &dyn AttributeCatalog, description: &str) -> bool {
    let base = attribute_base(description).trim();
    if base.eq_ignore_ascii_case("anr") {
        return true;
    }
    let oid = strip_oid_prefix(base);
    canonical_oid(oid).as_deref() == Some(ANR_OID)
        || catalog
            .lookup_name(oid)
            .is_some_and(|name| name.eq_ignore_ascii_case("anr"))
}

/// Rename the attribute a leaf asserts on; leaves without one are unchanged
pub(crate) fn with_attribute(leaf: &Filter, attribute: String) -> Filter {
    let mut out = leaf.clone();
    match &mut out {
        Filter::EqualityMatch(ava)
        | Filter::GreaterOrEqual(ava)
        | Filter::LessOrEqual(ava)
        | Filter::ApproxMatch(ava) => ava.attribute = attribute,
        Filter::Substrings(sub) => sub.attribute = attribute,
        Filter::Present(attr) => *attr = attribute,
        Filter::ExtensibleMatch(mra) => {
            if mra.attribute.is_some() {
                mra.attribute = Some(attribute);
            }
        }
        Filter::And(_) | Filter::Or(_) | Filter::Not(_) => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    #[test]
    fn map_values_visits_every_slot() {
        let f = Filter::substrings("sn", Some("a"), &["b", "c"], Some("d"));
        let mut seen = Vec::new();
        let out = map_values(&f, |slot, v| {
            seen.push((slot, v.to_string()));
            v.to_uppercase()
        });
        assert_eq!(out.to_string(), "(sn=A*B*C*D)");
        assert_eq!(
            seen,
            vec![
                (ValueSlot::Initial, "a".to_string()),
                (ValueSlot::Any, "b".to_string()),
                (ValueSlot::Any, "c".to_string()),
                (ValueSlot::Final, "d".to_string()),
            ]
        );
    }

    #[test]
    fn map_values_distinguishes_extensible() {
        let f = Filter::extensible(Some("cn"), None, "x", false);
        let mut slots = Vec::new();
        map_values(&f, |slot, v| {
            slots.push(slot);
            v.to_string()
        });
        assert_eq!(slots, vec![ValueSlot::Extensible]);
    }

    #[test]
    fn map_values_skips_presence() {
        let f = Filter::present("cn");
        let out = map_values(&f, |_, _| panic!("presence has no value"));
        assert_eq!(out, f);
    }

    #[test]
    fn leaf_format_uses_catalog() {
        let catalog = StaticCatalog::builtin();
        assert_eq!(
            leaf_format(&catalog, &Filter::eq("cn", "x")),
            Some(TokenFormat::StringUnicode)
        );
        assert_eq!(leaf_format(&catalog, &Filter::eq("zzz", "x")), None);
        assert_eq!(
            leaf_format(&catalog, &Filter::extensible(None, Some("2.5.13.2"), "x", false)),
            None
        );
    }

    #[test]
    fn with_attribute_renames_leaves() {
        let f = with_attribute(&Filter::present("cn"), "2.5.4.3".to_string());
        assert_eq!(f.to_string(), "(2.5.4.3=*)");

        let anonymous = Filter::extensible(None, Some("2.5.13.2"), "x", false);
        assert_eq!(with_attribute(&anonymous, "cn".to_string()), anonymous);
    }

    #[test]
    fn anr_is_recognised_in_every_spelling() {
        let catalog = StaticCatalog::builtin();
        for spelling in [
            "anr",
            "aNR;x-opt",
            "1.2.840.113556.1.4.1208",
            "oID.1.2.840.113556.1.4.1208",
            "OID.01.02.0840.113556.1.4.01208",
        ] {
            assert!(is_anr(&catalog, spelling), "{spelling}");
        }
        assert!(!is_anr(&catalog, "cn"));
        assert!(!is_anr(&catalog, "oID.2.5.4.3"));
        assert!(is_anr(&StaticCatalog::new(), "oid.1.2.840.113556.1.4.1208"));
    }

    #[test]
    fn oid_prefix_is_case_insensitive() {
        assert_eq!(strip_oid_prefix("oID.2.5.4.3"), "2.5.4.3");
        assert_eq!(strip_oid_prefix("2.5.4.3"), "2.5.4.3");
        assert_eq!(strip_oid_prefix("oi"), "oi");
    }

    #[test]
    fn attribute_base_drops_options() {
        assert_eq!(attribute_base("cn;lang-en"), "cn");
        assert_eq!(attribute_base("cn"), "cn");
    }
}
