//! Middleware Registry - Names, descriptions and construction of middlewares
//!
//! Chains are written as comma-separated names (`"oid,case,hex"`) and
//! applied left to right.

use std::str::FromStr;
use std::sync::Arc;

use super::attrlist::{
    AddWildcardAttrs, CaseAttrs, DuplicateAttrs, GarbageExistingAttrs, GarbageNonExistingAttrs,
    OidAttrs, ReorderAttrs, ReplaceWithEmptyAttrs, ReplaceWithWildcardAttrs, SpacingAttrs,
};
use super::filter::{
    ApproxMatchObf, BitwiseDecompositionObf, EqualityToExtensibleObf, OidAttributeObf,
    RandAddBoolObf, RandAddWildcardObf, RandBoolReorderObf, RandCaseObf, RandDblNegBoolObf,
    RandGarbageObf, RandHexValueObf, RandPrependZerosObf, RandSpacingObf, RandTimestampSuffixObf,
};
use super::values::GeneralizedTimeRecognizer;
use super::{AttrListMiddleware, FilterMiddleware};
use crate::catalog::AttributeCatalog;
use crate::errors::LdapMorphError;
use crate::options::{default_value, Options};

/// Upper bound for count, depth and size options
pub const MAX_OPTION_BOUND: usize = 64;

/// Integer option capped at [`MAX_OPTION_BOUND`]
fn bounded(options: &Options, key: &str) -> usize {
    let value = options.get_usize(key);
    if value > MAX_OPTION_BOUND {
        tracing::warn!(
            "{} = {} exceeds {}, using {}",
            key,
            value,
            MAX_OPTION_BOUND,
            MAX_OPTION_BOUND
        );
        MAX_OPTION_BOUND
    } else {
        value
    }
}

/// Charset used when the configured one is empty
fn garbage_charset(options: &Options) -> String {
    let charset = options.get_str("FiltGarbageCharset");
    if charset.is_empty() {
        tracing::warn!("FiltGarbageCharset is empty, using the default charset");
        default_value("FiltGarbageCharset")
            .unwrap_or_default()
            .to_string()
    } else {
        charset.to_string()
    }
}

/// Split a comma-separated chain into trimmed, non-empty names
fn chain_names(chain: &str) -> impl Iterator<Item = &str> {
    chain.split(',').map(str::trim).filter(|name| !name.is_empty())
}

/// Filter middlewares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMiddlewareKind {
    // Value rewrites
    /// Equality to approximate match
    ApproxMatch,
    /// Hex-escape string values
    HexValue,
    /// Letter garbage in timestamp fractions
    TimestampGarbage,
    /// Leading zeros on integers
    PrependZeros,
    /// Whitespace in ANR and DN values
    Spacing,
    /// Split values around new wildcards
    AddWildcard,

    // Attribute rewrites
    /// Random letter case
    Case,
    /// Attribute names as OIDs
    OidAttribute,

    // Structure rewrites
    /// Single-child AND/OR wrappers
    AddBool,
    /// Double negation
    DblNegBool,
    /// Shuffle AND/OR children
    BoolReorder,
    /// OR with never-matching garbage
    Garbage,
    /// Equality to extensible match
    EqExtensible,
    /// One bitwise match per set bit
    BitwiseDecomposition,
}

impl FilterMiddlewareKind {
    /// Get all filter middlewares
    pub fn all() -> Vec<Self> {
        vec![
            Self::ApproxMatch,
            Self::HexValue,
            Self::TimestampGarbage,
            Self::PrependZeros,
            Self::Spacing,
            Self::AddWildcard,
            Self::Case,
            Self::OidAttribute,
            Self::AddBool,
            Self::DblNegBool,
            Self::BoolReorder,
            Self::Garbage,
            Self::EqExtensible,
            Self::BitwiseDecomposition,
        ]
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproxMatch => "approx",
            Self::HexValue => "hex",
            Self::TimestampGarbage => "timestamp",
            Self::PrependZeros => "zeros",
            Self::Spacing => "spacing",
            Self::AddWildcard => "wildcard",
            Self::Case => "case",
            Self::OidAttribute => "oid",
            Self::AddBool => "bool",
            Self::DblNegBool => "dblneg",
            Self::BoolReorder => "reorder",
            Self::Garbage => "garbage",
            Self::EqExtensible => "extensible",
            Self::BitwiseDecomposition => "bitwise",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ApproxMatch => "Rewrite (a=v) as (a~=v)",
            Self::HexValue => "Hex-escape characters of string values",
            Self::TimestampGarbage => "Insert letters into timestamp fractions",
            Self::PrependZeros => "Prepend zeros to integer values",
            Self::Spacing => "Add whitespace to ANR and DN values",
            Self::AddWildcard => "Split values around added wildcards",
            Self::Case => "Randomize letter case of attributes and string values",
            Self::OidAttribute => "Replace attribute names with padded OIDs",
            Self::AddBool => "Wrap leaves in single-child AND/OR nodes",
            Self::DblNegBool => "Wrap leaves in double negations",
            Self::BoolReorder => "Shuffle children of AND/OR nodes",
            Self::Garbage => "OR leaves with matches on non-existing attributes",
            Self::EqExtensible => "Rewrite (a=v) as (a:=v)",
            Self::BitwiseDecomposition => "Split bitwise AND/OR matches per set bit",
        }
    }

    /// Option keys the middleware reads
    pub fn option_keys(&self) -> &'static [&'static str] {
        match self {
            Self::ApproxMatch | Self::BoolReorder => &[],
            Self::HexValue => &["FiltHexValueProb"],
            Self::TimestampGarbage => &["FiltTimestampGarbageMaxChars"],
            Self::PrependZeros => &["FiltPrependZerosMaxElems"],
            Self::Spacing => &["FiltSpacingMaxSpaces"],
            Self::AddWildcard => &["FiltAddWildcardProb"],
            Self::Case => &["FiltCaseProb"],
            Self::OidAttribute => &["FiltOIDAttributeMaxElems", "FiltOIDAttributePrependOID"],
            Self::AddBool => &["FiltAddBoolMaxDepth"],
            Self::DblNegBool => &["FiltDblNegBoolMaxDepth"],
            Self::Garbage => &[
                "FiltGarbageMaxElems",
                "FiltGarbageMaxSize",
                "FiltGarbageCharset",
            ],
            Self::EqExtensible => &["FiltEqExtensibleAppendDN"],
            Self::BitwiseDecomposition => &["FiltBitwiseDecompositionMaxBits"],
        }
    }

    /// Construct the middleware from options and a catalog
    pub fn build(
        &self,
        options: &Options,
        catalog: Arc<dyn AttributeCatalog>,
    ) -> Box<dyn FilterMiddleware> {
        match self {
            Self::ApproxMatch => Box::new(ApproxMatchObf),
            Self::HexValue => Box::new(RandHexValueObf::new(
                options.get_f32("FiltHexValueProb"),
                catalog,
            )),
            Self::TimestampGarbage => Box::new(RandTimestampSuffixObf::new(
                true,
                true,
                bounded(options, "FiltTimestampGarbageMaxChars"),
                Arc::new(GeneralizedTimeRecognizer::new()),
                catalog,
            )),
            Self::PrependZeros => Box::new(RandPrependZerosObf::new(
                bounded(options, "FiltPrependZerosMaxElems"),
                catalog,
            )),
            Self::Spacing => Box::new(RandSpacingObf::new(
                bounded(options, "FiltSpacingMaxSpaces"),
                catalog,
            )),
            Self::AddWildcard => Box::new(RandAddWildcardObf::new(
                options.get_f32("FiltAddWildcardProb"),
                catalog,
            )),
            Self::Case => Box::new(RandCaseObf::new(options.get_f32("FiltCaseProb"), catalog)),
            Self::OidAttribute => Box::new(OidAttributeObf::new(
                bounded(options, "FiltOIDAttributeMaxElems"),
                options.get_bool("FiltOIDAttributePrependOID"),
                catalog,
            )),
            Self::AddBool => Box::new(RandAddBoolObf::new(
                bounded(options, "FiltAddBoolMaxDepth"),
            )),
            Self::DblNegBool => Box::new(RandDblNegBoolObf::new(
                bounded(options, "FiltDblNegBoolMaxDepth"),
            )),
            Self::BoolReorder => Box::new(RandBoolReorderObf),
            Self::Garbage => Box::new(RandGarbageObf::new(
                bounded(options, "FiltGarbageMaxElems"),
                bounded(options, "FiltGarbageMaxSize").max(1),
                garbage_charset(options),
                catalog,
            )),
            Self::EqExtensible => Box::new(EqualityToExtensibleObf::new(
                options.get_bool("FiltEqExtensibleAppendDN"),
            )),
            Self::BitwiseDecomposition => Box::new(BitwiseDecompositionObf::new(
                bounded(options, "FiltBitwiseDecompositionMaxBits"),
            )),
        }
    }

    /// Parse a comma-separated chain such as `"oid,case,hex"`
    pub fn parse_chain(chain: &str) -> Result<Vec<Self>, LdapMorphError> {
        chain_names(chain).map(str::parse).collect()
    }
}

impl FromStr for FilterMiddlewareKind {
    type Err = LdapMorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|k| k.as_str()).collect();
                LdapMorphError::unknown_middleware(s.trim(), "filter", &known)
            })
    }
}

impl std::fmt::Display for FilterMiddlewareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attribute-list middlewares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrListMiddlewareKind {
    /// Random letter case
    Case,
    /// Names as OIDs
    OidAttribute,
    /// Trailing spaces
    Spacing,
    /// Consecutive copies of each name
    Duplicate,
    /// Extra names of real attributes
    GarbageExisting,
    /// Extra names of non-existing attributes
    GarbageNonExisting,
    /// Append `*`
    AddWildcard,
    /// Replace the list with `*`
    ReplaceWithWildcard,
    /// Replace the list with nothing
    ReplaceWithEmpty,
    /// Shuffle the list
    Reorder,
}

impl AttrListMiddlewareKind {
    /// Get all attribute-list middlewares
    pub fn all() -> Vec<Self> {
        vec![
            Self::Case,
            Self::OidAttribute,
            Self::Spacing,
            Self::Duplicate,
            Self::GarbageExisting,
            Self::GarbageNonExisting,
            Self::AddWildcard,
            Self::ReplaceWithWildcard,
            Self::ReplaceWithEmpty,
            Self::Reorder,
        ]
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::OidAttribute => "oid",
            Self::Spacing => "spacing",
            Self::Duplicate => "duplicate",
            Self::GarbageExisting => "garbage-existing",
            Self::GarbageNonExisting => "garbage-new",
            Self::AddWildcard => "wildcard",
            Self::ReplaceWithWildcard => "replace-wildcard",
            Self::ReplaceWithEmpty => "replace-empty",
            Self::Reorder => "reorder",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Case => "Randomize letter case of names",
            Self::OidAttribute => "Replace names with OIDs",
            Self::Spacing => "Append spaces to names",
            Self::Duplicate => "Repeat each name",
            Self::GarbageExisting => "Append names of real attributes",
            Self::GarbageNonExisting => "Append names of non-existing attributes",
            Self::AddWildcard => "Append '*'",
            Self::ReplaceWithWildcard => "Replace the list with '*'",
            Self::ReplaceWithEmpty => "Replace the list with an empty list",
            Self::Reorder => "Shuffle the list",
        }
    }

    /// Option keys the middleware reads
    pub fn option_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Case => &["AttrsCaseProb"],
            Self::Spacing => &["AttrsOIDSpacingMaxElems"],
            Self::Duplicate => &["AttrsDuplicateMinElems", "AttrsDuplicateMaxElems"],
            Self::GarbageExisting => &["AttrsGarbageExistingMaxElems"],
            Self::GarbageNonExisting => &[
                "AttrsGarbageNonExistingMaxElems",
                "AttrsGarbageNonExistingMaxSize",
                "FiltGarbageCharset",
            ],
            Self::OidAttribute
            | Self::AddWildcard
            | Self::ReplaceWithWildcard
            | Self::ReplaceWithEmpty
            | Self::Reorder => &[],
        }
    }

    /// Construct the middleware from options and a catalog
    pub fn build(
        &self,
        options: &Options,
        catalog: Arc<dyn AttributeCatalog>,
    ) -> Box<dyn AttrListMiddleware> {
        match self {
            Self::Case => Box::new(CaseAttrs::new(options.get_f32("AttrsCaseProb"))),
            Self::OidAttribute => Box::new(OidAttrs::new(catalog)),
            Self::Spacing => Box::new(SpacingAttrs::new(
                bounded(options, "AttrsOIDSpacingMaxElems"),
            )),
            Self::Duplicate => Box::new(DuplicateAttrs::new(
                bounded(options, "AttrsDuplicateMinElems"),
                bounded(options, "AttrsDuplicateMaxElems"),
            )),
            Self::GarbageExisting => Box::new(GarbageExistingAttrs::new(
                bounded(options, "AttrsGarbageExistingMaxElems"),
                catalog,
            )),
            Self::GarbageNonExisting => Box::new(GarbageNonExistingAttrs::new(
                bounded(options, "AttrsGarbageNonExistingMaxElems"),
                bounded(options, "AttrsGarbageNonExistingMaxSize").max(1),
                garbage_charset(options),
                catalog,
            )),
            Self::AddWildcard => Box::new(AddWildcardAttrs),
            Self::ReplaceWithWildcard => Box::new(ReplaceWithWildcardAttrs),
            Self::ReplaceWithEmpty => Box::new(ReplaceWithEmptyAttrs),
            Self::Reorder => Box::new(ReorderAttrs),
        }
    }

    /// Parse a comma-separated chain such as `"oid,case,duplicate"`
    pub fn parse_chain(chain: &str) -> Result<Vec<Self>, LdapMorphError> {
        chain_names(chain).map(str::parse).collect()
    }
}

impl FromStr for AttrListMiddlewareKind {
    type Err = LdapMorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|k| k.as_str()).collect();
                LdapMorphError::unknown_middleware(s.trim(), "attribute list", &known)
            })
    }
}

impl std::fmt::Display for AttrListMiddlewareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
