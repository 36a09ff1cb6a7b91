//! Middleware Module - Obfuscation chains for filters and attribute lists
//!
//! A middleware is a total function from a filter (or attribute list) to a
//! new one of the same type. Middlewares never mutate their input and draw
//! all randomness from the generator handed to them, so the engine that owns
//! the generator decides seeding and sharing.

pub mod attrlist;
pub mod filter;
pub mod registry;
pub mod values;

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::catalog::AttributeCatalog;
use crate::filter::Filter;

pub use self::registry::{AttrListMiddlewareKind, FilterMiddlewareKind};

/// Give up on a garbage name after this many collisions with real attributes
const MAX_GARBAGE_ATTEMPTS: usize = 1000;

/// Rewrites a whole filter tree
pub trait FilterMiddleware: Send + Sync {
    /// Short name used in chains and logs
    fn name(&self) -> &'static str;

    /// Produce an obfuscated copy of `filter`
    fn apply(&self, filter: &Filter, rng: &mut dyn RngCore) -> Filter;
}

/// Rewrites the attribute selection list of a search request
pub trait AttrListMiddleware: Send + Sync {
    /// Short name used in chains and logs
    fn name(&self) -> &'static str;

    /// Produce an obfuscated copy of `attrs`
    fn apply(&self, attrs: &[String], rng: &mut dyn RngCore) -> Vec<String>;
}

/// Random attribute name that resolves to nothing in the catalog.
///
/// Names are keystrings: a letter from `charset` followed by letters, digits
/// or hyphens from it, so a strict server still parses the filter.
/// Candidates colliding with a known name or OID are regenerated. Returns
/// `None` when no fresh name turns up within the attempt budget, which only
/// happens with a degenerate charset or size.
pub(crate) fn fresh_garbage_name(
    catalog: &dyn AttributeCatalog,
    size: usize,
    charset: &str,
    rng: &mut dyn RngCore,
) -> Option<String> {
    let leading: String = charset.chars().filter(char::is_ascii_alphabetic).collect();
    let trailing: String = charset
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if size == 0 || leading.is_empty() {
        tracing::warn!(
            "Cannot build attribute names of size {} from charset {:?}",
            size,
            charset
        );
        return None;
    }

    for _ in 0..MAX_GARBAGE_ATTEMPTS {
        let mut candidate = values::random_garbage(1, &leading, rng);
        candidate.push_str(&values::random_garbage(size - 1, &trailing, rng));
        if !catalog.is_known(&candidate) {
            return Some(candidate);
        }
    }
    tracing::warn!(
        "No unused garbage name after {} attempts (size {}, charset {:?})",
        MAX_GARBAGE_ATTEMPTS,
        size,
        charset
    );
    None
}

/// Runs an ordered filter chain and an ordered attribute-list chain
pub struct ObfuscationEngine {
    filter_chain: Vec<Box<dyn FilterMiddleware>>,
    attr_chain: Vec<Box<dyn AttrListMiddleware>>,
    rng: SmallRng,
}

impl Default for ObfuscationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ObfuscationEngine {
    /// Engine with empty chains and an entropy-seeded generator
    pub fn new() -> Self {
        Self {
            filter_chain: Vec::new(),
            attr_chain: Vec::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Build both chains from registry kinds
    pub fn from_kinds(
        filter_kinds: &[FilterMiddlewareKind],
        attr_kinds: &[AttrListMiddlewareKind],
        options: &crate::options::Options,
        catalog: std::sync::Arc<dyn AttributeCatalog>,
    ) -> Self {
        let mut engine = Self::new();
        for kind in filter_kinds {
            engine
                .filter_chain
                .push(kind.build(options, catalog.clone()));
        }
        for kind in attr_kinds {
            engine.attr_chain.push(kind.build(options, catalog.clone()));
        }
        engine
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Append a filter middleware to the chain
    pub fn with_filter_middleware(mut self, middleware: Box<dyn FilterMiddleware>) -> Self {
        self.filter_chain.push(middleware);
        self
    }

    /// Append an attribute-list middleware to the chain
    pub fn with_attr_middleware(mut self, middleware: Box<dyn AttrListMiddleware>) -> Self {
        self.attr_chain.push(middleware);
        self
    }

    /// Names of the filter chain, in application order
    pub fn filter_chain(&self) -> Vec<&'static str> {
        self.filter_chain.iter().map(|m| m.name()).collect()
    }

    /// Names of the attribute-list chain, in application order
    pub fn attr_chain(&self) -> Vec<&'static str> {
        self.attr_chain.iter().map(|m| m.name()).collect()
    }

    /// Run `filter` through every filter middleware in order
    pub fn obfuscate_filter(&mut self, filter: &Filter) -> Filter {
        let mut current = filter.clone();
        for middleware in &self.filter_chain {
            current = middleware.apply(&current, &mut self.rng);
            tracing::debug!("{}: {}", middleware.name(), current);
        }
        current
    }

    /// Run `attrs` through every attribute-list middleware in order
    pub fn obfuscate_attributes(&mut self, attrs: &[String]) -> Vec<String> {
        let mut current = attrs.to_vec();
        for middleware in &self.attr_chain {
            current = middleware.apply(&current, &mut self.rng);
            tracing::debug!("{}: {:?}", middleware.name(), current);
        }
        current
    }
}
