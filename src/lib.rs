//! ldapmorph - LDAP search filter and attribute list obfuscation
//!
//! Rewrites LDAP search filters and requested attribute lists into forms
//! that look different on the wire but match the same directory entries.
//! Intended for authorized testing of LDAP detection coverage.
//!
//! # Modules
//!
//! - `filter` - Owned filter AST, RFC 4515 rendering and leaf-wise transforms
//! - `catalog` - Attribute names, OIDs and value syntaxes
//! - `middleware` - Value primitives, filter and attribute-list obfuscators
//! - `options` - Tunables for the obfuscators
//! - `errors` - Diagnostics for the fallible edges (files, chain names)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ldapmorph::catalog::StaticCatalog;
//! use ldapmorph::filter::Filter;
//! use ldapmorph::middleware::{FilterMiddlewareKind, ObfuscationEngine};
//! use ldapmorph::options::Options;
//!
//! let chain = FilterMiddlewareKind::parse_chain("approx").unwrap();
//! let mut engine = ObfuscationEngine::from_kinds(
//!     &chain,
//!     &[],
//!     &Options::default(),
//!     Arc::new(StaticCatalog::builtin()),
//! )
//! .with_seed(42);
//!
//! let out = engine.obfuscate_filter(&Filter::eq("cn", "John"));
//! assert_eq!(out.to_string(), "(cn~=John)");
//! ```

pub mod catalog;
pub mod errors;
pub mod filter;
pub mod middleware;
pub mod options;

// Re-export commonly used types
pub use catalog::{AttributeCatalog, StaticCatalog, TokenFormat};
pub use errors::LdapMorphError;
pub use filter::Filter;
pub use middleware::{
    AttrListMiddleware, AttrListMiddlewareKind, FilterMiddleware, FilterMiddlewareKind,
    ObfuscationEngine,
};
pub use options::Options;
