//! Integration tests for configuration loading
//!
//! Tests:
//! - Options files with typed TOML values
//! - Catalog files and their validation
//! - Chain parsing errors with suggestions

use std::io::Write;

use ldapmorph::catalog::{AttributeCatalog, StaticCatalog, TokenFormat};
use ldapmorph::errors::LdapMorphError;
use ldapmorph::middleware::{AttrListMiddlewareKind, FilterMiddlewareKind};
use ldapmorph::options::{Options, OptionsError};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_options_file_overrides_defaults() {
    let file = write_temp(
        r#"
[options]
FiltCaseProb = 0.25
FiltSpacingMaxSpaces = 9
FiltOIDAttributePrependOID = false
FiltGarbageCharset = "xyz"
"#,
    );

    let options = Options::load_from_path(file.path()).unwrap();
    assert!((options.get_f32("FiltCaseProb") - 0.25).abs() < f32::EPSILON);
    assert_eq!(options.get_usize("FiltSpacingMaxSpaces"), 9);
    assert!(!options.get_bool("FiltOIDAttributePrependOID"));
    assert_eq!(options.get_str("FiltGarbageCharset"), "xyz");

    // Untouched keys keep their defaults
    assert_eq!(options.get_usize("FiltAddBoolMaxDepth"), 4);
}

#[test]
fn test_load_or_default_with_explicit_path() {
    let file = write_temp("[options]\nAttrsDuplicateMaxElems = 7\n");
    let options = Options::load_or_default(Some(file.path()));
    assert_eq!(options.get_usize("AttrsDuplicateMaxElems"), 7);

    // Broken files fall back to defaults
    let broken = write_temp("[options\n");
    let options = Options::load_or_default(Some(broken.path()));
    assert_eq!(options.get_usize("AttrsDuplicateMaxElems"), 2);
}

#[test]
fn test_options_file_errors() {
    assert!(matches!(
        Options::parse_toml("[other]\nkey = 1\n"),
        Err(OptionsError::MissingSection(_))
    ));
    assert!(matches!(
        Options::parse_toml("[options]\nFiltCaseprob = 0.5\n"),
        Err(OptionsError::UnknownKey(_))
    ));
    assert!(matches!(
        Options::parse_toml("[options]\nFiltCaseProb = [1, 2]\n"),
        Err(OptionsError::ParseError(_))
    ));

    let err = LdapMorphError::options(
        "ldapmorph.toml",
        OptionsError::UnknownKey("FiltCaseprob".to_string()),
    );
    match err {
        LdapMorphError::UnknownOption { key, suggestion } => {
            assert_eq!(key, "FiltCaseprob");
            assert!(suggestion.contains("FiltCaseProb"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_catalog_file_loading() {
    let file = write_temp(
        r#"
[[attribute]]
name = "employeeNumber"
oid = "2.16.840.1.113730.3.1.3"
format = "string_unicode"

[[attribute]]
name = "loginCount"
oid = "1.2.840.113556.1.4.169"
format = "int_enumeration"

[[attribute]]
name = "opaque"
oid = "1.3.6.1.4.1.99999.7"
"#,
    );

    let catalog = StaticCatalog::load_from_path(file.path()).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(
        catalog.lookup_oid("EMPLOYEENUMBER"),
        Some("2.16.840.1.113730.3.1.3")
    );
    assert_eq!(catalog.classify("loginCount"), Some(TokenFormat::IntEnumeration));
    assert_eq!(catalog.classify("opaque"), None);
    assert!(catalog.is_known("1.3.6.1.4.1.99999.7"));
    assert!(!catalog.is_known("cn"));
}

#[test]
fn test_catalog_rejects_duplicates() {
    let file = write_temp(
        r#"
[[attribute]]
name = "cn"
oid = "2.5.4.3"

[[attribute]]
name = "CN"
oid = "2.5.4.3"
"#,
    );
    assert!(StaticCatalog::load_from_path(file.path()).is_err());
}

#[test]
fn test_chain_parsing() {
    let chain = FilterMiddlewareKind::parse_chain(" case, OID ,hex,").unwrap();
    let names: Vec<&str> = chain.iter().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["case", "oid", "hex"]);

    let chain = AttrListMiddlewareKind::parse_chain("replace-wildcard").unwrap();
    assert_eq!(chain.len(), 1);

    assert!(FilterMiddlewareKind::parse_chain("").unwrap().is_empty());
}

#[test]
fn test_chain_parsing_suggests_close_names() {
    let err = FilterMiddlewareKind::parse_chain("case,wildcrd").unwrap_err();
    match err {
        LdapMorphError::UnknownMiddleware {
            name,
            chain,
            suggestion,
        } => {
            assert_eq!(name, "wildcrd");
            assert_eq!(chain, "filter");
            assert!(suggestion.contains("wildcard"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = AttrListMiddlewareKind::parse_chain("garbage").unwrap_err();
    assert!(matches!(err, LdapMorphError::UnknownMiddleware { chain: "attribute list", .. }));
}
