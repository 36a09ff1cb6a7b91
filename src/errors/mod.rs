//! Error handling with miette diagnostics
//!
//! The obfuscation core never fails. These errors cover the edges around
//! it: chain names, option keys, filter input and configuration files.

pub mod suggestions;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::options::OptionsError;

/// Main error type for ldapmorph with rich diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum LdapMorphError {
    /// Middleware name not found in a chain
    #[error("Unknown {chain} middleware: '{name}'")]
    #[diagnostic(code(ldapmorph::chain::unknown), help("{suggestion}"))]
    UnknownMiddleware {
        name: String,
        chain: &'static str,
        suggestion: String,
    },

    /// Option key not in the documented table
    #[error("Unknown option: '{key}'")]
    #[diagnostic(code(ldapmorph::options::unknown), help("{suggestion}"))]
    UnknownOption { key: String, suggestion: String },

    /// `KEY=VALUE` override without `=`
    #[error("Invalid option override: '{raw}'")]
    #[diagnostic(
        code(ldapmorph::options::syntax),
        help("Overrides are written as KEY=VALUE, e.g. --set FiltCaseProb=0.5")
    )]
    InvalidOverride { raw: String },

    /// Options file could not be used
    #[error("Invalid options file {path}: {message}")]
    #[diagnostic(
        code(ldapmorph::options::invalid),
        help("Option files hold a single [options] table; see 'ldapmorph options' for keys")
    )]
    InvalidOptions { path: String, message: String },

    /// Catalog file could not be used
    #[error("Invalid catalog file {path}: {message}")]
    #[diagnostic(
        code(ldapmorph::catalog::invalid),
        help(
            "Catalog files hold [[attribute]] tables:\n  \
             [[attribute]]\n  name = \"cn\"\n  oid = \"2.5.4.3\"\n  format = \"string_unicode\""
        )
    )]
    InvalidCatalog { path: String, message: String },

    /// Filter input is not a valid JSON filter
    #[error("Failed to parse filter: {message}")]
    #[diagnostic(
        code(ldapmorph::filter::parse),
        help("Filters are JSON, e.g. {{\"equality_match\": {{\"attribute\": \"cn\", \"value\": \"John\"}}}}")
    )]
    InvalidFilter {
        message: String,
        #[source_code]
        src: Option<NamedSource<String>>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
    },

    /// File not found
    #[error("File not found: {path}")]
    #[diagnostic(
        code(ldapmorph::file::not_found),
        help("Check that the file path is correct and the file exists")
    )]
    FileNotFound { path: String },
}

impl LdapMorphError {
    /// Unknown middleware with a "did you mean" suggestion
    pub fn unknown_middleware(name: impl Into<String>, chain: &'static str, known: &[&str]) -> Self {
        let name = name.into();
        let suggestion = suggestions::suggest_middleware(&name, known);
        Self::UnknownMiddleware {
            name,
            chain,
            suggestion,
        }
    }

    /// Unknown option key with a "did you mean" suggestion
    pub fn unknown_option(key: impl Into<String>) -> Self {
        let key = key.into();
        let known: Vec<&str> = crate::options::DEFAULT_OPTIONS
            .iter()
            .map(|(k, _)| *k)
            .collect();
        let suggestion = suggestions::suggest_option(&key, &known);
        Self::UnknownOption { key, suggestion }
    }

    /// Options load failure
    pub fn options(path: impl Into<String>, err: OptionsError) -> Self {
        match err {
            OptionsError::UnknownKey(key) => Self::unknown_option(key),
            other => Self::InvalidOptions {
                path: path.into(),
                message: other.to_string(),
            },
        }
    }

    /// Catalog load failure
    pub fn catalog(path: impl Into<String>, err: CatalogError) -> Self {
        Self::InvalidCatalog {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// JSON filter parse failure, pointing at the offending position
    pub fn invalid_filter(name: &str, source: &str, err: &serde_json::Error) -> Self {
        let offset = line_column_offset(source, err.line(), err.column());
        Self::InvalidFilter {
            message: err.to_string(),
            src: Some(NamedSource::new(name, source.to_string())),
            span: offset.map(|o| SourceSpan::from((o, 1))),
        }
    }
}

/// Byte offset of a 1-based line and column, if it lies inside `source`
fn line_column_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = line_start + column.saturating_sub(1);
    (offset < source.len()).then_some(offset)
}

/// Add contextual hints to an error before printing it
pub fn format_error(err: &anyhow::Error) -> String {
    let err_string = err.to_string();
    let err_lower = err_string.to_lowercase();

    if err_lower.contains("middleware") {
        format!(
            "{}\n\nHint: Run 'ldapmorph middlewares' to see available middlewares",
            err
        )
    } else if err_lower.contains("option") {
        format!(
            "{}\n\nHint: Run 'ldapmorph options' to see option keys and values",
            err
        )
    } else if err_lower.contains("not found") {
        format!("{}\n\nHint: Check the path passed on the command line", err)
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_middleware_generates_suggestion() {
        let err = LdapMorphError::unknown_middleware("wildcrd", "filter", &["wildcard", "hex"]);
        if let LdapMorphError::UnknownMiddleware { suggestion, .. } = &err {
            assert!(suggestion.contains("wildcard"));
        } else {
            panic!("Expected UnknownMiddleware");
        }
        assert_eq!(err.to_string(), "Unknown filter middleware: 'wildcrd'");
    }

    #[test]
    fn unknown_option_generates_suggestion() {
        let err = LdapMorphError::unknown_option("FiltCaseProbb");
        if let LdapMorphError::UnknownOption { suggestion, .. } = err {
            assert!(suggestion.contains("FiltCaseProb"));
        } else {
            panic!("Expected UnknownOption");
        }
    }

    #[test]
    fn options_error_maps_unknown_keys() {
        let err = LdapMorphError::options("x.toml", OptionsError::UnknownKey("Bogus".into()));
        assert!(matches!(err, LdapMorphError::UnknownOption { .. }));

        let err = LdapMorphError::options("x.toml", OptionsError::ParseError("bad".into()));
        assert!(matches!(err, LdapMorphError::InvalidOptions { .. }));
    }

    #[test]
    fn invalid_filter_points_at_error() {
        let source = "{\n  \"present\": }";
        let err = serde_json::from_str::<crate::filter::Filter>(source).unwrap_err();
        let err = LdapMorphError::invalid_filter("input", source, &err);
        if let LdapMorphError::InvalidFilter { span, .. } = err {
            let span = span.expect("span inside source");
            assert!(span.offset() > 2);
            assert!(span.offset() < source.len());
        } else {
            panic!("Expected InvalidFilter");
        }
    }

    #[test]
    fn line_column_offset_counts_lines() {
        assert_eq!(line_column_offset("ab\ncd", 2, 2), Some(4));
        assert_eq!(line_column_offset("ab", 1, 1), Some(0));
        assert_eq!(line_column_offset("ab", 0, 0), None);
        assert_eq!(line_column_offset("ab", 1, 9), None);
    }

    #[test]
    fn format_error_adds_hints() {
        let err = anyhow::anyhow!("Unknown filter middleware: 'x'");
        assert!(format_error(&err).contains("ldapmorph middlewares"));

        let err = anyhow::anyhow!("something else");
        assert_eq!(format_error(&err), "something else");
    }
}
