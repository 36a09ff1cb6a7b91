//! Options - Flat tunables for the middlewares
//!
//! A passive string-keyed store seeded from [`DEFAULT_OPTIONS`]. Typed
//! getters never fail: a value that does not parse falls back to the
//! documented default and logs a warning.

use std::collections::HashMap;
use std::path::Path;

/// Documented option keys with their default values, in display order
pub const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("FiltSpacingMaxSpaces", "4"),
    ("FiltTimestampGarbageMaxChars", "6"),
    ("FiltAddBoolMaxDepth", "4"),
    ("FiltDblNegBoolMaxDepth", "1"),
    ("FiltAddWildcardProb", "0.7"),
    ("FiltPrependZerosMaxElems", "4"),
    ("FiltGarbageMaxElems", "4"),
    ("FiltGarbageMaxSize", "6"),
    (
        "FiltGarbageCharset",
        "abcdefghijklmnopqrsutwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
    ),
    ("FiltOIDAttributeMaxElems", "4"),
    ("FiltCaseProb", "0.7"),
    ("FiltHexValueProb", "0.7"),
    ("FiltOIDAttributePrependOID", "true"),
    ("FiltEqExtensibleAppendDN", "false"),
    ("FiltBitwiseDecompositionMaxBits", "32"),
    ("AttrsCaseProb", "0.7"),
    ("AttrsDuplicateMinElems", "0"),
    ("AttrsDuplicateMaxElems", "2"),
    ("AttrsGarbageExistingMaxElems", "4"),
    ("AttrsGarbageNonExistingMaxElems", "4"),
    ("AttrsGarbageNonExistingMaxSize", "6"),
    ("AttrsOIDSpacingMaxElems", "4"),
];

/// Look up the documented default for a key
pub fn default_value(key: &str) -> Option<&'static str> {
    DEFAULT_OPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Error type for options loading
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    ReadError(String),

    #[error("Failed to parse options file: {0}")]
    ParseError(String),

    #[error("Missing section: {0}")]
    MissingSection(String),

    #[error("Unknown option '{0}'")]
    UnknownKey(String),
}

/// Middleware tunables
#[derive(Debug, Clone)]
pub struct Options {
    values: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            values: DEFAULT_OPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Options {
    /// Options holding every documented default
    pub fn new() -> Self {
        Self::default()
    }

    /// Override one option. Unknown keys are rejected.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), OptionsError> {
        if default_value(key).is_none() {
            return Err(OptionsError::UnknownKey(key.to_string()));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    /// Builder form of [`Options::set`] for known-good keys
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        if let Err(e) = self.set(key, value) {
            tracing::warn!("{}", e);
        }
        self
    }

    /// Raw value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// (key, value) pairs in documented order
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        DEFAULT_OPTIONS
            .iter()
            .map(|(k, default)| (*k, self.get(k).unwrap_or(*default)))
            .collect()
    }

    /// String option, falling back to the default
    pub fn get_str(&self, key: &str) -> &str {
        self.get(key)
            .or_else(|| default_value(key))
            .unwrap_or_default()
    }

    /// Probability option clamped to `[0, 1]`
    pub fn get_f32(&self, key: &str) -> f32 {
        self.parse_or_default::<f32>(key)
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Non-negative integer option
    pub fn get_usize(&self, key: &str) -> usize {
        self.parse_or_default::<usize>(key).unwrap_or(0)
    }

    /// Boolean option
    pub fn get_bool(&self, key: &str) -> bool {
        self.parse_or_default::<bool>(key).unwrap_or(false)
    }

    fn parse_or_default<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        if let Some(raw) = self.get(key) {
            match raw.trim().parse::<T>() {
                Ok(value) => return Some(value),
                Err(_) => {
                    tracing::warn!(
                        "Invalid value '{}' for option {}, using default",
                        raw,
                        key
                    );
                }
            }
        }
        default_value(key).and_then(|d| d.parse::<T>().ok())
    }

    /// Load options from a TOML file with an `[options]` table
    pub fn load_from_path(path: &Path) -> Result<Self, OptionsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| OptionsError::ReadError(e.to_string()))?;
        let options = Self::parse_toml(&content)?;
        tracing::debug!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Parse options from TOML content.
    ///
    /// Values may be written as TOML strings, integers, floats or booleans;
    /// everything is stored in its string form.
    pub fn parse_toml(content: &str) -> Result<Self, OptionsError> {
        let table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| OptionsError::ParseError(e.to_string()))?;

        let section = table
            .get("options")
            .and_then(|v| v.as_table())
            .ok_or(OptionsError::MissingSection("[options]".to_string()))?;

        let mut options = Options::default();
        for (key, value) in section {
            let raw = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(OptionsError::ParseError(format!(
                        "unsupported value for {}: {}",
                        key, other
                    )))
                }
            };
            options.set(key, raw)?;
        }

        Ok(options)
    }

    /// Try the given path, then `./ldapmorph.toml`, then the user config
    /// directory; fall back to defaults when nothing is found.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let candidates = match path {
            Some(p) => vec![p.to_path_buf()],
            None => {
                let mut paths = vec![std::path::PathBuf::from("ldapmorph.toml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("ldapmorph").join("options.toml"));
                }
                paths
            }
        };

        for candidate in &candidates {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_path(candidate) {
                Ok(options) => return options,
                Err(e) => {
                    tracing::warn!("Failed to load options: {}, using defaults", e);
                    return Self::default();
                }
            }
        }

        tracing::debug!("No options file found, using defaults");
        Self::default()
    }
}
