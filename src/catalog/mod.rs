//! Attribute Catalog - Attribute metadata consumed by the obfuscators
//!
//! Maps attribute names to OIDs and classifies each attribute's value
//! syntax into a [`TokenFormat`], which decides what value obfuscations
//! are legal for it.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Value domain of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    /// Case-insensitive Unicode string
    StringUnicode,
    /// Integer holding an enumerated value
    IntEnumeration,
    /// Integer holding a time interval (100ns ticks)
    IntTimeInterval,
    /// Integer holding bit flags
    Bitwise,
    /// Distinguished name
    DnString,
    /// Syntax not known to the catalog
    Unknown,
}

impl TokenFormat {
    /// Integer syntaxes that tolerate leading zeros
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            TokenFormat::IntEnumeration | TokenFormat::IntTimeInterval | TokenFormat::Bitwise
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenFormat::StringUnicode => "string_unicode",
            TokenFormat::IntEnumeration => "int_enumeration",
            TokenFormat::IntTimeInterval => "int_time_interval",
            TokenFormat::Bitwise => "bitwise",
            TokenFormat::DnString => "dn_string",
            TokenFormat::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TokenFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only attribute metadata provider
pub trait AttributeCatalog: Send + Sync {
    /// OID for an attribute name (case-insensitive)
    fn lookup_oid(&self, name: &str) -> Option<&str>;

    /// Canonical attribute name for an OID
    fn lookup_name(&self, oid: &str) -> Option<&str>;

    /// All attribute names the catalog knows about
    fn known_attribute_names(&self) -> Vec<&str>;

    /// Token format of an attribute, if it is classified
    fn classify(&self, name: &str) -> Option<TokenFormat>;

    /// True if `candidate` resolves to a real attribute by name or OID
    fn is_known(&self, candidate: &str) -> bool {
        self.lookup_oid(candidate).is_some() || self.lookup_name(candidate).is_some()
    }
}

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    pub oid: String,
    #[serde(default = "default_format")]
    pub format: TokenFormat,
}

fn default_format() -> TokenFormat {
    TokenFormat::Unknown
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "attribute")]
    attributes: Vec<AttributeEntry>,
}

/// Error type for catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    ReadError(String),

    #[error("Failed to parse catalog file: {0}")]
    ParseError(String),

    #[error("Duplicate attribute '{0}' in catalog")]
    Duplicate(String),
}

/// In-memory catalog backed by hash maps
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, AttributeEntry>,
    by_oid: HashMap<String, String>,
}

impl StaticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of common Active Directory attributes
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (name, oid, format) in builtin::ATTRIBUTES {
            catalog.insert(AttributeEntry {
                name: name.to_string(),
                oid: oid.to_string(),
                format: *format,
            });
        }
        catalog
    }

    /// Build a catalog from explicit rows, rejecting duplicate names
    pub fn from_entries(entries: Vec<AttributeEntry>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for entry in entries {
            if catalog.entries.contains_key(&entry.name.to_lowercase()) {
                return Err(CatalogError::Duplicate(entry.name));
            }
            catalog.insert(entry);
        }
        Ok(catalog)
    }

    /// Parse a TOML catalog made of `[[attribute]]` tables
    pub fn parse_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        Self::from_entries(file.attributes)
    }

    /// Load a TOML catalog from disk
    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::ReadError(e.to_string()))?;
        let catalog = Self::parse_toml(&content)?;
        tracing::debug!(
            "Loaded {} catalog attributes from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Add or replace an attribute
    pub fn insert(&mut self, entry: AttributeEntry) {
        let key = entry.name.to_lowercase();
        if let Some(previous) = self.entries.get(&key) {
            let previous_oid = canonical_oid(&previous.oid).unwrap_or_else(|| previous.oid.clone());
            self.by_oid.remove(&previous_oid);
        }
        let oid = canonical_oid(&entry.oid).unwrap_or_else(|| entry.oid.clone());
        self.by_oid.insert(oid, key.clone());
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a name, `oid.`-prefixed OID or bare OID to the catalog row.
    /// Attribute options (`;binary`, `;lang-en`) are ignored.
    fn resolve(&self, description: &str) -> Option<&AttributeEntry> {
        let base = description.split(';').next().unwrap_or(description).trim();
        let lowered = base.to_lowercase();

        if let Some(entry) = self.entries.get(&lowered) {
            return Some(entry);
        }

        let oid = lowered.strip_prefix("oid.").unwrap_or(lowered.as_str());
        let canonical = canonical_oid(oid)?;
        self.by_oid
            .get(&canonical)
            .and_then(|key| self.entries.get(key))
    }
}

/// Strip leading zeros from each arc of a dotted OID; `None` if not an OID
pub fn canonical_oid(oid: &str) -> Option<String> {
    if oid.is_empty() {
        return None;
    }
    let mut arcs = Vec::new();
    for arc in oid.split('.') {
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = arc.trim_start_matches('0');
        arcs.push(if trimmed.is_empty() { "0" } else { trimmed });
    }
    Some(arcs.join("."))
}

impl AttributeCatalog for StaticCatalog {
    fn lookup_oid(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|entry| entry.oid.as_str())
    }

    fn lookup_name(&self, oid: &str) -> Option<&str> {
        let canonical = canonical_oid(oid)?;
        self.by_oid
            .get(&canonical)
            .and_then(|key| self.entries.get(key))
            .map(|entry| entry.name.as_str())
    }

    fn known_attribute_names(&self) -> Vec<&str> {
        let sorted: BTreeSet<&str> = self.entries.values().map(|e| e.name.as_str()).collect();
        sorted.into_iter().collect()
    }

    fn classify(&self, name: &str) -> Option<TokenFormat> {
        self.resolve(name)
            .map(|entry| entry.format)
            .filter(|format| *format != TokenFormat::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_common_attributes() {
        let catalog = StaticCatalog::builtin();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.lookup_oid("cn"), Some("2.5.4.3"));
        assert_eq!(catalog.lookup_oid("CN"), Some("2.5.4.3"));
        assert_eq!(catalog.lookup_name("2.5.4.3"), Some("cn"));
    }

    #[test]
    fn classify_is_case_insensitive() {
        let catalog = StaticCatalog::builtin();
        assert_eq!(catalog.classify("cn"), Some(TokenFormat::StringUnicode));
        assert_eq!(
            catalog.classify("USERACCOUNTCONTROL"),
            Some(TokenFormat::Bitwise)
        );
        assert_eq!(catalog.classify("memberOf"), Some(TokenFormat::DnString));
    }

    #[test]
    fn classify_resolves_oids_and_options() {
        let catalog = StaticCatalog::builtin();
        assert_eq!(catalog.classify("2.5.4.3"), Some(TokenFormat::StringUnicode));
        assert_eq!(
            catalog.classify("OID.2.5.4.03"),
            Some(TokenFormat::StringUnicode)
        );
        assert_eq!(
            catalog.classify("cn;lang-en"),
            Some(TokenFormat::StringUnicode)
        );
    }

    #[test]
    fn unknown_attributes_are_unclassified() {
        let catalog = StaticCatalog::builtin();
        assert_eq!(catalog.classify("zzzNotAnAttribute"), None);
        assert_eq!(catalog.lookup_oid("zzz"), None);
        assert!(!catalog.is_known("zzz"));
        assert!(catalog.is_known("2.5.4.3"));
    }

    #[test]
    fn unknown_format_is_reported_as_unclassified() {
        let catalog = StaticCatalog::from_entries(vec![AttributeEntry {
            name: "objectSid".to_string(),
            oid: "1.2.840.113556.1.4.146".to_string(),
            format: TokenFormat::Unknown,
        }])
        .unwrap();
        assert_eq!(catalog.classify("objectSid"), None);
        assert_eq!(catalog.lookup_oid("objectsid"), Some("1.2.840.113556.1.4.146"));
    }

    #[test]
    fn canonical_oid_strips_zeros() {
        assert_eq!(canonical_oid("2.05.004.3"), Some("2.5.4.3".to_string()));
        assert_eq!(canonical_oid("0.9"), Some("0.9".to_string()));
        assert_eq!(canonical_oid("cn"), None);
        assert_eq!(canonical_oid("1..2"), None);
    }

    #[test]
    fn parse_toml_catalog() {
        let content = r#"
[[attribute]]
name = "cn"
oid = "2.5.4.3"
format = "string_unicode"

[[attribute]]
name = "badPwdCount"
oid = "1.2.840.113556.1.4.12"
format = "int_enumeration"

[[attribute]]
name = "objectGUID"
oid = "1.2.840.113556.1.4.2"
"#;
        let catalog = StaticCatalog::parse_toml(content).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.classify("badpwdcount"),
            Some(TokenFormat::IntEnumeration)
        );
        assert_eq!(catalog.classify("objectGUID"), None);
    }

    #[test]
    fn parse_toml_rejects_duplicates() {
        let content = r#"
[[attribute]]
name = "cn"
oid = "2.5.4.3"

[[attribute]]
name = "CN"
oid = "2.5.4.3"
"#;
        let err = StaticCatalog::parse_toml(content).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
    }

    #[test]
    fn parse_toml_reports_syntax_errors() {
        let err = StaticCatalog::parse_toml("[[attribute]\nname=").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError(_)));
    }

    #[test]
    fn known_names_are_sorted() {
        let catalog = StaticCatalog::builtin();
        let names = catalog.known_attribute_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"sAMAccountName"));
    }
}
