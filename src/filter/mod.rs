//! Filter AST - Owned representation of RFC 4515 search filters
//!
//! Values are stored in their escaped wire form (`\2a` for a literal `*`),
//! so rendering a filter back to text never re-escapes anything.

pub mod transform;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use self::transform::map_leaves;

/// An LDAP search filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// `(&(a)(b)...)`
    And(Vec<Filter>),
    /// `(|(a)(b)...)`
    Or(Vec<Filter>),
    /// `(!(a))`
    Not(Box<Filter>),
    /// `(attr=value)`
    EqualityMatch(AttributeValueAssertion),
    /// `(attr=initial*any*final)`
    Substrings(SubstringFilter),
    /// `(attr>=value)`
    GreaterOrEqual(AttributeValueAssertion),
    /// `(attr<=value)`
    LessOrEqual(AttributeValueAssertion),
    /// `(attr=*)`
    Present(String),
    /// `(attr~=value)`
    ApproxMatch(AttributeValueAssertion),
    /// `(attr:dn:rule:=value)`
    ExtensibleMatch(MatchingRuleAssertion),
}

/// Attribute description paired with an assertion value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValueAssertion {
    pub attribute: String,
    pub value: String,
}

/// Substring assertion; at least one component is expected to be present
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubstringFilter {
    pub attribute: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#final: Option<String>,
}

/// Extensible match assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingRuleAssertion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    pub value: String,
    #[serde(default)]
    pub dn_attributes: bool,
}

impl AttributeValueAssertion {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

impl SubstringFilter {
    /// Build a substring assertion, dropping empty components
    pub fn new(
        attribute: impl Into<String>,
        initial: Option<&str>,
        any: &[&str],
        r#final: Option<&str>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            initial: initial.filter(|s| !s.is_empty()).map(str::to_string),
            any: any
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
            r#final: r#final.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Concatenation of all components in positional order
    pub fn joined(&self) -> String {
        let mut out = String::new();
        if let Some(initial) = &self.initial {
            out.push_str(initial);
        }
        for part in &self.any {
            out.push_str(part);
        }
        if let Some(last) = &self.r#final {
            out.push_str(last);
        }
        out
    }
}

impl Filter {
    pub fn and(children: Vec<Filter>) -> Self {
        Filter::And(children)
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Or(children)
    }

    pub fn not(child: Filter) -> Self {
        Filter::Not(Box::new(child))
    }

    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EqualityMatch(AttributeValueAssertion::new(attribute, value))
    }

    pub fn ge(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::GreaterOrEqual(AttributeValueAssertion::new(attribute, value))
    }

    pub fn le(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::LessOrEqual(AttributeValueAssertion::new(attribute, value))
    }

    pub fn approx(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::ApproxMatch(AttributeValueAssertion::new(attribute, value))
    }

    pub fn present(attribute: impl Into<String>) -> Self {
        Filter::Present(attribute.into())
    }

    pub fn substrings(
        attribute: impl Into<String>,
        initial: Option<&str>,
        any: &[&str],
        r#final: Option<&str>,
    ) -> Self {
        Filter::Substrings(SubstringFilter::new(attribute, initial, any, r#final))
    }

    pub fn extensible(
        attribute: Option<&str>,
        matching_rule: Option<&str>,
        value: impl Into<String>,
        dn_attributes: bool,
    ) -> Self {
        Filter::ExtensibleMatch(MatchingRuleAssertion {
            matching_rule: matching_rule.map(str::to_string),
            attribute: attribute.map(str::to_string),
            value: value.into(),
            dn_attributes,
        })
    }

    /// True for every variant that is not a boolean compound
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Filter::And(_) | Filter::Or(_) | Filter::Not(_))
    }

    /// Number of leaves in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            Filter::And(children) | Filter::Or(children) => {
                children.iter().map(Filter::leaf_count).sum()
            }
            Filter::Not(child) => child.leaf_count(),
            _ => 1,
        }
    }

    /// Attribute description the leaf asserts on, if any
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Filter::EqualityMatch(ava)
            | Filter::GreaterOrEqual(ava)
            | Filter::LessOrEqual(ava)
            | Filter::ApproxMatch(ava) => Some(&ava.attribute),
            Filter::Substrings(sub) => Some(&sub.attribute),
            Filter::Present(attr) => Some(attr),
            Filter::ExtensibleMatch(mra) => mra.attribute.as_deref(),
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => None,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::And(children) => {
                write!(f, "(&")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Filter::Or(children) => {
                write!(f, "(|")?;
                for child in children {
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Filter::Not(child) => write!(f, "(!{})", child),
            Filter::EqualityMatch(ava) => write!(f, "({}={})", ava.attribute, ava.value),
            Filter::Substrings(sub) => {
                write!(f, "({}=", sub.attribute)?;
                if let Some(initial) = &sub.initial {
                    write!(f, "{}", initial)?;
                }
                write!(f, "*")?;
                for part in &sub.any {
                    write!(f, "{}*", part)?;
                }
                if let Some(last) = &sub.r#final {
                    write!(f, "{}", last)?;
                }
                write!(f, ")")
            }
            Filter::GreaterOrEqual(ava) => write!(f, "({}>={})", ava.attribute, ava.value),
            Filter::LessOrEqual(ava) => write!(f, "({}<={})", ava.attribute, ava.value),
            Filter::Present(attr) => write!(f, "({}=*)", attr),
            Filter::ApproxMatch(ava) => write!(f, "({}~={})", ava.attribute, ava.value),
            Filter::ExtensibleMatch(mra) => {
                write!(f, "(")?;
                if let Some(attr) = &mra.attribute {
                    write!(f, "{}", attr)?;
                }
                if mra.dn_attributes {
                    write!(f, ":dn")?;
                }
                if let Some(rule) = &mra.matching_rule {
                    write!(f, ":{}", rule)?;
                }
                write!(f, ":={})", mra.value)
            }
        }
    }
}
