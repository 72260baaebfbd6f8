//! Attribute text to object-literal conversion.
//!
//! Recognizes `name="literal"`, `name='literal'` and `name={expression}`.
//! Anything else in the attribute text is skipped. A brace value ends at the
//! first `}`, so expressions containing braces are cut short.

use regex::Regex;
use smol_str::SmolStr;
use std::fmt;
use std::sync::OnceLock;

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9_]+)\s*=\s*(["'][^"']*["']|\{[^}]*\})"#)
            .expect("attribute pattern is valid")
    })
}

/// The source text of one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A quoted literal, quotes included.
    StringLiteral(String),
    /// The inner text of a `{...}` value.
    Expression(String),
}

impl AttributeValue {
    /// The text emitted into the object literal.
    pub fn source(&self) -> &str {
        match self {
            Self::StringLiteral(text) | Self::Expression(text) => text,
        }
    }
}

/// One `key: value` pair, in the order it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    /// Attribute name.
    pub key: SmolStr,
    /// Attribute value.
    pub value: AttributeValue,
}

impl fmt::Display for AttributeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value.source())
    }
}

/// Extracts the recognized attributes of one tag in source order.
///
/// Duplicate keys are kept.
pub fn parse_entries(raw: &str) -> Vec<AttributeEntry> {
    attribute_pattern()
        .captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str();
            let value = match value.strip_prefix('{') {
                Some(inner) => AttributeValue::Expression(
                    inner.strip_suffix('}').unwrap_or(inner).to_string(),
                ),
                None => AttributeValue::StringLiteral(value.to_string()),
            };
            Some(AttributeEntry {
                key: SmolStr::new(key),
                value,
            })
        })
        .collect()
}

/// Serializes the attributes of one tag as an object literal, or `null`.
///
/// ```
/// use jsx_transpiler::parse_attributes;
///
/// assert_eq!(parse_attributes(r#" href="x" onClick={fn}"#), r#"{href: "x",onClick: fn}"#);
/// assert_eq!(parse_attributes("  "), "null");
/// ```
pub fn parse_attributes(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "null".to_string();
    }
    let entries = parse_entries(raw);
    if entries.is_empty() {
        return "null".to_string();
    }
    let body: Vec<String> = entries.iter().map(ToString::to_string).collect();
    format!("{{{}}}", body.join(","))
}
