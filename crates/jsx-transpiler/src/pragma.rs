//! `/** @jsx name */` directive lookup.

use regex::Regex;
use std::sync::OnceLock;
use crate::token::text_size;
use text_size::TextRange;

/// The call target used when no directive is present.
pub const DEFAULT_PRAGMA: &str = "createElement";

fn directive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/\*\*\s*@jsx\s+([A-Za-z0-9_]+)\s*\*/").expect("pragma pattern is valid")
    })
}

/// A `/** @jsx name */` comment found in a source block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaDirective {
    /// The selected call target.
    pub function_name: String,
    /// The whole comment.
    pub span: TextRange,
}

/// Picks the call-target function name for one source block.
///
/// The resolver never mutates its default: each call looks only at the text it
/// is given, so a directive in one block cannot affect another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaResolver {
    default: String,
}

impl Default for PragmaResolver {
    fn default() -> Self {
        Self::new(DEFAULT_PRAGMA)
    }
}

impl PragmaResolver {
    /// Creates a resolver falling back to `default`.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
        }
    }

    /// The fallback name.
    pub fn default_pragma(&self) -> &str {
        &self.default
    }

    /// Returns the first directive in `source`, if any.
    pub fn find_directive(&self, source: &str) -> Option<PragmaDirective> {
        let caps = directive_pattern().captures(source)?;
        let whole = caps.get(0)?;
        let name = caps.get(1)?;
        Some(PragmaDirective {
            function_name: name.as_str().to_string(),
            span: TextRange::new(text_size(whole.start()), text_size(whole.end())),
        })
    }

    /// Returns the directive's name, or the default when there is none.
    pub fn resolve(&self, source: &str) -> String {
        match self.find_directive(source) {
            Some(directive) => directive.function_name,
            None => self.default.clone(),
        }
    }
}
