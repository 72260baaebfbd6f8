//! JSX to call-expression transpiler.
//!
//! This crate rewrites the tag syntax embedded in a script into plain calls
//! without building an AST. It handles:
//! - Picking the call target from a `/** @jsx name */` directive
//! - Turning tag attributes into object literals
//! - Rewriting self-closing, opening and closing tags into call text
//! - Reporting failures together with the untouched input
//!
//! # Example
//!
//! ```
//! use jsx_transpiler::{TranspileSession, SessionConfig};
//!
//! let session = TranspileSession::new(SessionConfig::default());
//! let result = session.transpile(r#"const logo = <img src="a.png"/>;"#);
//! assert_eq!(
//!     result.output(),
//!     Some(r#"const logo = createElement('img', {src: "a.png"});"#)
//! );
//! ```

mod attributes;
mod error;
mod pragma;
mod rewriter;
mod session;
mod token;
mod validate;

pub use attributes::{parse_attributes, parse_entries, AttributeEntry, AttributeValue};
pub use error::TranspileError;
pub use pragma::{PragmaDirective, PragmaResolver, DEFAULT_PRAGMA};
pub use rewriter::{
    rewrite_closing, rewrite_opening, rewrite_self_closing, CompatRewriter, RewriteMode,
    StrictRewriter, TagRewrite,
};
pub use session::{SessionConfig, TranspileResult, TranspileSession};
pub use text_size::{TextRange, TextSize};
pub use token::{TagKind, TagScanner, TagToken};
pub use validate::validate_output;

/// Transpiles `source` with the default configuration.
pub fn transpile(source: &str) -> TranspileResult {
    TranspileSession::default().transpile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpile_empty() {
        assert_eq!(transpile("").output(), Some(""));
    }

    #[test]
    fn test_transpile_plain_script() {
        let source = "function add(a, b) { return a + b; }";
        assert_eq!(transpile(source).output(), Some(source));
    }
}
