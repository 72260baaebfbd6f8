//! Tag to call-expression rewriting.
//!
//! Compat mode runs three whole-text passes, each over the previous pass's
//! output:
//!
//! 1. `<Tag attrs/>` becomes `pragma('Tag', attrs)`
//! 2. `<Tag attrs>` becomes `pragma('Tag', attrs, ` (left open)
//! 3. `</Tag>` becomes `)`
//!
//! Closing tags are paired with openers by position only; their names are
//! discarded. Siblings under one parent are emitted back to back without a
//! separating comma, so multi-child markup does not produce a valid call.
//!
//! Strict mode emits the same text for well-formed input but scans tags with
//! [`TagScanner`] and checks every closing tag against the open ones.

use crate::attributes::parse_attributes;
use crate::error::TranspileError;
use crate::token::{TagKind, TagScanner, TagToken};
use regex::{Captures, NoExpand, Regex};
use std::sync::OnceLock;

fn self_closing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9_]+)([^>]*)/>").expect("self-closing pattern is valid")
    })
}

fn opening_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9_]+)([^>]*)>").expect("opening pattern is valid")
    })
}

fn closing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"</[A-Za-z0-9_]+>").expect("closing pattern is valid"))
}

/// Which tag rewriting strategy a session uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RewriteMode {
    /// Three blind substitution passes; never fails.
    #[default]
    Compat,
    /// Scanner with name-checked nesting; reports structural errors.
    Strict,
}

impl RewriteMode {
    /// Returns the rewriter implementing this mode.
    pub fn rewriter(self) -> Box<dyn TagRewrite> {
        match self {
            Self::Compat => Box::new(CompatRewriter),
            Self::Strict => Box::new(StrictRewriter),
        }
    }
}

/// Rewrites every tag occurrence in a block into call-expression text.
pub trait TagRewrite: Send + Sync {
    /// Rewrites `source`, using `pragma` as the call target.
    fn rewrite(&self, source: &str, pragma: &str) -> Result<String, TranspileError>;
}

/// `pragma('name', attrs)`
fn element_call(pragma: &str, name: &str, raw_attributes: &str) -> String {
    format!("{}('{}', {})", pragma, name, parse_attributes(raw_attributes))
}

/// `pragma('name', attrs, `
fn open_call(pragma: &str, name: &str, raw_attributes: &str) -> String {
    format!("{}('{}', {}, ", pragma, name, parse_attributes(raw_attributes))
}

/// Pass 1: replaces self-closing tags with complete calls.
pub fn rewrite_self_closing(source: &str, pragma: &str) -> String {
    self_closing_pattern()
        .replace_all(source, |caps: &Captures| {
            element_call(pragma, &caps[1], &caps[2])
        })
        .into_owned()
}

/// Pass 2: replaces the remaining opening tags with open calls.
pub fn rewrite_opening(source: &str, pragma: &str) -> String {
    opening_pattern()
        .replace_all(source, |caps: &Captures| open_call(pragma, &caps[1], &caps[2]))
        .into_owned()
}

/// Pass 3: replaces every closing tag with `)`, whatever its name.
pub fn rewrite_closing(source: &str) -> String {
    closing_pattern()
        .replace_all(source, NoExpand(")"))
        .into_owned()
}

/// The three-pass rewriter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatRewriter;

impl CompatRewriter {
    /// Runs the three passes. Infallible.
    pub fn rewrite_text(&self, source: &str, pragma: &str) -> String {
        let output = rewrite_self_closing(source, pragma);
        let output = rewrite_opening(&output, pragma);
        rewrite_closing(&output)
    }
}

impl TagRewrite for CompatRewriter {
    fn rewrite(&self, source: &str, pragma: &str) -> Result<String, TranspileError> {
        Ok(self.rewrite_text(source, pragma))
    }
}

/// Rewriter that checks tag nesting by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictRewriter;

impl TagRewrite for StrictRewriter {
    fn rewrite(&self, source: &str, pragma: &str) -> Result<String, TranspileError> {
        let mut output = String::with_capacity(source.len());
        let mut open: Vec<TagToken<'_>> = Vec::new();
        let mut last = 0;

        for token in TagScanner::new(source) {
            let token = token?;
            output.push_str(&source[last..usize::from(token.span.start())]);
            match token.kind {
                TagKind::SelfClosing => {
                    output.push_str(&element_call(pragma, &token.name, token.raw_attributes));
                }
                TagKind::Opening => {
                    output.push_str(&open_call(pragma, &token.name, token.raw_attributes));
                    open.push(token.clone());
                }
                TagKind::Closing => {
                    let Some(opener) = open.pop() else {
                        return Err(TranspileError::UnexpectedClosingTag {
                            tag_name: token.name.to_string(),
                            span: token.span,
                        });
                    };
                    if opener.name != token.name {
                        return Err(TranspileError::MismatchedClosingTag {
                            expected: opener.name.to_string(),
                            found: token.name.to_string(),
                            span: token.span,
                        });
                    }
                    output.push(')');
                }
            }
            last = usize::from(token.span.end());
        }
        output.push_str(&source[last..]);

        if let Some(unclosed) = open.pop() {
            return Err(TranspileError::UnclosedTag {
                tag_name: unclosed.name.to_string(),
                span: unclosed.span,
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compat(source: &str) -> String {
        CompatRewriter.rewrite_text(source, "createElement")
    }

    fn strict(source: &str) -> Result<String, TranspileError> {
        StrictRewriter.rewrite(source, "createElement")
    }

    #[test]
    fn test_empty_pair() {
        assert_eq!(compat("<div></div>"), "createElement('div', null, )");
    }

    #[test]
    fn test_self_closing_with_attribute() {
        assert_eq!(
            compat(r#"<img src="a.png"/>"#),
            r#"createElement('img', {src: "a.png"})"#
        );
    }

    #[test]
    fn test_self_closing_not_rematched_by_opening_pass() {
        let after_first = rewrite_self_closing("<br/><hr />", "h");
        assert_eq!(after_first, "h('br', null)h('hr', null)");
        assert_eq!(rewrite_opening(&after_first, "h"), after_first);
    }

    #[test]
    fn test_single_nested_child() {
        assert_eq!(
            compat("<p><b/></p>"),
            "createElement('p', null, createElement('b', null))"
        );
    }

    #[test]
    fn test_closing_pass_ignores_names() {
        assert_eq!(rewrite_closing("</a></b></c>"), ")))");
        assert_eq!(compat("<div></span>"), "createElement('div', null, )");
    }

    #[test]
    fn test_multiple_children_are_not_separated() {
        assert_eq!(
            compat("<ul><li/><li/></ul>"),
            "createElement('ul', null, createElement('li', null)createElement('li', null))"
        );
    }

    #[test]
    fn test_text_children_are_left_in_place() {
        assert_eq!(compat("<p>hi</p>"), "createElement('p', null, hi)");
    }

    #[test]
    fn test_surrounding_code_is_untouched() {
        assert_eq!(
            compat("const el = <br/>;\nrender(el);"),
            "const el = createElement('br', null);\nrender(el);"
        );
    }

    #[test]
    fn test_gt_in_attribute_ends_tag_in_compat() {
        assert_eq!(
            compat(r#"<a title="x>y"/>"#),
            r#"createElement('a', null, y"/>"#
        );
    }

    #[test]
    fn test_strict_matches_compat_when_well_formed() {
        for source in [
            "<div></div>",
            r#"<img src="a.png"/>"#,
            "<p><b/></p>",
            r#"<a href="x" onClick={fn}/>"#,
            "let a = 1 < 2;",
            "for (let i=0;i<n;i++) {}",
            "x = <br/>;\nwhile (i<n) { i++; }",
        ] {
            assert_eq!(strict(source).unwrap(), compat(source), "source: {source}");
        }
    }

    #[test]
    fn test_strict_keeps_gt_inside_values() {
        assert_eq!(
            strict(r#"<a title="x>y"/>"#).unwrap(),
            r#"createElement('a', {title: "x>y"})"#
        );
    }

    #[test]
    fn test_strict_mismatched_closing_tag() {
        let err = strict("<div></span>").unwrap_err();
        assert_eq!(
            err,
            TranspileError::MismatchedClosingTag {
                expected: "div".to_string(),
                found: "span".to_string(),
                span: text_size::TextRange::new(
                    text_size::TextSize::from(5),
                    text_size::TextSize::from(12),
                ),
            }
        );
    }

    #[test]
    fn test_strict_unclosed_tag() {
        let err = strict("<div><p></p>").unwrap_err();
        assert!(matches!(err, TranspileError::UnclosedTag { ref tag_name, .. } if tag_name == "div"));
    }

    #[test]
    fn test_strict_unexpected_closing_tag() {
        let err = strict("x</div>").unwrap_err();
        assert!(matches!(err, TranspileError::UnexpectedClosingTag { ref tag_name, .. } if tag_name == "div"));
    }

    #[test]
    fn test_strict_nested_same_name() {
        assert_eq!(
            strict("<div><div></div></div>").unwrap(),
            "createElement('div', null, createElement('div', null, ))"
        );
    }

    #[test]
    fn test_mode_rewriter() {
        let rewriter = RewriteMode::Strict.rewriter();
        assert!(rewriter.rewrite("<a>", "h").is_err());
        let rewriter = RewriteMode::default().rewriter();
        assert_eq!(rewriter.rewrite("<a>", "h").unwrap(), "h('a', null, ");
    }
}
