//! End-to-end behavior of a transpile session.

use jsx_transpiler::{
    parse_attributes, PragmaResolver, RewriteMode, SessionConfig, TagRewrite, TranspileError,
    TranspileResult, TranspileSession,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

fn transpile(source: &str) -> String {
    let result = TranspileSession::default().transpile(source);
    result
        .output()
        .unwrap_or_else(|| panic!("transpile failed: {:?}", result.error()))
        .to_string()
}

#[test]
fn test_empty_element() {
    assert_eq!(transpile("<div></div>"), "createElement('div', null, )");
}

#[test]
fn test_self_closing_element() {
    assert_eq!(
        transpile(r#"<img src="a.png"/>"#),
        r#"createElement('img', {src: "a.png"})"#
    );
}

#[test]
fn test_pragma_override() {
    let output = transpile("/** @jsx h */\n<span/>");
    assert!(output.contains("h('span', null)"));
    assert!(!output.contains("createElement("));
}

#[test]
fn test_mixed_attribute_kinds() {
    assert_eq!(
        transpile(r#"<a href="x" onClick={fn}/>"#),
        r#"createElement('a', {href: "x",onClick: fn})"#
    );
}

#[test]
fn test_attribute_order() {
    let literal = parse_attributes(r#"b="2" a="1""#);
    let b = literal.find('b').unwrap();
    let a = literal.find('a').unwrap();
    assert!(b < a, "{literal}");
}

#[test]
fn test_attribute_without_matches_is_null() {
    for raw in ["", "   ", "disabled", "x=1", "-", "/"] {
        assert_eq!(parse_attributes(raw), "null", "raw: {raw:?}");
    }
}

#[test]
fn test_resolve_is_stable() {
    let resolver = PragmaResolver::default();
    for source in ["", "<a/>", "/** @jsx m */", "/** @jsx */"] {
        let first = resolver.resolve(source);
        assert_eq!(resolver.resolve(source), first);
        assert_eq!(resolver.resolve(source), first);
    }
}

#[test]
fn test_forced_fault_keeps_original_text() {
    struct Failing;

    impl TagRewrite for Failing {
        fn rewrite(&self, _source: &str, pragma: &str) -> Result<String, TranspileError> {
            let index: usize = pragma.len() + 100;
            let bytes = pragma.as_bytes();
            Ok(bytes[index].to_string())
        }
    }

    let session = TranspileSession::with_rewriter(SessionConfig::default(), Box::new(Failing));
    let source = "/** @jsx h */\nconst tree = <div><p/></div>;\n";
    match session.transpile(source) {
        TranspileResult::Failed { error, fallback } => {
            assert_eq!(fallback, source);
            assert_eq!(error.code(), "transpile-fault");
        }
        other => panic!("expected a failure, got {:?}", other),
    }
}

#[test]
fn test_concurrent_sessions_with_different_defaults() {
    let a = Arc::new(TranspileSession::new(SessionConfig {
        default_pragma: "a".to_string(),
        ..Default::default()
    }));
    let b = Arc::new(TranspileSession::new(SessionConfig {
        default_pragma: "b".to_string(),
        ..Default::default()
    }));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = if i % 2 == 0 { a.clone() } else { b.clone() };
            thread::spawn(move || {
                let source = if i % 4 == 0 {
                    "/** @jsx z */<br/>".to_string()
                } else {
                    "<br/>".to_string()
                };
                (i, session.transpile(&source))
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.join().unwrap();
        let expected_pragma = match i {
            i if i % 4 == 0 => "z",
            i if i % 2 == 0 => "a",
            _ => "b",
        };
        match result {
            TranspileResult::Transpiled { pragma, .. } => assert_eq!(pragma, expected_pragma),
            other => panic!("unexpected failure: {:?}", other),
        }
    }
}

#[test]
fn test_nested_same_name_is_positional_in_compat_mode() {
    // The inner self-closing div is consumed first; the outer pair then lines
    // up by position.
    assert_eq!(
        transpile("<div><div/></div>"),
        "createElement('div', null, createElement('div', null))"
    );
    // Misnested closers are accepted and paired blindly.
    assert_eq!(
        transpile("<a><b></a></b>"),
        "createElement('a', null, createElement('b', null, ))"
    );
}

#[test]
fn test_strict_mode_rejects_misnested_tags() {
    let session = TranspileSession::new(SessionConfig {
        mode: RewriteMode::Strict,
        ..Default::default()
    });
    let source = "<a><b></a></b>";
    let result = session.transpile(source);
    match result.error() {
        Some(TranspileError::MismatchedClosingTag {
            expected, found, ..
        }) => {
            assert_eq!(expected, "b");
            assert_eq!(found, "a");
        }
        other => panic!("expected mismatched closing tag, got {:?}", other),
    }
}
