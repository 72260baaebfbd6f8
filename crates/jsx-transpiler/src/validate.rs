//! Syntax check of rewritten output.

use crate::error::TranspileError;
use std::sync::Arc;
use swc_common::{BytePos, FileName, SourceMap, Spanned};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax};
use text_size::{TextRange, TextSize};

/// Parses `code` as an ECMAScript program and reports the first syntax error.
///
/// Blind pairing and sibling concatenation can leave unbalanced parentheses
/// or missing commas behind; this turns such output into an error instead of
/// handing it to a loader.
pub fn validate_output(code: &str) -> Result<(), TranspileError> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom("minijsx-output".into()).into(),
        code.to_string(),
    );
    let syntax = Syntax::Es(EsSyntax {
        jsx: false,
        ..Default::default()
    });
    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
    let parsed = parser.parse_program();
    let recovered = parser.take_errors();

    match parsed {
        Err(err) => Err(invalid_output(&err, fm.start_pos)),
        Ok(_) => match recovered.first() {
            Some(err) => Err(invalid_output(err, fm.start_pos)),
            None => Ok(()),
        },
    }
}

fn invalid_output(err: &swc_ecma_parser::error::Error, file_start: BytePos) -> TranspileError {
    let span = err.span();
    let lo = span.lo.0.saturating_sub(file_start.0);
    let hi = span.hi.0.saturating_sub(file_start.0).max(lo);
    TranspileError::InvalidOutput {
        message: err.kind().msg().into_owned(),
        span: Some(TextRange::new(TextSize::from(lo), TextSize::from(hi))),
    }
}
