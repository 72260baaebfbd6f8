//! Output formatting.

use crate::cli::OutputFormat;
use camino::Utf8Path;
use jsx_transpiler::{TextRange, TextSize, TranspileError};
use serde::Serialize;

/// Severity of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The block was not transformed.
    Error,
    /// The block was processed but needs attention.
    Warning,
}

/// A problem found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiagnostic {
    /// Severity.
    pub severity: Severity,
    /// Byte range in the file, if known.
    pub span: Option<TextRange>,
    /// Message.
    pub message: String,
    /// Stable diagnostic code.
    pub code: String,
}

impl FileDiagnostic {
    /// Builds an error from a transpile failure. `base` is where the block
    /// starts inside the file.
    pub fn from_transpile_error(error: &TranspileError, base: TextSize) -> Self {
        // Output spans point into rewritten text, not the file.
        let span = match error {
            TranspileError::InvalidOutput { .. } => None,
            _ => error.span().map(|span| span + base),
        };
        Self {
            severity: Severity::Error,
            span,
            message: error.to_string(),
            code: error.code().to_string(),
        }
    }
}

/// A formatted diagnostic for output.
#[derive(Debug, Serialize)]
pub struct FormattedDiagnostic {
    /// The diagnostic type (Error or Warning).
    #[serde(rename = "type")]
    pub diagnostic_type: String,
    /// The file path.
    pub filename: String,
    /// The start position.
    pub start: Position,
    /// The end position.
    pub end: Position,
    /// The message.
    pub message: String,
    /// The diagnostic code.
    pub code: String,
}

/// A position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

/// Line starts of a file, for turning offsets into positions.
struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        Self { starts }
    }

    fn position(&self, offset: TextSize) -> Position {
        let offset = u32::from(offset);
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        Position {
            line: line as u32 + 1,
            column: offset - self.starts[line] + 1,
            offset,
        }
    }
}

/// Formats diagnostics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a file's diagnostics as text. JSON output is collected with
    /// [`Formatter::format_json_diagnostics`] instead.
    pub fn format(
        &self,
        diagnostics: &[FileDiagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(diagnostics, file_path, source),
            OutputFormat::Json => serde_json::to_string_pretty(&Self::format_json_diagnostics(
                diagnostics,
                file_path,
                source,
            ))
            .unwrap_or_default(),
            OutputFormat::Machine => Self::format_machine(diagnostics, file_path, source),
        }
    }

    fn format_human(diagnostics: &[FileDiagnostic], file_path: &Utf8Path, source: &str) -> String {
        let lines = LineIndex::new(source);
        let mut output = String::new();

        for diag in diagnostics {
            let start = lines.position(span_start(diag));
            let severity = match diag.severity {
                Severity::Error => "Error",
                Severity::Warning => "Warning",
            };
            output.push_str(&format!(
                "{}:{}:{}\n{}: {} ({})\n\n",
                file_path, start.line, start.column, severity, diag.message, diag.code
            ));
        }

        output
    }

    /// Formats diagnostics into JSON-ready structs.
    pub fn format_json_diagnostics(
        diagnostics: &[FileDiagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> Vec<FormattedDiagnostic> {
        let lines = LineIndex::new(source);
        diagnostics
            .iter()
            .map(|diag| FormattedDiagnostic {
                diagnostic_type: match diag.severity {
                    Severity::Error => "Error".to_string(),
                    Severity::Warning => "Warning".to_string(),
                },
                filename: file_path.to_string(),
                start: lines.position(span_start(diag)),
                end: lines.position(diag.span.map_or(TextSize::from(0), |s| s.end())),
                message: diag.message.clone(),
                code: diag.code.clone(),
            })
            .collect()
    }

    fn format_machine(
        diagnostics: &[FileDiagnostic],
        file_path: &Utf8Path,
        source: &str,
    ) -> String {
        let lines = LineIndex::new(source);
        let mut output = String::new();

        for diag in diagnostics {
            let start = lines.position(span_start(diag));
            let end = lines.position(diag.span.map_or(TextSize::from(0), |s| s.end()));
            let severity = match diag.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARNING",
            };
            output.push_str(&format!(
                "{} {}:{}:{}:{}:{} {} ({})\n",
                severity,
                file_path,
                start.line,
                start.column,
                end.line,
                end.column,
                diag.message,
                diag.code
            ));
        }

        output
    }
}

fn span_start(diag: &FileDiagnostic) -> TextSize {
    diag.span.map_or(TextSize::from(0), |s| s.start())
}

/// Summary of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of files processed.
    pub file_count: usize,
    /// Number of blocks transpiled.
    pub block_count: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
}

impl RunSummary {
    /// Formats the summary line.
    pub fn format(&self) -> String {
        format!(
            "====================================\nminijsx transpiled {} {} in {} {} with {} {} and {} {}",
            self.block_count,
            plural(self.block_count, "block", "blocks"),
            self.file_count,
            plural(self.file_count, "file", "files"),
            self.error_count,
            plural(self.error_count, "error", "errors"),
            self.warning_count,
            plural(self.warning_count, "warning", "warnings"),
        )
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
