//! Main orchestration logic.

use crate::cli::{Args, OutputFormat};
use crate::config::{ConfigError, ProjectConfig, Settings, PRAGMA_ENV};
use crate::output::{FileDiagnostic, Formatter, RunSummary, Severity};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use jsx_host::{
    process_document, BlockStatus, HostOptions, HtmlScriptEmitter, HtmlScriptLocator, LocateError,
};
use jsx_transpiler::{TextSize, TranspileSession};
use miette::Diagnostic;
use rayon::prelude::*;
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(minijsx::read))]
    Read {
        /// The file.
        path: Utf8PathBuf,
        /// The I/O error.
        source: io::Error,
    },

    /// Failed to write a transpiled file.
    #[error("failed to write {path}: {source}")]
    #[diagnostic(code(minijsx::write))]
    Write {
        /// The output file.
        path: Utf8PathBuf,
        /// The I/O error.
        source: io::Error,
    },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(minijsx::glob))]
    InvalidGlob(String),

    /// The workspace directory is unusable.
    #[error("invalid workspace: {0}")]
    #[diagnostic(code(minijsx::workspace))]
    Workspace(String),

    /// The configuration file could not be loaded.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(minijsx::config), help("fix or remove minijsx.config.json"))]
    Config(#[from] ConfigError),

    /// A page could not be scanned for script blocks.
    #[error("failed to scan {path}: {source}")]
    #[diagnostic(code(minijsx::locate))]
    Locate {
        /// The page.
        path: Utf8PathBuf,
        /// The scan error.
        source: LocateError,
    },
}

/// Ignored unless the user lists the files explicitly.
const DEFAULT_IGNORES: &[&str] = &["**/node_modules/**", "**/*.out.html"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Script,
    Page,
}

impl FileKind {
    fn of(path: &Utf8Path) -> Option<Self> {
        match path.extension() {
            Some("jsx") => Some(Self::Script),
            Some("html" | "htm") => Some(Self::Page),
            _ => None,
        }
    }
}

struct Context<'a> {
    session: &'a TranspileSession,
    settings: &'a Settings,
    workspace: &'a Utf8Path,
    out_dir: Option<Utf8PathBuf>,
    to_stdout: bool,
}

struct FileOutput {
    path: Utf8PathBuf,
    source: String,
    diagnostics: Vec<FileDiagnostic>,
    block_count: usize,
    emitted: Option<String>,
}

/// Runs the transpiler over the selected files.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    let workspace = resolve_workspace(&args.workspace)?;

    let config = match &args.config {
        Some(path) => ProjectConfig::load(&workspace.join(path))?,
        None => ProjectConfig::find(&workspace),
    };
    let settings = Settings::resolve(args, &config, std::env::var(PRAGMA_ENV).ok());
    log::debug!("settings: {:?}", settings);

    let out_dir = args.out_dir.as_ref().map(|dir| workspace.join(dir));
    let ignore_set = build_ignore_set(&settings.ignore, out_dir.as_deref(), &workspace)?;
    let files = collect_files(args, &workspace, &ignore_set);
    log::debug!("{} files to transpile", files.len());

    let session = TranspileSession::new(settings.session.clone());
    let ctx = Context {
        session: &session,
        settings: &settings,
        workspace: &workspace,
        out_dir,
        to_stdout: args.stdout,
    };

    let outputs: Vec<FileOutput> = files.par_iter().map(|path| process_file(&ctx, path)).collect();

    Ok(report(args.output, args.stdout, files.len(), &outputs))
}

fn resolve_workspace(workspace: &Utf8Path) -> Result<Utf8PathBuf, OrchestratorError> {
    if workspace.is_absolute() {
        return Ok(workspace.to_path_buf());
    }
    let current = std::env::current_dir()
        .map_err(|e| OrchestratorError::Workspace(e.to_string()))?;
    let current = Utf8PathBuf::try_from(current)
        .map_err(|e| OrchestratorError::Workspace(e.to_string()))?;
    Ok(current.join(workspace))
}

fn build_ignore_set(
    patterns: &[String],
    out_dir: Option<&Utf8Path>,
    workspace: &Utf8Path,
) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }

    for pattern in DEFAULT_IGNORES {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }

    if let Some(relative) = out_dir.and_then(|dir| dir.strip_prefix(workspace).ok()) {
        if !relative.as_str().is_empty() {
            if let Ok(glob) = Glob::new(&format!("{}/**", relative)) {
                builder.add(glob);
            }
        }
    }

    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

fn collect_files(args: &Args, workspace: &Utf8Path, ignore_set: &GlobSet) -> Vec<Utf8PathBuf> {
    if !args.paths.is_empty() {
        return args
            .paths
            .iter()
            .map(|path| workspace.join(path))
            .filter(|path| {
                let keep = FileKind::of(path).is_some();
                if !keep {
                    log::warn!("skipping {}: not a .jsx or .html file", path);
                }
                keep
            })
            .collect();
    }

    WalkDir::new(workspace)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| FileKind::of(p).is_some())
        .filter(|p| {
            let relative = p.strip_prefix(workspace).unwrap_or(p);
            !ignore_set.is_match(relative.as_str())
        })
        .collect()
}

fn process_file(ctx: &Context<'_>, path: &Utf8Path) -> FileOutput {
    let display = path.strip_prefix(ctx.workspace).unwrap_or(path).to_path_buf();
    let mut output = FileOutput {
        path: display,
        source: String::new(),
        diagnostics: Vec::new(),
        block_count: 0,
        emitted: None,
    };

    let result = fs::read_to_string(path)
        .map_err(|source| OrchestratorError::Read {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|source| {
            output.source = source;
            match FileKind::of(path) {
                Some(FileKind::Page) => transpile_page(ctx, path, &mut output),
                _ => transpile_script(ctx, path, &mut output),
            }
        });

    if let Err(err) = result {
        log::warn!("{}", err);
        output.diagnostics.push(FileDiagnostic {
            severity: Severity::Error,
            span: None,
            message: err.to_string(),
            code: err
                .code()
                .map_or_else(|| "minijsx".to_string(), |code| code.to_string()),
        });
    }

    output
}

fn transpile_script(
    ctx: &Context<'_>,
    path: &Utf8Path,
    output: &mut FileOutput,
) -> Result<(), OrchestratorError> {
    output.block_count = 1;
    let result = ctx.session.transpile(&output.source);

    if let Some(error) = result.error() {
        output
            .diagnostics
            .push(FileDiagnostic::from_transpile_error(error, TextSize::from(0)));
    }

    match result.executable_text(ctx.settings.best_effort) {
        Some(code) => {
            if !result.is_ok() {
                output.diagnostics.push(fallback_warning());
            }
            let code = code.into_owned();
            emit(ctx, path, FileKind::Script, code, output)
        }
        None => Ok(()),
    }
}

fn transpile_page(
    ctx: &Context<'_>,
    path: &Utf8Path,
    output: &mut FileOutput,
) -> Result<(), OrchestratorError> {
    let locator = HtmlScriptLocator::new(ctx.settings.script_type.as_str());
    let mut emitter = HtmlScriptEmitter::new();
    let reports = process_document(
        ctx.session,
        &locator,
        &mut emitter,
        &output.source,
        HostOptions {
            best_effort: ctx.settings.best_effort,
        },
    )
    .map_err(|source| OrchestratorError::Locate {
        path: path.to_path_buf(),
        source,
    })?;

    output.block_count = reports.len();
    for report in &reports {
        if let Some(error) = report.result.error() {
            output
                .diagnostics
                .push(FileDiagnostic::from_transpile_error(error, report.content.start()));
        }
        match &report.status {
            BlockStatus::LoadedFallback => output.diagnostics.push(FileDiagnostic {
                span: Some(report.content),
                ..fallback_warning()
            }),
            BlockStatus::LoadFailed(err) => output.diagnostics.push(FileDiagnostic {
                severity: Severity::Error,
                span: Some(report.content),
                message: err.to_string(),
                code: "load-failed".to_string(),
            }),
            BlockStatus::Loaded | BlockStatus::Skipped => {}
        }
    }

    if emitter.is_empty() {
        log::debug!("{}: nothing to emit", path);
        return Ok(());
    }
    let page = emitter.finish(&output.source);
    emit(ctx, path, FileKind::Page, page, output)
}

fn fallback_warning() -> FileDiagnostic {
    FileDiagnostic {
        severity: Severity::Warning,
        span: None,
        message: "emitted untransformed with a failure comment".to_string(),
        code: "fallback-emitted".to_string(),
    }
}

fn emit(
    ctx: &Context<'_>,
    path: &Utf8Path,
    kind: FileKind,
    text: String,
    output: &mut FileOutput,
) -> Result<(), OrchestratorError> {
    if ctx.to_stdout {
        output.emitted = Some(text);
        return Ok(());
    }

    let target = output_path(ctx.workspace, ctx.out_dir.as_deref(), path, kind);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| OrchestratorError::Write {
            path: target.clone(),
            source,
        })?;
    }
    fs::write(&target, text).map_err(|source| OrchestratorError::Write {
        path: target.clone(),
        source,
    })?;
    log::debug!("wrote {}", target);
    Ok(())
}

/// Where the transpiled form of `path` is written.
fn output_path(
    workspace: &Utf8Path,
    out_dir: Option<&Utf8Path>,
    path: &Utf8Path,
    kind: FileKind,
) -> Utf8PathBuf {
    match (out_dir, kind) {
        (Some(dir), kind) => {
            let relative = path
                .strip_prefix(workspace)
                .map(Utf8Path::to_path_buf)
                .unwrap_or_else(|_| Utf8PathBuf::from(path.file_name().unwrap_or_default()));
            match kind {
                FileKind::Script => dir.join(relative).with_extension("js"),
                FileKind::Page => dir.join(relative),
            }
        }
        (None, FileKind::Script) => path.with_extension("js"),
        (None, FileKind::Page) => path.with_extension("out.html"),
    }
}

fn report(
    format: OutputFormat,
    to_stdout: bool,
    file_count: usize,
    outputs: &[FileOutput],
) -> RunSummary {
    let formatter = Formatter::new(format);
    let mut summary = RunSummary {
        file_count,
        ..Default::default()
    };
    let mut json_output = Vec::new();

    // Transpiled code owns stdout in --stdout mode.
    let print_report = |text: &str| {
        if to_stdout {
            eprint!("{}", text);
        } else {
            print!("{}", text);
        }
    };

    for output in outputs {
        summary.block_count += output.block_count;
        for diag in &output.diagnostics {
            match diag.severity {
                Severity::Error => summary.error_count += 1,
                Severity::Warning => summary.warning_count += 1,
            }
        }

        if let Some(code) = &output.emitted {
            if code.ends_with('\n') {
                print!("{}", code);
            } else {
                println!("{}", code);
            }
        }

        if output.diagnostics.is_empty() {
            continue;
        }
        if format == OutputFormat::Json {
            json_output.extend(Formatter::format_json_diagnostics(
                &output.diagnostics,
                &output.path,
                &output.source,
            ));
        } else {
            print_report(&formatter.format(&output.diagnostics, &output.path, &output.source));
        }
    }

    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "[]".to_string());
        print_report(&format!("{}\n", json));
    } else {
        print_report(&format!("{}\n", summary.format()));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of(Utf8Path::new("a/b.jsx")), Some(FileKind::Script));
        assert_eq!(FileKind::of(Utf8Path::new("index.html")), Some(FileKind::Page));
        assert_eq!(FileKind::of(Utf8Path::new("page.htm")), Some(FileKind::Page));
        assert_eq!(FileKind::of(Utf8Path::new("main.js")), None);
    }

    #[test]
    fn test_output_paths() {
        let ws = Utf8Path::new("/ws");
        assert_eq!(
            output_path(ws, None, Utf8Path::new("/ws/src/app.jsx"), FileKind::Script),
            Utf8PathBuf::from("/ws/src/app.js")
        );
        assert_eq!(
            output_path(ws, None, Utf8Path::new("/ws/index.html"), FileKind::Page),
            Utf8PathBuf::from("/ws/index.out.html")
        );
        let out = Utf8Path::new("/ws/dist");
        assert_eq!(
            output_path(ws, Some(out), Utf8Path::new("/ws/src/app.jsx"), FileKind::Script),
            Utf8PathBuf::from("/ws/dist/src/app.js")
        );
        assert_eq!(
            output_path(ws, Some(out), Utf8Path::new("/ws/index.html"), FileKind::Page),
            Utf8PathBuf::from("/ws/dist/index.html")
        );
        assert_eq!(
            output_path(ws, Some(out), Utf8Path::new("/elsewhere/x.jsx"), FileKind::Script),
            Utf8PathBuf::from("/ws/dist/x.js")
        );
    }

    #[test]
    fn test_ignore_set() {
        let ws = Utf8Path::new("/ws");
        let set = build_ignore_set(
            &["vendor/**".to_string()],
            Some(Utf8Path::new("/ws/dist")),
            ws,
        )
        .unwrap();
        assert!(set.is_match("vendor/lib.jsx"));
        assert!(set.is_match("dist/app.js"));
        assert!(set.is_match("a/node_modules/x.jsx"));
        assert!(set.is_match("index.out.html"));
        assert!(!set.is_match("src/app.jsx"));
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_ignore_set(&["a/[".to_string()], None, Utf8Path::new("/ws")).unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidGlob(_)));
    }

    #[test]
    fn test_error_codes() {
        let err = OrchestratorError::InvalidGlob("x".to_string());
        assert_eq!(err.code().map(|c| c.to_string()), Some("minijsx::glob".to_string()));
    }
}
