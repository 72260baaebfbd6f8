//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Rewrites JSX tags in scripts and HTML pages into plain function calls.
#[derive(Debug, Parser)]
#[command(name = "minijsx")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files to transpile (default: every .jsx and .html file in the workspace)
    pub paths: Vec<Utf8PathBuf>,

    /// Working directory to scan
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Directory for transpiled files (default: next to the inputs)
    #[arg(long = "out-dir")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Path to a minijsx.config.json file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Default call target when a block has no @jsx directive
    #[arg(long)]
    pub pragma: Option<String>,

    /// Check tag nesting by name and report unbalanced tags
    #[arg(long)]
    pub strict: bool,

    /// Parse the transpiled output and fail blocks that are not valid scripts
    #[arg(long)]
    pub validate: bool,

    /// Emit failed blocks untransformed, with a comment describing the failure
    #[arg(long = "best-effort")]
    pub best_effort: bool,

    /// Output format for diagnostics
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print transpiled code to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
    /// Machine-readable (one line per diagnostic)
    Machine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["minijsx"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert_eq!(args.output, OutputFormat::Human);
        assert!(args.paths.is_empty());
        assert!(!args.strict);
        assert!(args.pragma.is_none());
    }

    #[test]
    fn test_paths_and_flags() {
        let args = Args::parse_from([
            "minijsx",
            "src/app.jsx",
            "index.html",
            "--strict",
            "--validate",
            "--best-effort",
            "--pragma",
            "h",
        ]);
        assert_eq!(args.paths.len(), 2);
        assert!(args.strict);
        assert!(args.validate);
        assert!(args.best_effort);
        assert_eq!(args.pragma.as_deref(), Some("h"));
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["minijsx", "--output", "json"]);
        assert_eq!(args.output, OutputFormat::Json);

        let args = Args::parse_from(["minijsx", "--output", "machine"]);
        assert_eq!(args.output, OutputFormat::Machine);
    }

    #[test]
    fn test_repeated_ignore() {
        let args = Args::parse_from(["minijsx", "--ignore", "a/**", "--ignore", "b/**"]);
        assert_eq!(args.ignore, vec!["a/**".to_string(), "b/**".to_string()]);
    }
}
