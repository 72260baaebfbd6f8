//! Configuration loading.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use jsx_transpiler::{RewriteMode, SessionConfig, DEFAULT_PRAGMA};
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "minijsx.config.json";

/// Environment variable overriding the default pragma.
pub const PRAGMA_ENV: &str = "MINIJSX_PRAGMA";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The config file.
        path: Utf8PathBuf,
        /// The I/O error.
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The config file.
        path: Utf8PathBuf,
        /// The JSON error.
        source: serde_json::Error,
    },
}

/// Rewrite mode as spelled in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// Blind three-pass rewriting.
    Compat,
    /// Name-checked nesting.
    Strict,
}

impl From<ModeSetting> for RewriteMode {
    fn from(mode: ModeSetting) -> Self {
        match mode {
            ModeSetting::Compat => RewriteMode::Compat,
            ModeSetting::Strict => RewriteMode::Strict,
        }
    }
}

/// Contents of `minijsx.config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Default call target.
    pub pragma: Option<String>,

    /// Rewrite mode.
    pub mode: Option<ModeSetting>,

    /// Validate transpiled output.
    pub validate: Option<bool>,

    /// Emit failed blocks untransformed.
    pub best_effort: Option<bool>,

    /// Script `type` picked up in HTML pages.
    pub script_type: Option<String>,

    /// Glob patterns to ignore.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl ProjectConfig {
    /// Loads an explicit config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&remove_json_comments(&content)).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Loads `minijsx.config.json` from the project root, if present.
    ///
    /// A broken file is reported and ignored.
    pub fn find(project_root: &Utf8Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::debug!("loaded {}", path);
                config
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }
}

/// Effective settings after merging flags, environment and config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Session configuration.
    pub session: SessionConfig,
    /// Emit failed blocks untransformed.
    pub best_effort: bool,
    /// Script `type` picked up in HTML pages.
    pub script_type: String,
    /// Glob patterns to ignore.
    pub ignore: Vec<String>,
}

impl Settings {
    /// Merges the sources. Flags win over the environment, which wins over
    /// the config file.
    pub fn resolve(args: &Args, config: &ProjectConfig, env_pragma: Option<String>) -> Self {
        let default_pragma = args
            .pragma
            .clone()
            .or(env_pragma.filter(|p| !p.trim().is_empty()))
            .or_else(|| config.pragma.clone())
            .unwrap_or_else(|| DEFAULT_PRAGMA.to_string());

        let mode = if args.strict {
            RewriteMode::Strict
        } else {
            config.mode.map(RewriteMode::from).unwrap_or_default()
        };

        let mut ignore = config.ignore.clone();
        ignore.extend(args.ignore.iter().cloned());

        Self {
            session: SessionConfig {
                default_pragma,
                mode,
                validate_output: args.validate || config.validate.unwrap_or(false),
            },
            best_effort: args.best_effort || config.best_effort.unwrap_or(false),
            script_type: config
                .script_type
                .clone()
                .unwrap_or_else(|| "text/jsx".to_string()),
            ignore,
        }
    }
}

/// Removes `//` and `/* */` comments outside of strings.
fn remove_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if c == '"' {
                in_string = false;
            } else if c == '\\' {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                result.push(c);
                in_string = true;
            }
            ('/', Some('/')) => {
                while chars.next_if(|next| *next != '\n').is_some() {}
            }
            ('/', Some('*')) => {
                chars.next();
                while let Some(next) = chars.next() {
                    if next == '*' && chars.next_if_eq(&'/').is_some() {
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}
