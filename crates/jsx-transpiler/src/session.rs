//! Transpilation of one source block.

use crate::error::TranspileError;
use crate::pragma::{PragmaResolver, DEFAULT_PRAGMA};
use crate::rewriter::{RewriteMode, TagRewrite};
use crate::validate::validate_output;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Options fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Call target used when a block has no `@jsx` directive.
    pub default_pragma: String,
    /// Tag rewriting strategy.
    pub mode: RewriteMode,
    /// Parse the rewritten text and fail the block if it is not a valid script.
    pub validate_output: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_pragma: DEFAULT_PRAGMA.to_string(),
            mode: RewriteMode::default(),
            validate_output: false,
        }
    }
}

/// The outcome of transpiling one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranspileResult {
    /// The block was rewritten.
    Transpiled {
        /// The rewritten text.
        output: String,
        /// The call target that was used.
        pragma: String,
    },
    /// The block could not be rewritten.
    Failed {
        /// What went wrong.
        error: TranspileError,
        /// The input, unmodified.
        fallback: String,
    },
}

impl TranspileResult {
    /// Returns true if the block was rewritten.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Transpiled { .. })
    }

    /// The rewritten text, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Transpiled { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&TranspileError> {
        match self {
            Self::Transpiled { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// The original input prefixed with a comment describing the failure.
    pub fn annotated_fallback(&self) -> Option<String> {
        match self {
            Self::Transpiled { .. } => None,
            Self::Failed { error, fallback } => Some(format!(
                "/* minijsx: transpile failed: {} */\n{}",
                error.to_string().replace("*/", "* /"),
                fallback
            )),
        }
    }

    /// Text a loader may execute.
    ///
    /// A failed block yields its annotated fallback only when `best_effort` is
    /// set.
    pub fn executable_text(&self, best_effort: bool) -> Option<Cow<'_, str>> {
        match self {
            Self::Transpiled { output, .. } => Some(Cow::Borrowed(output)),
            Self::Failed { .. } if best_effort => self.annotated_fallback().map(Cow::Owned),
            Self::Failed { .. } => None,
        }
    }
}

/// Resolves the pragma and rewrites tags for one block at a time.
///
/// A session holds no per-call state and can be shared between threads.
pub struct TranspileSession {
    resolver: PragmaResolver,
    rewriter: Box<dyn TagRewrite>,
    validate_output: bool,
}

impl fmt::Debug for TranspileSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranspileSession")
            .field("resolver", &self.resolver)
            .field("validate_output", &self.validate_output)
            .finish_non_exhaustive()
    }
}

impl Default for TranspileSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl TranspileSession {
    /// Creates a session using the rewriter selected by `config.mode`.
    pub fn new(config: SessionConfig) -> Self {
        let rewriter = config.mode.rewriter();
        Self::with_rewriter(config, rewriter)
    }

    /// Creates a session with a custom rewriter. `config.mode` is ignored.
    pub fn with_rewriter(config: SessionConfig, rewriter: Box<dyn TagRewrite>) -> Self {
        Self {
            resolver: PragmaResolver::new(config.default_pragma),
            rewriter,
            validate_output: config.validate_output,
        }
    }

    /// The pragma resolver of this session.
    pub fn resolver(&self) -> &PragmaResolver {
        &self.resolver
    }

    /// Transpiles one block.
    ///
    /// Errors and panics from resolution, rewriting and validation all end up
    /// in [`TranspileResult::Failed`], which carries `source` unchanged.
    pub fn transpile(&self, source: &str) -> TranspileResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(source)))
            .unwrap_or_else(|payload| {
                Err(TranspileError::Fault {
                    message: panic_message(payload.as_ref()),
                })
            });

        match outcome {
            Ok((output, pragma)) => {
                log::debug!(
                    "transpiled {} bytes into {} bytes with pragma `{}`",
                    source.len(),
                    output.len(),
                    pragma
                );
                TranspileResult::Transpiled { output, pragma }
            }
            Err(error) => {
                log::warn!("transpile failed: {}", error);
                TranspileResult::Failed {
                    error,
                    fallback: source.to_string(),
                }
            }
        }
    }

    fn run(&self, source: &str) -> Result<(String, String), TranspileError> {
        let pragma = self.resolver.resolve(source);
        let output = self.rewriter.rewrite(source, &pragma)?;
        if self.validate_output {
            validate_output(&output)?;
        }
        Ok((output, pragma))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
