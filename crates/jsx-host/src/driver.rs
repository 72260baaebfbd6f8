//! Feeding located blocks through a session into a loader.

use crate::loader::{LoadError, Loader};
use crate::locator::{BlockId, LocateError, SourceLocator};
use jsx_transpiler::{TextRange, TranspileResult, TranspileSession};

/// Options for [`process_document`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOptions {
    /// Load the annotated original text of blocks that failed to transpile.
    pub best_effort: bool,
}

/// What happened to one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStatus {
    /// The transpiled code was loaded.
    Loaded,
    /// Transpiling failed and the annotated original was loaded instead.
    LoadedFallback,
    /// Transpiling failed and nothing was loaded.
    Skipped,
    /// The loader rejected the code.
    LoadFailed(LoadError),
}

/// The outcome for one block.
#[derive(Debug, Clone)]
pub struct BlockReport {
    /// The block's identity.
    pub id: BlockId,
    /// Where the block's text sits in the document.
    pub content: TextRange,
    /// The transpile outcome.
    pub result: TranspileResult,
    /// What the loader did with it.
    pub status: BlockStatus,
}

impl BlockReport {
    /// Returns true if the block needs attention.
    pub fn is_failure(&self) -> bool {
        !matches!(self.status, BlockStatus::Loaded)
    }
}

/// Transpiles every block of `document` and hands the results to `loader`.
///
/// A failing block never stops the others.
pub fn process_document(
    session: &TranspileSession,
    locator: &dyn SourceLocator,
    loader: &mut dyn Loader,
    document: &str,
    options: HostOptions,
) -> Result<Vec<BlockReport>, LocateError> {
    let blocks = locator.locate(document)?;
    let mut reports = Vec::with_capacity(blocks.len());

    for block in blocks {
        let result = session.transpile(&block.text);
        let status = match result.executable_text(options.best_effort) {
            Some(code) => match loader.load(&block, &code) {
                Ok(()) if result.is_ok() => BlockStatus::Loaded,
                Ok(()) => {
                    log::warn!("block {} loaded untransformed", block.id);
                    BlockStatus::LoadedFallback
                }
                Err(err) => {
                    log::warn!("{}", err);
                    BlockStatus::LoadFailed(err)
                }
            },
            None => {
                log::warn!("block {} skipped", block.id);
                BlockStatus::Skipped
            }
        };
        reports.push(BlockReport {
            id: block.id,
            content: block.content,
            result,
            status,
        });
    }

    Ok(reports)
}
