//! Handing transpiled blocks over for execution.

use crate::locator::{BlockId, SourceBlock, TRANSFORMED_ATTRIBUTE};
use thiserror::Error;

/// Errors raised by a loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The code cannot be embedded where the loader puts it.
    #[error("block {id} cannot be embedded: {reason}")]
    Unembeddable {
        /// The rejected block.
        id: BlockId,
        /// Why it was rejected.
        reason: String,
    },

    /// The same block was loaded twice.
    #[error("block {id} was already loaded")]
    AlreadyLoaded {
        /// The repeated block.
        id: BlockId,
    },
}

/// Makes transpiled code executable in the host.
pub trait Loader {
    /// Accepts the code produced for `block`.
    fn load(&mut self, block: &SourceBlock, code: &str) -> Result<(), LoadError>;
}

#[derive(Debug, Clone)]
struct LoadedScript {
    block: SourceBlock,
    code: String,
}

/// Loader that rewrites an HTML document.
///
/// Every loaded block gets `data-transformed="true"` on its element, and its
/// code is appended as a plain `<script>` before `</body>`, or at the end of
/// the document when there is no body, so it runs once the page content
/// exists.
#[derive(Debug, Clone, Default)]
pub struct HtmlScriptEmitter {
    loaded: Vec<LoadedScript>,
}

impl HtmlScriptEmitter {
    /// Creates an emitter with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks loaded so far.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    /// Returns true if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Produces the rewritten document.
    pub fn finish(mut self, document: &str) -> String {
        self.loaded.sort_by_key(|script| script.block.element.start());

        let mut output = String::with_capacity(document.len() + self.loaded.len() * 64);
        let mut last = 0;
        for script in &self.loaded {
            let marker_at = usize::from(script.block.element.start()) + "<script".len();
            output.push_str(&document[last..marker_at]);
            output.push(' ');
            output.push_str(TRANSFORMED_ATTRIBUTE);
            output.push_str("=\"true\"");
            last = marker_at;
        }
        output.push_str(&document[last..]);

        let mut scripts = String::new();
        for script in &self.loaded {
            scripts.push_str("<script>\n");
            scripts.push_str(&script.code);
            scripts.push_str("\n</script>\n");
        }

        match output.to_ascii_lowercase().rfind("</body>") {
            Some(body_end) => output.insert_str(body_end, &scripts),
            None => {
                if !output.is_empty() && !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push_str(&scripts);
            }
        }
        output
    }
}

impl Loader for HtmlScriptEmitter {
    fn load(&mut self, block: &SourceBlock, code: &str) -> Result<(), LoadError> {
        if code.to_ascii_lowercase().contains("</script") {
            return Err(LoadError::Unembeddable {
                id: block.id,
                reason: "code contains `</script`".to_string(),
            });
        }
        if self.loaded.iter().any(|script| script.block.id == block.id) {
            return Err(LoadError::AlreadyLoaded { id: block.id });
        }
        self.loaded.push(LoadedScript {
            block: block.clone(),
            code: code.to_string(),
        });
        Ok(())
    }
}
