//! Host adapters for the JSX transpiler.
//!
//! A host finds embedded blocks with a [`SourceLocator`], transpiles each
//! one, and hands the results to a [`Loader`]. The shipped adapters work on
//! HTML documents: [`HtmlScriptLocator`] finds `<script type="text/jsx">`
//! elements and [`HtmlScriptEmitter`] writes the transpiled code back into
//! the page as plain scripts.
//!
//! # Example
//!
//! ```
//! use jsx_host::{process_document, HostOptions, HtmlScriptEmitter, HtmlScriptLocator};
//! use jsx_transpiler::TranspileSession;
//!
//! let page = r#"<script type="text/jsx">mount(<br/>);</script>"#;
//! let mut emitter = HtmlScriptEmitter::new();
//! let reports = process_document(
//!     &TranspileSession::default(),
//!     &HtmlScriptLocator::default(),
//!     &mut emitter,
//!     page,
//!     HostOptions::default(),
//! )
//! .unwrap();
//! assert!(reports.iter().all(|r| !r.is_failure()));
//! assert!(emitter.finish(page).contains("mount(createElement('br', null));"));
//! ```

mod driver;
mod loader;
mod locator;

pub use driver::{process_document, BlockReport, BlockStatus, HostOptions};
pub use loader::{HtmlScriptEmitter, LoadError, Loader};
pub use locator::{
    BlockId, HtmlScriptLocator, LocateError, SourceBlock, SourceLocator, TRANSFORMED_ATTRIBUTE,
};
