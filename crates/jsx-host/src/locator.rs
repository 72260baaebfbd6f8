//! Discovery of embedded source blocks.

use jsx_transpiler::{TextRange, TextSize};
use std::fmt;
use thiserror::Error;

/// Identifies a block within the document it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

impl BlockId {
    /// Creates an id from a document-local index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The document-local index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A block of source text found in a hosting document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    /// Identity used when reporting back on this block.
    pub id: BlockId,
    /// The raw text to transpile.
    pub text: String,
    /// Where `text` sits in the document.
    pub content: TextRange,
    /// The whole element holding the block.
    pub element: TextRange,
}

/// Errors raised while scanning a hosting document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    /// A `<script>` start tag never reached its `>`.
    #[error("unterminated <script> start tag at byte {offset}")]
    UnterminatedStartTag {
        /// Byte offset of the `<script`.
        offset: usize,
    },

    /// A script element has no `</script>`.
    #[error("missing </script> for the element at byte {offset}")]
    MissingEndTag {
        /// Byte offset of the `<script`.
        offset: usize,
    },
}

/// Finds the blocks of a hosting document that need transpiling.
pub trait SourceLocator {
    /// Returns the blocks of `document` in document order.
    fn locate(&self, document: &str) -> Result<Vec<SourceBlock>, LocateError>;
}

/// Marker attribute set on elements that were already processed.
pub const TRANSFORMED_ATTRIBUTE: &str = "data-transformed";

/// Locates `<script type="text/jsx">` elements in an HTML document.
///
/// Elements already carrying `data-transformed` are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlScriptLocator {
    script_type: String,
}

impl Default for HtmlScriptLocator {
    fn default() -> Self {
        Self::new("text/jsx")
    }
}

impl HtmlScriptLocator {
    /// Creates a locator matching scripts whose `type` is `script_type`.
    pub fn new(script_type: impl Into<String>) -> Self {
        Self {
            script_type: script_type.into(),
        }
    }

    fn wants(&self, attributes: &[(String, Option<String>)]) -> bool {
        let mut matches_type = false;
        for (name, value) in attributes {
            if name.eq_ignore_ascii_case(TRANSFORMED_ATTRIBUTE) {
                return false;
            }
            if name.eq_ignore_ascii_case("type") {
                matches_type = value
                    .as_deref()
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(&self.script_type));
            }
        }
        matches_type
    }
}

impl SourceLocator for HtmlScriptLocator {
    fn locate(&self, document: &str) -> Result<Vec<SourceBlock>, LocateError> {
        let lower = document.to_ascii_lowercase();
        let bytes = document.as_bytes();
        let mut blocks = Vec::new();
        let mut pos = 0;

        while let Some(found) = lower[pos..].find("<script") {
            let start = pos + found;
            let after_name = start + "<script".len();
            // `<scripts>` or `<script-x>` is another element.
            if bytes
                .get(after_name)
                .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'>' && *b != b'/')
            {
                pos = after_name;
                continue;
            }

            let open_end = find_tag_end(bytes, after_name)
                .ok_or(LocateError::UnterminatedStartTag { offset: start })?;
            let content_start = open_end + 1;
            let close_start = lower[content_start..]
                .find("</script")
                .map(|i| content_start + i)
                .ok_or(LocateError::MissingEndTag { offset: start })?;
            let element_end = lower[close_start..]
                .find('>')
                .map(|i| close_start + i + 1)
                .unwrap_or(document.len());

            let attributes = parse_start_tag_attributes(&document[after_name..open_end]);
            if self.wants(&attributes) {
                let id = BlockId::new(blocks.len());
                log::debug!("found script block {} at byte {}", id, start);
                blocks.push(SourceBlock {
                    id,
                    text: document[content_start..close_start].to_string(),
                    content: range(content_start, close_start),
                    element: range(start, element_end),
                });
            }
            pos = element_end;
        }

        Ok(blocks)
    }
}

/// Offsets past `u32::MAX` saturate; documents over 4 GiB get clamped spans.
fn range(start: usize, end: usize) -> TextRange {
    let size = |offset: usize| TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX));
    TextRange::new(size(start), size(end))
}

/// Returns the index of the `>` closing a start tag, honoring quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Splits the inside of a start tag into `(name, value)` pairs.
fn parse_start_tag_attributes(inner: &str) -> Vec<(String, Option<String>)> {
    let mut attributes = Vec::new();
    let mut chars = inner.trim_end_matches('/').chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == '/').is_some() {}
        let mut name = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=' && *c != '/') {
            name.push(c);
        }
        if name.is_empty() {
            break;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next_if_eq(&'=').is_none() {
            attributes.push((name, None));
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        match chars.next_if(|c| *c == '"' || *c == '\'') {
            Some(quote) => {
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            None => {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
            }
        }
        attributes.push((name, Some(value)));
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_locates_jsx_scripts_only() {
        let html = r#"<head>
<script src="lib.js"></script>
<script type="text/jsx">render(<App/>);</script>
<SCRIPT TYPE='TEXT/JSX'>x = <br/>;</SCRIPT>
</head>"#;
        let blocks = HtmlScriptLocator::default().locate(html).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "render(<App/>);");
        assert_eq!(blocks[1].text, "x = <br/>;");
        assert_eq!(blocks[0].id, BlockId::new(0));
        assert_eq!(blocks[1].id, BlockId::new(1));
        let content = blocks[0].content;
        assert_eq!(
            &html[usize::from(content.start())..usize::from(content.end())],
            "render(<App/>);"
        );
    }

    #[test]
    fn test_skips_transformed_blocks() {
        let html = r#"<script type="text/jsx" data-transformed="true">a</script><script type="text/jsx">b</script>"#;
        let blocks = HtmlScriptLocator::default().locate(html).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "b");
    }

    #[test]
    fn test_quoted_gt_in_start_tag() {
        let html = r#"<script data-note="a>b" type="text/jsx">ok</script>"#;
        let blocks = HtmlScriptLocator::default().locate(html).unwrap();
        assert_eq!(blocks[0].text, "ok");
    }

    #[test]
    fn test_similar_element_names_are_ignored() {
        let html = r#"<scripts type="text/jsx">no</scripts>"#;
        assert!(HtmlScriptLocator::default().locate(html).unwrap().is_empty());
    }

    #[test]
    fn test_missing_end_tag() {
        let html = r#"<p></p><script type="text/jsx">never closed"#;
        assert_eq!(
            HtmlScriptLocator::default().locate(html),
            Err(LocateError::MissingEndTag { offset: 7 })
        );
    }

    #[test]
    fn test_custom_type() {
        let html = r#"<script type="text/babel">a</script>"#;
        assert_eq!(HtmlScriptLocator::new("text/babel").locate(html).unwrap().len(), 1);
        assert!(HtmlScriptLocator::default().locate(html).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_parsing() {
        assert_eq!(
            parse_start_tag_attributes(r#" type="text/jsx" defer data-x=1 "#),
            vec![
                ("type".to_string(), Some("text/jsx".to_string())),
                ("defer".to_string(), None),
                ("data-x".to_string(), Some("1".to_string())),
            ]
        );
    }

    #[test]
    fn test_range_saturates_large_offsets() {
        assert_eq!(usize::from(range(3, 9).end()), 9);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            range(1, u32::MAX as usize + 10).end(),
            TextSize::from(u32::MAX)
        );
    }
}
