//! Tag scanner used by strict mode.
//!
//! The scanner walks the input with three states: outside any tag, inside a
//! tag, and inside an attribute value. Quote and brace delimited values are
//! skipped as a unit, so a `>` inside them does not end the tag.

use crate::error::TranspileError;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

/// How a tag occurrence is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `<name attrs/>`
    SelfClosing,
    /// `<name attrs>`
    Opening,
    /// `</name>`
    Closing,
}

/// One tag occurrence in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'a> {
    /// The kind of tag.
    pub kind: TagKind,
    /// The tag name.
    pub name: SmolStr,
    /// Text between the name and `>` or `/>`. Always empty for closing tags.
    pub raw_attributes: &'a str,
    /// The whole tag, `<` through `>`.
    pub span: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueDelimiter {
    Quote(u8),
    Brace(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    OutsideTag,
    InsideTag,
    InsideValue(ValueDelimiter),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Converts a byte offset. Offsets past `u32::MAX` saturate, so spans in
/// blocks over 4 GiB are clamped rather than wrapped.
pub(crate) fn text_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(text_size(start), text_size(end))
}

/// Iterator over the tags of a source block.
///
/// Yields an error and stops when the input ends inside an attribute value.
/// A `<` followed by a name that never reaches `>` is left as plain text.
pub struct TagScanner<'a> {
    source: &'a str,
    pos: usize,
    finished: bool,
}

impl<'a> TagScanner<'a> {
    /// Creates a scanner over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            finished: false,
        }
    }

    fn name_end(&self, from: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut end = from;
        while end < bytes.len() && is_name_byte(bytes[end]) {
            end += 1;
        }
        end
    }

    /// Matches `</name>` at `start`.
    fn closing_tag(&self, start: usize) -> Option<TagToken<'a>> {
        let bytes = self.source.as_bytes();
        if bytes.get(start + 1) != Some(&b'/') {
            return None;
        }
        let name_start = start + 2;
        let name_end = self.name_end(name_start);
        if name_end == name_start || bytes.get(name_end) != Some(&b'>') {
            return None;
        }
        Some(TagToken {
            kind: TagKind::Closing,
            name: SmolStr::new(&self.source[name_start..name_end]),
            raw_attributes: "",
            span: range(start, name_end + 1),
        })
    }
}

impl<'a> Iterator for TagScanner<'a> {
    type Item = Result<TagToken<'a>, TranspileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let bytes = self.source.as_bytes();
        let mut state = ScanState::OutsideTag;
        let mut tag_start = self.pos;
        let mut name_end = self.pos;
        let mut i = self.pos;

        loop {
            while i < bytes.len() {
                let b = bytes[i];
                match state {
                    ScanState::OutsideTag => {
                        if b == b'<' {
                            if let Some(token) = self.closing_tag(i) {
                                self.pos = usize::from(token.span.end());
                                return Some(Ok(token));
                            }
                            let end = self.name_end(i + 1);
                            if end > i + 1 {
                                tag_start = i;
                                name_end = end;
                                state = ScanState::InsideTag;
                                i = end;
                                continue;
                            }
                        }
                    }
                    ScanState::InsideTag => match b {
                        b'"' | b'\'' => state = ScanState::InsideValue(ValueDelimiter::Quote(b)),
                        b'{' => state = ScanState::InsideValue(ValueDelimiter::Brace(1)),
                        b'>' => {
                            let self_closing = i > name_end && bytes[i - 1] == b'/';
                            let (kind, attrs_end) = if self_closing {
                                (TagKind::SelfClosing, i - 1)
                            } else {
                                (TagKind::Opening, i)
                            };
                            self.pos = i + 1;
                            return Some(Ok(TagToken {
                                kind,
                                name: SmolStr::new(&self.source[tag_start + 1..name_end]),
                                raw_attributes: &self.source[name_end..attrs_end],
                                span: range(tag_start, i + 1),
                            }));
                        }
                        _ => {}
                    },
                    ScanState::InsideValue(ValueDelimiter::Quote(quote)) => {
                        if b == quote {
                            state = ScanState::InsideTag;
                        }
                    }
                    ScanState::InsideValue(ValueDelimiter::Brace(depth)) => match b {
                        b'{' => state = ScanState::InsideValue(ValueDelimiter::Brace(depth + 1)),
                        b'}' if depth == 1 => state = ScanState::InsideTag,
                        b'}' => state = ScanState::InsideValue(ValueDelimiter::Brace(depth - 1)),
                        _ => {}
                    },
                }
                i += 1;
            }

            // A `<name` that never reaches `>` is a comparison, not a tag.
            if state == ScanState::InsideTag {
                state = ScanState::OutsideTag;
                i = tag_start + 1;
                continue;
            }
            break;
        }

        self.finished = true;
        self.pos = bytes.len();
        if state == ScanState::OutsideTag {
            return None;
        }
        Some(Err(TranspileError::UnterminatedTag {
            tag_name: self.source[tag_start + 1..name_end].to_string(),
            span: range(tag_start, bytes.len()),
        }))
    }
}
