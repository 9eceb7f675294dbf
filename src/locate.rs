//! Choosing where a frame is spliced into a carrier.
//!
//! The frame always goes right after a space between two words of visible
//! text, or at the end when no such gap exists. It is never placed inside or
//! next to a tag, so tag count and order are untouched.

use crate::html::{self, Segment, TagKind};

/// A carrier cut in two at the splice point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub before: &'a str,
    pub after: &'a str,
}

impl<'a> Split<'a> {
    fn at(text: &'a str, offset: usize) -> Self {
        let (before, after) = text.split_at(offset);
        Self { before, after }
    }

    /// Byte offset of the splice point
    pub fn offset(&self) -> usize {
        self.before.len()
    }

    /// Concatenate the halves around `insert`
    pub fn join(&self, insert: &str) -> String {
        let mut out = String::with_capacity(self.before.len() + insert.len() + self.after.len());
        out.push_str(self.before);
        out.push_str(insert);
        out.push_str(self.after);
        out
    }
}

/// Offset just past the first space that sits between two non-whitespace
/// runs of `s`, ignoring leading and trailing whitespace
fn after_first_interior_space(s: &str) -> Option<usize> {
    let lead = s.len() - s.trim_start().len();
    let content = s.trim();
    content.find(' ').map(|idx| lead + idx + 1)
}

/// Find the splice point in `text`, HTML or not
pub fn locate(text: &str) -> Split<'_> {
    if html::is_html(text) {
        locate_html(text)
    } else {
        locate_plain(text)
    }
}

/// Plain-text rule: after the first word, or at the end of the content
pub fn locate_plain(text: &str) -> Split<'_> {
    let offset = after_first_interior_space(text).unwrap_or_else(|| text.trim_end().len());
    log::debug!("plain text splice at byte {}", offset);
    Split::at(text, offset)
}

/// HTML rule: between two words of the first text node that has a gap,
/// skipping anything inside an open `<script>` or `<style>`
pub fn locate_html(text: &str) -> Split<'_> {
    let doc = html::split(text);
    let mut raw_text_open = false;

    for segment in &doc.segments {
        match segment {
            Segment::Tag { raw, .. } => match html::tag_kind(raw) {
                TagKind::Open(name) if html::is_raw_text_element(name) => raw_text_open = true,
                TagKind::Close(name) if html::is_raw_text_element(name) => raw_text_open = false,
                _ => {}
            },
            Segment::Text { offset, raw } => {
                if raw_text_open || raw.trim().is_empty() {
                    continue;
                }
                if let Some(idx) = after_first_interior_space(raw) {
                    let at = offset + idx;
                    log::debug!("html splice at byte {} inside text node at {}", at, offset);
                    return Split::at(text, at);
                }
            }
        }
    }

    log::debug!("no text node with a word gap, appending at end");
    Split::at(text, text.len())
}
