//! Recovering a payload from text.
//!
//! The decoder never fails outward: [`Decoder::decode`] returns an empty
//! payload whenever no complete frame can be read. [`Decoder::try_decode`]
//! reports why.

use crate::error::FrameError;
use crate::frame::{self, Mark, FOOTER, HEADER, LENGTH_MARKS};
use std::ops::Range;

/// A frame read back out of a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub payload: Vec<u8>,
    /// Byte range of the frame, header through footer
    pub span: Range<usize>,
    /// Marks immediately after the footer, i.e. direction correction
    pub trailing_marks: usize,
}

/// Stateless frame reader
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Read the first complete frame in `text`.
    ///
    /// Every header occurrence is tried in order, so marks already present in
    /// the carrier ahead of the real frame do not hide it. When none parses,
    /// the error from the first attempt is returned.
    pub fn try_decode(&self, text: &str) -> Result<DecodedFrame, FrameError> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut first_error = None;

        for start in header_positions(&chars) {
            match read_frame(text, &chars, start) {
                Ok(decoded) => return Ok(decoded),
                Err(e) => {
                    log::trace!("header at char {} rejected: {}", start, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or(FrameError::NoHeader))
    }

    /// Read the payload out of `text`, or nothing
    pub fn decode(&self, text: &str) -> Vec<u8> {
        match self.try_decode(text) {
            Ok(decoded) => decoded.payload,
            Err(e) => {
                log::debug!("no payload recovered: {}", e);
                Vec::new()
            }
        }
    }
}

fn header_positions(chars: &[(usize, char)]) -> impl Iterator<Item = usize> + '_ {
    chars
        .windows(HEADER.len())
        .enumerate()
        .filter(|(_, window)| {
            window
                .iter()
                .zip(HEADER.iter())
                .all(|(&(_, c), m)| c == m.as_char())
        })
        .map(|(i, _)| i)
}

/// Convert `count` chars starting at char index `from` into marks
fn read_marks(chars: &[(usize, char)], from: usize, count: usize) -> Result<Vec<Mark>, FrameError> {
    let available = chars.len().saturating_sub(from);
    if available < count {
        return Err(FrameError::Truncated {
            needed: from + count,
            found: chars.len(),
        });
    }
    chars[from..from + count]
        .iter()
        .map(|&(_, c)| Mark::from_char(c).ok_or(FrameError::InvalidMark(c as u32)))
        .collect()
}

fn read_frame(text: &str, chars: &[(usize, char)], start: usize) -> Result<DecodedFrame, FrameError> {
    let length_at = start + HEADER.len();
    let bits = frame::marks_to_u16(&read_marks(chars, length_at, LENGTH_MARKS)?) as usize;

    let payload_at = length_at + LENGTH_MARKS;
    let payload_marks = read_marks(chars, payload_at, bits)?;

    let footer_at = payload_at + bits;
    let footer = read_marks(chars, footer_at, FOOTER.len()).map_err(|e| match e {
        FrameError::Truncated { .. } => FrameError::MissingFooter(bits),
        other => other,
    })?;
    if footer != FOOTER {
        return Err(FrameError::MissingFooter(bits));
    }

    let end_char = footer_at + FOOTER.len();
    let end = chars.get(end_char).map_or(text.len(), |&(i, _)| i);
    let trailing_marks = chars[end_char..]
        .iter()
        .take_while(|&&(_, c)| Mark::from_char(c).is_some())
        .count();

    Ok(DecodedFrame {
        payload: frame::marks_to_bytes(&payload_marks),
        span: chars[start].0..end,
        trailing_marks,
    })
}
