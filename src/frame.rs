//! Wire layout of an embedded frame.
//!
//! ```text
//! [header: 6][length: 16][payload: 8 * N][footer: 4][correction: 0..]
//! ```
//!
//! Every unit is one invisible code point: U+200E (LEFT-TO-RIGHT MARK) stands
//! for bit 1, U+200F (RIGHT-TO-LEFT MARK) for bit 0. The length field counts
//! payload marks, not bytes, and is written most-significant bit first.

use crate::error::{BidimarkError, Result};
use std::fmt;

/// U+200E LEFT-TO-RIGHT MARK
pub const LTR_MARK: char = '\u{200E}';

/// U+200F RIGHT-TO-LEFT MARK
pub const RTL_MARK: char = '\u{200F}';

/// One invisible frame unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Bit 1
    Ltr,
    /// Bit 0
    Rtl,
}

impl Mark {
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Mark::Ltr
        } else {
            Mark::Rtl
        }
    }

    pub const fn bit(self) -> bool {
        matches!(self, Mark::Ltr)
    }

    pub const fn as_char(self) -> char {
        match self {
            Mark::Ltr => LTR_MARK,
            Mark::Rtl => RTL_MARK,
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            LTR_MARK => Some(Mark::Ltr),
            RTL_MARK => Some(Mark::Rtl),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Ltr => f.write_str("LRM"),
            Mark::Rtl => f.write_str("RLM"),
        }
    }
}

/// Frame start sentinel
pub const HEADER: [Mark; 6] = [Mark::Rtl, Mark::Rtl, Mark::Rtl, Mark::Ltr, Mark::Ltr, Mark::Ltr];

/// Frame end sentinel
pub const FOOTER: [Mark; 4] = [Mark::Rtl, Mark::Rtl, Mark::Ltr, Mark::Ltr];

/// Width of the length field in marks
pub const LENGTH_MARKS: usize = 16;

/// Largest whole-byte payload whose bit count fits the length field
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize / 8;

/// Marks in a frame carrying `payload_len` bytes, correction excluded
pub const fn frame_len(payload_len: usize) -> usize {
    HEADER.len() + LENGTH_MARKS + payload_len * 8 + FOOTER.len()
}

/// Expand bytes into marks, most-significant bit first
pub fn bytes_to_marks(bytes: &[u8]) -> impl Iterator<Item = Mark> + '_ {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |i| Mark::from_bit((byte >> i) & 1 == 1)))
}

/// Render the length field for a payload of `bit_count` marks
pub fn length_marks(bit_count: u16) -> impl Iterator<Item = Mark> {
    (0..LENGTH_MARKS)
        .rev()
        .map(move |i| Mark::from_bit((bit_count >> i) & 1 == 1))
}

/// Read a big-endian unsigned integer out of a run of marks
pub fn marks_to_u16(marks: &[Mark]) -> u16 {
    marks
        .iter()
        .fold(0u16, |acc, m| (acc << 1) | u16::from(m.bit()))
}

/// Pack marks back into bytes.
///
/// Whole 8-mark chunks become bytes. A trailing partial chunk is read as a
/// small integer and kept only when non-zero, which is how a zero padding
/// bit left over from a misaligned length field disappears without touching
/// real payload bytes.
pub fn marks_to_bytes(marks: &[Mark]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(marks.len() / 8 + 1);
    let mut chunks = marks.chunks_exact(8);
    for chunk in &mut chunks {
        bytes.push(chunk.iter().fold(0u8, |acc, m| (acc << 1) | u8::from(m.bit())));
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let tail = rest.iter().fold(0u8, |acc, m| (acc << 1) | u8::from(m.bit()));
        if tail != 0 {
            bytes.push(tail);
        }
    }
    bytes
}

/// Serialize `payload` into a complete frame string, correction excluded
pub fn build_frame(payload: &[u8]) -> Result<String> {
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(BidimarkError::PayloadTooLarge(payload.len()));
    }
    // Cannot overflow after the bound check above
    let bit_count = (payload.len() * 8) as u16;

    let mut frame = String::with_capacity(frame_len(payload.len()) * LTR_MARK.len_utf8());
    frame.extend(HEADER.iter().map(|m| m.as_char()));
    frame.extend(length_marks(bit_count).map(Mark::as_char));
    frame.extend(bytes_to_marks(payload).map(Mark::as_char));
    frame.extend(FOOTER.iter().map(|m| m.as_char()));
    Ok(frame)
}
