//! Bidimark - hide bytes in text with invisible bidirectional marks
//!
//! A payload is serialized into a run of U+200E / U+200F marks and spliced
//! between two words of a carrier text. The carrier renders exactly as
//! before: no visible character changes, HTML tags are never touched, and
//! the overall reading direction of the text is kept.
//!
//! ## Frame
//!
//! ```text
//! header (6) | length (16) | payload (8 * N) | footer (4) | correction (0..)
//! ```
//!
//! - **header**: `RLM RLM RLM LRM LRM LRM`
//! - **length**: number of payload marks, big-endian
//! - **payload**: each byte MSB first, `LRM` = 1, `RLM` = 0
//! - **footer**: `RLM RLM LRM LRM`
//! - **correction**: marks of the original direction, present only when the
//!   frame flipped the carrier between LTR and RTL
//!
//! This is not encryption, and anything that strips or normalizes Unicode
//! control characters destroys the payload.
//!
//! ## Example
//!
//! ```
//! let text = bidimark::encode("This is a test text", b"ID1");
//! assert_eq!(bidimark::decode(&text), b"ID1");
//!
//! let html = "<script>x()</script><p>Hello world</p>";
//! let marked = bidimark::encode(html, b"abc");
//! assert!(marked.starts_with("<script>x()</script><p>Hello "));
//! assert_eq!(bidimark::decode(&marked), b"abc");
//! ```

pub mod cli;
pub mod decoder;
pub mod direction;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod html;
pub mod locate;

pub use decoder::{DecodedFrame, Decoder};
pub use direction::{classify, Direction, DirectionCounts};
pub use encoder::{CorrectionPolicy, Encoded, Encoder, EncoderConfig};
pub use error::{BidimarkError, FrameError, Result};
pub use html::{is_html, split, Segment};
pub use locate::{locate, Split};

/// Hide `payload` in `carrier`.
///
/// Never fails. A payload too large for the length field leaves the carrier
/// unchanged.
pub fn encode(carrier: &str, payload: &[u8]) -> String {
    Encoder::default().encode(carrier, payload)
}

/// Hide `payload` in `carrier`, reporting oversized payloads as errors
pub fn try_encode(carrier: &str, payload: &[u8]) -> Result<Encoded> {
    Encoder::default().try_encode(carrier, payload)
}

/// Recover the payload hidden in `text`, or an empty vector when there is none
pub fn decode(text: &str) -> Vec<u8> {
    Decoder::new().decode(text)
}

/// Recover the frame hidden in `text` along with where it sits
pub fn try_decode(text: &str) -> std::result::Result<DecodedFrame, FrameError> {
    Decoder::new().try_decode(text)
}
