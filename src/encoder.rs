//! Embedding a payload into carrier text.
//!
//! ```text
//! classify carrier -> locate splice -> build frame -> splice -> re-classify -> correct
//! ```
//!
//! The encoder never changes visible characters. If the frame's own marks
//! tip the carrier from LTR to RTL (or back), correction marks of the
//! original direction are appended right after the footer.

use crate::direction::{self, Direction};
use crate::error::{BidimarkError, Result};
use crate::frame::{self, Mark};
use crate::locate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How to undo a direction flip caused by the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionPolicy {
    /// Append as many marks as it takes to restore the original verdict
    #[default]
    Restore,
    /// Append at most one mark
    Single,
    /// Never append
    None,
}

impl std::str::FromStr for CorrectionPolicy {
    type Err = BidimarkError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "restore" => Ok(Self::Restore),
            "single" => Ok(Self::Single),
            "none" | "off" => Ok(Self::None),
            _ => Err(BidimarkError::UnsupportedValue(format!("correction: {}", s))),
        }
    }
}

/// Encoder settings, loadable from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub correction: CorrectionPolicy,
}

impl EncoderConfig {
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read(path)?)
    }
}

/// Output of a successful encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub text: String,
    /// Byte offset in the carrier where the frame starts
    pub offset: usize,
    pub original: Direction,
    /// Verdict of `text`, after correction
    pub direction: Direction,
    pub correction_marks: usize,
}

/// Stateless frame embedder
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Embed `payload` into `carrier`.
    ///
    /// Fails only when the payload does not fit the 16-bit length field.
    pub fn try_encode(&self, carrier: &str, payload: &[u8]) -> Result<Encoded> {
        let frame = frame::build_frame(payload)?;
        let original = direction::classify(carrier);
        let split = locate::locate(carrier);

        let mut text = split.join(&frame);
        let counts = direction::count(&text);
        let after = counts.verdict();

        let correction_marks = if original.crosses(after) {
            let needed = counts.marks_to_restore(original);
            let marks = match self.config.correction {
                CorrectionPolicy::Restore => needed,
                CorrectionPolicy::Single => needed.min(1),
                CorrectionPolicy::None => 0,
            };
            log::debug!(
                "frame flipped direction {} -> {}, appending {} of {} correction marks",
                original,
                after,
                marks,
                needed
            );
            marks
        } else {
            0
        };

        if correction_marks > 0 {
            let mark = match original {
                Direction::Rtl => Mark::Rtl,
                _ => Mark::Ltr,
            };
            let at = split.offset() + frame.len();
            let run: String = std::iter::repeat(mark.as_char()).take(correction_marks).collect();
            text.insert_str(at, &run);
        }

        let direction = if correction_marks > 0 {
            direction::classify(&text)
        } else {
            after
        };

        log::debug!(
            "embedded {} payload bytes ({} marks) at byte {}",
            payload.len(),
            frame::frame_len(payload.len()) + correction_marks,
            split.offset()
        );

        Ok(Encoded {
            text,
            offset: split.offset(),
            original,
            direction,
            correction_marks,
        })
    }

    /// Embed `payload` into `carrier`, returning the carrier unchanged when
    /// the payload is too large to frame
    pub fn encode(&self, carrier: &str, payload: &[u8]) -> String {
        match self.try_encode(carrier, payload) {
            Ok(encoded) => encoded.text,
            Err(e) => {
                log::warn!("nothing embedded: {}", e);
                carrier.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{LTR_MARK, MAX_PAYLOAD_BYTES, RTL_MARK};

    fn visible(text: &str) -> String {
        text.chars().filter(|&c| c != LTR_MARK && c != RTL_MARK).collect()
    }

    #[test]
    fn test_visible_text_unchanged() {
        let carrier = "This is a test text";
        let out = Encoder::default().encode(carrier, b"ID1");
        assert_eq!(visible(&out), carrier);
        assert!(out.starts_with("This "));
    }

    #[test]
    fn test_frame_position() {
        let encoded = Encoder::default().try_encode("Hello world", b"x").unwrap();
        assert_eq!(encoded.offset, "Hello ".len());
        assert!(encoded.text.ends_with("world"));
    }

    #[test]
    fn test_correction_restores_ltr() {
        // "ID1" carries far more zero bits than one bits, so the frame alone tips
        // a short LTR carrier to RTL
        let carrier = "This is a test text";
        assert_eq!(direction::classify(carrier), Direction::Ltr);

        let raw = locate::locate(carrier).join(&frame::build_frame(b"ID1").unwrap());
        assert_eq!(direction::classify(&raw), Direction::Rtl);

        let encoded = Encoder::default().try_encode(carrier, b"ID1").unwrap();
        assert_eq!(encoded.original, Direction::Ltr);
        assert_eq!(encoded.direction, Direction::Ltr);
        assert!(encoded.correction_marks > 0);
        assert_eq!(direction::classify(&encoded.text), Direction::Ltr);
    }

    #[test]
    fn test_single_policy_appends_one_mark() {
        let encoder = Encoder::new(EncoderConfig {
            correction: CorrectionPolicy::Single,
        });
        let encoded = encoder.try_encode("This is a test text", b"ID1").unwrap();
        assert_eq!(encoded.correction_marks, 1);

        let frame_end = encoded.offset + frame::build_frame(b"ID1").unwrap().len();
        assert_eq!(encoded.text[frame_end..].chars().next(), Some(LTR_MARK));
    }

    #[test]
    fn test_none_policy() {
        let encoder = Encoder::new(EncoderConfig {
            correction: CorrectionPolicy::None,
        });
        let encoded = encoder.try_encode("This is a test text", b"ID1").unwrap();
        assert_eq!(encoded.correction_marks, 0);
        assert_eq!(encoded.direction, Direction::Rtl);
    }

    #[test]
    fn test_rtl_correction_mark_is_rtl() {
        // All-ones payload pushes a short RTL carrier to LTR
        let carrier = "שלום עולם";
        let encoded = Encoder::default().try_encode(carrier, &[0xFF; 4]).unwrap();
        assert_eq!(encoded.original, Direction::Rtl);
        assert_eq!(encoded.direction, Direction::Rtl);
        assert!(encoded.correction_marks > 0);

        let frame_end = encoded.offset + frame::build_frame(&[0xFF; 4]).unwrap().len();
        assert!(encoded.text[frame_end..]
            .chars()
            .take(encoded.correction_marks)
            .all(|c| c == RTL_MARK));
    }

    #[test]
    fn test_neutral_never_corrected() {
        let encoded = Encoder::default().try_encode("12345 67890", &[0x00; 8]).unwrap();
        assert_eq!(encoded.original, Direction::Neutral);
        assert_eq!(encoded.correction_marks, 0);
        assert_eq!(encoded.direction, Direction::Rtl);
    }

    #[test]
    fn test_empty_carrier_and_payload() {
        let encoded = Encoder::default().try_encode("", &[]).unwrap();
        assert_eq!(encoded.offset, 0);
        assert_eq!(encoded.text, frame::build_frame(&[]).unwrap());
    }

    #[test]
    fn test_oversized_payload() {
        let payload = vec![1u8; MAX_PAYLOAD_BYTES + 1];
        let encoder = Encoder::default();
        assert!(matches!(
            encoder.try_encode("a b", &payload),
            Err(BidimarkError::PayloadTooLarge(_))
        ));
        assert_eq!(encoder.encode("a b", &payload), "a b");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Restore".parse::<CorrectionPolicy>().unwrap(), CorrectionPolicy::Restore);
        assert_eq!("single".parse::<CorrectionPolicy>().unwrap(), CorrectionPolicy::Single);
        assert_eq!("off".parse::<CorrectionPolicy>().unwrap(), CorrectionPolicy::None);
        assert!("twice".parse::<CorrectionPolicy>().is_err());
    }

    #[test]
    fn test_config_json() {
        let config = EncoderConfig::from_json(br#"{"correction":"single"}"#).unwrap();
        assert_eq!(config.correction, CorrectionPolicy::Single);
        let config = EncoderConfig::from_json(b"{}").unwrap();
        assert_eq!(config, EncoderConfig::default());
        assert!(EncoderConfig::from_json(br#"{"correction":"twice"}"#).is_err());
    }
}
