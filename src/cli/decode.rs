use crate::cli::{note_chunk_size, read_text};
use crate::decoder::{DecodedFrame, Decoder};
use crate::error::Result;
use std::path::Path;

/// Options for the decode command
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub chunk_size: Option<usize>,
}

/// Read the frame hidden in a file.
///
/// Unlike [`crate::decode`], a file without a frame is an error here so the
/// command line can tell "empty payload" from "nothing found".
pub fn decode_file(input_path: &Path, options: &DecodeOptions) -> Result<DecodedFrame> {
    note_chunk_size(options.chunk_size);
    let text = read_text(input_path)?;
    Ok(Decoder::new().try_decode(&text)?)
}

/// Read the payload hidden in `input_path` and write it to `output_path`.
/// Returns the payload size in bytes.
pub fn extract_to_file(input_path: &Path, output_path: &Path, options: &DecodeOptions) -> Result<usize> {
    let decoded = decode_file(input_path, options)?;
    std::fs::write(output_path, &decoded.payload)?;
    Ok(decoded.payload.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::encode::{encode_file, EncodeOptions};
    use crate::error::{BidimarkError, FrameError};
    use tempfile::tempdir;

    #[test]
    fn test_extract_roundtrip() {
        let dir = tempdir().unwrap();
        let carrier = dir.path().join("carrier.html");
        let marked = dir.path().join("marked.html");
        let recovered = dir.path().join("payload.bin");

        std::fs::write(&carrier, "<html><body><p>Hello there, world</p></body></html>").unwrap();
        let payload = [0u8, 1, 2, 254, 255, 0];
        encode_file(&carrier, &marked, &payload, &EncodeOptions::default()).unwrap();

        let size = extract_to_file(&marked, &recovered, &DecodeOptions::default()).unwrap();
        assert_eq!(size, payload.len());
        assert_eq!(std::fs::read(&recovered).unwrap(), payload);
    }

    #[test]
    fn test_decode_file_without_frame() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("plain.txt");
        std::fs::write(&input, "nothing hidden here").unwrap();

        let result = decode_file(&input, &DecodeOptions::default());
        assert!(matches!(result, Err(BidimarkError::Frame(FrameError::NoHeader))));
    }

    #[test]
    fn test_decode_file_empty_payload_is_success() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("marked.txt");
        std::fs::write(&input, crate::encode("a b", &[])).unwrap();

        let decoded = decode_file(&input, &DecodeOptions { chunk_size: Some(1) }).unwrap();
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_decode_file_missing() {
        let dir = tempdir().unwrap();
        let result = decode_file(&dir.path().join("absent"), &DecodeOptions::default());
        assert!(matches!(result, Err(BidimarkError::Io(_))));
    }
}
