use crate::cli::{note_chunk_size, read_text};
use crate::encoder::{Encoded, Encoder, EncoderConfig};
use crate::error::Result;
use std::path::Path;

/// Options for the encode command
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub config: EncoderConfig,
    pub chunk_size: Option<usize>,
}

/// Hide `payload` in the carrier file and write the result to `output_path`.
/// Returns the encode report.
pub fn encode_file(
    carrier_path: &Path,
    output_path: &Path,
    payload: &[u8],
    options: &EncodeOptions,
) -> Result<Encoded> {
    note_chunk_size(options.chunk_size);
    let carrier = read_text(carrier_path)?;

    let encoded = Encoder::new(options.config.clone()).try_encode(&carrier, payload)?;

    std::fs::write(output_path, &encoded.text)?;
    Ok(encoded)
}
