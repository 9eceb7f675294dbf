pub mod decode;
pub mod encode;
pub mod info;

pub use decode::*;
pub use encode::*;
pub use info::*;

use crate::error::Result;
use std::path::Path;

/// Read a whole file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

/// Files are processed whole; a chunk size is accepted for interface
/// compatibility and otherwise ignored.
pub(crate) fn note_chunk_size(chunk_size: Option<usize>) {
    if let Some(size) = chunk_size {
        log::debug!("chunk size {} ignored, processing whole file", size);
    }
}
