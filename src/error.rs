use thiserror::Error;

/// Reasons a text does not yield a frame.
///
/// The facade [`crate::decode`] collapses all of these into an empty payload;
/// [`crate::try_decode`] keeps them apart.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("no frame header found")]
    NoHeader,

    #[error("frame truncated: needs {needed} characters, text has {found}")]
    Truncated { needed: usize, found: usize },

    #[error("non-mark character U+{0:04X} inside frame")]
    InvalidMark(u32),

    #[error("frame footer missing after {0} payload marks")]
    MissingFooter(usize),
}

#[derive(Error, Debug)]
pub enum BidimarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload too large: {0} bytes. Maximum is {max} bytes", max = crate::frame::MAX_PAYLOAD_BYTES)]
    PayloadTooLarge(usize),

    #[error("Invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("Input is not valid UTF-8 text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    #[error("Payload required: pass --message or --payload")]
    MissingPayload,
}

pub type Result<T> = std::result::Result<T, BidimarkError>;
