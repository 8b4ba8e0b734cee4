/// Errors that can occur while encoding or decoding payloads.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The value could not be serialized.
    #[error("payload encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The bytes are not a valid MessagePack document.
    #[error("payload decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// A complete value was decoded but bytes were left over.
    #[error("payload has {remaining} trailing bytes after the value")]
    TrailingBytes { remaining: usize },
}

pub type Result<T> = std::result::Result<T, PayloadError>;
