use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Length prefix: u32, big-endian.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Correlation id: 16 opaque bytes.
pub const CORRELATION_ID_SIZE: usize = 16;

/// Fixed part of every frame: length prefix (4) + correlation id (16) = 20 bytes.
pub const HEADER_SIZE: usize = LENGTH_PREFIX_SIZE + CORRELATION_ID_SIZE;

/// Largest payload the length prefix can describe.
pub const MAX_PAYLOAD: usize = u32::MAX as usize - CORRELATION_ID_SIZE;

/// Opaque 16-byte value linking a response frame to its request.
///
/// Conventionally a UUID, but never parsed or validated. It is only rendered
/// as one for logging.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId([u8; CORRELATION_ID_SIZE]);

impl CorrelationId {
    pub const fn from_bytes(bytes: [u8; CORRELATION_ID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CORRELATION_ID_SIZE] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; CORRELATION_ID_SIZE] {
        self.0
    }
}

impl From<[u8; CORRELATION_ID_SIZE]> for CorrelationId {
    fn from(bytes: [u8; CORRELATION_ID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CorrelationId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&uuid::Uuid::from_bytes(self.0).hyphenated(), f)
    }
}

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({self})")
    }
}

/// One request or response on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Echoed unchanged from request to response.
    pub correlation_id: CorrelationId,
    /// Codec-encoded payload, possibly empty.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(correlation_id: impl Into<CorrelationId>, payload: impl Into<Bytes>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            payload: payload.into(),
        }
    }

    /// Value carried in the length prefix: correlation id + payload.
    pub fn total_size(&self) -> usize {
        CORRELATION_ID_SIZE + self.payload.len()
    }

    /// The total wire size of this frame (length prefix included).
    pub fn wire_size(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.total_size()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────┬─────────────────────┬──────────────────────────┐
/// │ Total size (4B)  │ Correlation id      │ Payload                  │
/// │ u32 big-endian   │ (16B, opaque)       │ (total size - 16 bytes)  │
/// └──────────────────┴─────────────────────┴──────────────────────────┘
/// ```
pub fn encode_frame(
    correlation_id: &CorrelationId,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(payload.len().saturating_add(HEADER_SIZE));
    dst.put_u32((CORRELATION_ID_SIZE + payload.len()) as u32);
    dst.put_slice(correlation_id.as_bytes());
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < LENGTH_PREFIX_SIZE {
        return Ok(None);
    }

    let total_size = (&src[..LENGTH_PREFIX_SIZE]).get_u32();
    let payload_len = payload_len(total_size, max_payload)?;

    // The sum overflows only on 32-bit targets, where no buffer can hold it.
    match HEADER_SIZE.checked_add(payload_len) {
        Some(frame_len) if src.len() >= frame_len => {}
        _ => return Ok(None),
    }

    src.advance(LENGTH_PREFIX_SIZE);
    let mut id = [0u8; CORRELATION_ID_SIZE];
    src.copy_to_slice(&mut id);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame {
        correlation_id: CorrelationId(id),
        payload,
    }))
}

/// Validate a length prefix and return the payload length it announces.
pub(crate) fn payload_len(total_size: u32, max_payload: usize) -> Result<usize> {
    let payload_len = (total_size as usize)
        .checked_sub(CORRELATION_ID_SIZE)
        .ok_or(FrameError::InvalidLength { total_size })?;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }
    Ok(payload_len)
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: [`MAX_PAYLOAD`], i.e. only the
    /// wire format itself bounds it.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }
}
