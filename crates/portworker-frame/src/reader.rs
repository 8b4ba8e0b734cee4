use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::codec::{
    payload_len, CorrelationId, Frame, FrameConfig, CORRELATION_ID_SIZE, LENGTH_PREFIX_SIZE,
};
use crate::error::{FrameError, Result};

/// Upper bound on the up-front payload allocation; larger payloads grow as
/// bytes actually arrive.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally and never reads past the end of the frame
/// it returns.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Ok(None)` at end of stream, including when fewer than four
    /// length-prefix bytes arrive before EOF. EOF anywhere after a complete
    /// length prefix is [`FrameError::Truncated`].
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let received = read_full(&mut self.inner, &mut prefix)?;
        if received < LENGTH_PREFIX_SIZE {
            if received > 0 {
                debug!(received, "partial length prefix before end of stream");
            }
            return Ok(None);
        }

        let total_size = u32::from_be_bytes(prefix);
        let payload_len = payload_len(total_size, self.config.max_payload_size)?;
        let expected = total_size as usize;

        let mut id = [0u8; CORRELATION_ID_SIZE];
        let received = read_full(&mut self.inner, &mut id)?;
        if received < CORRELATION_ID_SIZE {
            return Err(FrameError::Truncated { expected, received });
        }

        let mut payload = Vec::with_capacity(payload_len.min(INITIAL_PAYLOAD_CAPACITY));
        let received = (&mut self.inner)
            .take(payload_len as u64)
            .read_to_end(&mut payload)?;
        if received < payload_len {
            return Err(FrameError::Truncated {
                expected,
                received: CORRELATION_ID_SIZE + received,
            });
        }

        let frame = Frame {
            correlation_id: CorrelationId::from_bytes(id),
            payload: Bytes::from(payload),
        };
        trace!(correlation_id = %frame.correlation_id, total_size, "read frame");
        Ok(Some(frame))
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Fill `buf` until it is full or the stream ends; returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(filled)
}
