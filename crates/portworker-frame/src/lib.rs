//! Length-prefixed request/response framing.
//!
//! Every frame on the wire is:
//! - A 4-byte big-endian length counting everything after it
//! - A 16-byte correlation id, echoed unchanged in the response
//! - The payload bytes
//!
//! Readers never consume bytes past the frame they return, so a worker can
//! answer one request before the next one is touched.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, CorrelationId, Frame, FrameConfig, CORRELATION_ID_SIZE,
    HEADER_SIZE, LENGTH_PREFIX_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
