//! Payload values carried inside frames.
//!
//! Request and response payloads are MessagePack documents. They decode into
//! [`Value`], a closed set of shapes (maps, arrays, strings, binaries,
//! numbers, booleans, nil) that handlers inspect and build. The framing layer
//! never looks inside a payload.

pub mod codec;
pub mod error;
pub mod value;

pub use codec::{decode, encode};
pub use error::{PayloadError, Result};
pub use value::{Map, Value};
