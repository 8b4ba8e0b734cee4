//! Out-of-process prediction worker.
//!
//! The host spawns this process with a request pipe on fd 3 and a response
//! pipe on fd 4, writes length-prefixed MessagePack requests and reads back
//! one response per request, matched by correlation id.
//!
//! # Crate Structure
//!
//! - [`channel`] — Binding the host-provided descriptors
//! - [`frame`] — Length-prefixed framing with correlation ids
//! - [`payload`] — Payload values and their MessagePack codec
//! - [`worker`] — Handler contract and the request loop
//! - [`predictor`] — The bundled forecast handler run by the `portworker` binary

pub mod predictor;

/// Re-export channel types.
pub mod channel {
    pub use portworker_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use portworker_frame::*;
}

/// Re-export payload types.
pub mod payload {
    pub use portworker_payload::*;
}

/// Re-export worker types.
pub mod worker {
    pub use portworker_worker::*;
}

pub use predictor::ForecastPredictor;
