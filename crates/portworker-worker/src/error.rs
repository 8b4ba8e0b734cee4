use portworker_frame::CorrelationId;
use portworker_payload::PayloadError;

use crate::handler::HandlerFault;
use crate::worker::WorkerState;

/// Errors that end a worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Channel binding failed.
    #[error("channel error: {0}")]
    Channel(#[from] portworker_channel::ChannelError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] portworker_frame::FrameError),

    /// The handler could not build its context.
    #[error("handler init failed: {0}")]
    Init(#[source] HandlerFault),

    /// The request payload could not be decoded.
    #[error("request {correlation_id} has a malformed payload: {source}")]
    Decode {
        correlation_id: CorrelationId,
        source: PayloadError,
    },

    /// The handler result could not be encoded.
    #[error("result for request {correlation_id} could not be encoded: {source}")]
    Encode {
        correlation_id: CorrelationId,
        source: PayloadError,
    },

    /// The handler gave up on a request.
    #[error("handler fault on request {correlation_id}: {fault}")]
    Handler {
        correlation_id: CorrelationId,
        #[source]
        fault: HandlerFault,
    },

    /// The worker was stepped after it terminated.
    #[error("worker is not running (state: {0:?})")]
    NotRunning(WorkerState),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
