use std::fmt;

use portworker_channel::ChannelError;
use portworker_frame::FrameError;
use portworker_worker::WorkerError;

// Exit codes the host can tell apart without parsing stderr.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn channel_error(err: &ChannelError) -> i32 {
    match err {
        ChannelError::Io(_) => INTERNAL,
        _ => TRANSPORT_ERROR,
    }
}

pub fn frame_error(err: &FrameError) -> i32 {
    match err {
        FrameError::Io(_) | FrameError::ConnectionClosed => TRANSPORT_ERROR,
        FrameError::InvalidLength { .. }
        | FrameError::PayloadTooLarge { .. }
        | FrameError::Truncated { .. } => DATA_INVALID,
    }
}

pub fn worker_error(err: WorkerError) -> CliError {
    let code = match &err {
        WorkerError::Channel(err) => channel_error(err),
        WorkerError::Frame(err) => frame_error(err),
        WorkerError::Decode { .. } | WorkerError::Encode { .. } => DATA_INVALID,
        WorkerError::Init(_) | WorkerError::Handler { .. } => FAILURE,
        WorkerError::NotRunning(_) => INTERNAL,
    };
    CliError::new(code, err.to_string())
}
