//! Channel binding for out-of-process workers.
//!
//! The host establishes two descriptors before spawning the worker: one the
//! worker reads requests from, one it writes responses to. By convention these
//! are fds 3 and 4, which keeps stdin/stdout/stderr free for diagnostics.
//!
//! This is the lowest layer of portworker. Everything else builds on the
//! [`RequestChannel`] and [`ResponseChannel`] handles provided here.

pub mod config;
pub mod error;
pub mod stream;

#[cfg(unix)]
pub mod binder;

pub use config::{ChannelConfig, DEFAULT_REQUEST_FD, DEFAULT_RESPONSE_FD};
pub use error::{ChannelError, Direction, Result};
pub use stream::{RequestChannel, ResponseChannel};

#[cfg(unix)]
pub use binder::{bind, from_raw_fds, Channels};
