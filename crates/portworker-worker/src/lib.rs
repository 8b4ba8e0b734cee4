//! Request handling for framed workers.
//!
//! A [`Handler`] is initialised once into a context, then asked to answer one
//! [`Message`] at a time. The [`Worker`] owns the channels and drives the
//! read → decode → predict → encode → write loop until the host closes the
//! request channel.

pub mod error;
pub mod handler;
pub mod worker;

pub use error::{Result, WorkerError};
pub use handler::{Handler, HandlerFault, Message};
pub use worker::{Step, Worker, WorkerState, WorkerSummary};
