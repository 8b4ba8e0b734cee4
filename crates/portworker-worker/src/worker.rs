use std::io::{Read, Write};

use portworker_frame::{CorrelationId, FrameConfig, FrameReader, FrameWriter};
use tracing::{debug, info};

use crate::error::{Result, WorkerError};
use crate::handler::{Handler, Message};

/// Lifecycle of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Binding channels and initialising the handler context.
    Starting,
    /// Answering requests.
    Running,
    /// The request channel closed; pending output is being flushed.
    Draining,
    /// Finished, cleanly or not. Terminal.
    Terminated,
}

/// Outcome of one [`Worker::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A request was answered.
    Served(CorrelationId),
    /// The host closed the request channel.
    Finished,
}

/// What a worker did before it terminated cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerSummary {
    pub requests: u64,
}

/// Drives one handler over a request stream and a response stream.
///
/// Strictly sequential: a request is decoded, answered and its response
/// flushed before the next length prefix is read.
pub struct Worker<H: Handler, R, W> {
    handler: H,
    context: H::Context,
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    state: WorkerState,
    requests: u64,
}

impl<H: Handler, R: Read, W: Write> Worker<H, R, W> {
    /// Initialise the handler and return a running worker.
    pub fn start(handler: H, reader: R, writer: W, args: &[String]) -> Result<Self> {
        Self::start_with_config(handler, reader, writer, args, FrameConfig::default())
    }

    /// Same as [`Worker::start`] with explicit frame limits.
    pub fn start_with_config(
        handler: H,
        reader: R,
        writer: W,
        args: &[String],
        config: FrameConfig,
    ) -> Result<Self> {
        debug!(state = ?WorkerState::Starting, args = args.len(), "initializing handler context");
        let context = handler.init(args).map_err(WorkerError::Init)?;

        info!("worker running");
        Ok(Self {
            handler,
            context,
            reader: FrameReader::with_config(reader, config.clone()),
            writer: FrameWriter::with_config(writer, config),
            state: WorkerState::Running,
            requests: 0,
        })
    }

    /// Answer at most one request.
    ///
    /// Any error terminates the worker; no response is written for the
    /// request that caused it.
    pub fn step(&mut self) -> Result<Step> {
        if self.state != WorkerState::Running {
            return Err(WorkerError::NotRunning(self.state));
        }

        match self.serve_one() {
            Ok(step) => Ok(step),
            Err(err) => {
                self.state = WorkerState::Terminated;
                Err(err)
            }
        }
    }

    /// Answer requests until the host closes the request channel.
    pub fn run(&mut self) -> Result<WorkerSummary> {
        loop {
            if let Step::Finished = self.step()? {
                return Ok(self.summary());
            }
        }
    }

    fn serve_one(&mut self) -> Result<Step> {
        let Some(frame) = self.reader.read_frame()? else {
            self.state = WorkerState::Draining;
            self.writer.flush()?;
            self.state = WorkerState::Terminated;
            info!(requests = self.requests, "request channel closed");
            return Ok(Step::Finished);
        };

        let correlation_id = frame.correlation_id;
        let data = portworker_payload::decode(&frame.payload).map_err(|source| {
            WorkerError::Decode {
                correlation_id,
                source,
            }
        })?;
        let message = Message {
            id: correlation_id,
            data,
        };

        let result = self
            .handler
            .predict(&message, &self.context)
            .map_err(|fault| WorkerError::Handler {
                correlation_id,
                fault,
            })?;

        let payload = portworker_payload::encode(&result).map_err(|source| {
            WorkerError::Encode {
                correlation_id,
                source,
            }
        })?;
        self.writer.write_frame(&correlation_id, &payload)?;
        self.requests += 1;

        debug!(
            %correlation_id,
            request_bytes = frame.payload.len(),
            response_bytes = payload.len(),
            "request served"
        );
        Ok(Step::Served(correlation_id))
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// The context built by [`Handler::init`].
    pub fn context(&self) -> &H::Context {
        &self.context
    }

    pub fn summary(&self) -> WorkerSummary {
        WorkerSummary {
            requests: self.requests,
        }
    }

    /// Consume the worker and return the request and response streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }
}

#[cfg(unix)]
mod bound {
    use portworker_channel::{ChannelConfig, Channels, RequestChannel, ResponseChannel};
    use portworker_frame::FrameConfig;

    use super::Worker;
    use crate::error::Result;
    use crate::handler::Handler;

    impl<H: Handler> Worker<H, RequestChannel, ResponseChannel> {
        /// Bind the host-provided channels, then initialise the handler.
        pub fn bind(
            handler: H,
            channels: ChannelConfig,
            frames: FrameConfig,
            args: &[String],
        ) -> Result<Self> {
            let Channels { request, response } = portworker_channel::bind(channels)?;
            Self::start_with_config(handler, request, response, args, frames)
        }
    }
}
