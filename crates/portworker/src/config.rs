//! Worker settings.
//!
//! Every process argument belongs to the handler, so settings come from
//! `PORTWORKER_*` environment variables only: the parser is never shown the
//! real argv beyond the program name.

use std::ffi::OsString;

use clap::Parser;
use portworker_channel::{ChannelConfig, DEFAULT_REQUEST_FD, DEFAULT_RESPONSE_FD};
use portworker_frame::{FrameConfig, MAX_PAYLOAD};

use crate::logging::{LogFormat, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "portworker",
    about = "Prediction worker speaking length-prefixed frames on fds 3/4",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct WorkerConfig {
    /// Descriptor requests are read from.
    #[arg(long, env = "PORTWORKER_REQUEST_FD", default_value_t = DEFAULT_REQUEST_FD, hide = true)]
    pub request_fd: i32,

    /// Descriptor responses are written to.
    #[arg(long, env = "PORTWORKER_RESPONSE_FD", default_value_t = DEFAULT_RESPONSE_FD, hide = true)]
    pub response_fd: i32,

    /// Largest accepted payload, in bytes.
    #[arg(
        long,
        env = "PORTWORKER_MAX_PAYLOAD",
        default_value_t = MAX_PAYLOAD,
        value_parser = parse_max_payload,
        hide = true
    )]
    pub max_payload: usize,

    /// Log output format (stderr).
    #[arg(
        long,
        env = "PORTWORKER_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Text,
        hide = true
    )]
    pub log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        env = "PORTWORKER_LOG_LEVEL",
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Warn,
        hide = true
    )]
    pub log_level: LogLevel,
}

impl WorkerConfig {
    /// Read settings from the environment of this process.
    pub fn from_env() -> Result<Self, clap::Error> {
        let program = std::env::args_os()
            .next()
            .unwrap_or_else(|| OsString::from("portworker"));
        Self::try_parse_from([program])
    }

    pub fn channels(&self) -> ChannelConfig {
        ChannelConfig {
            request_fd: self.request_fd,
            response_fd: self.response_fd,
        }
    }

    pub fn frames(&self) -> FrameConfig {
        FrameConfig {
            max_payload_size: self.max_payload,
        }
    }
}

fn parse_max_payload(value: &str) -> Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|err| format!("not a byte count: {err}"))?;
    if size > MAX_PAYLOAD {
        return Err(format!("must not exceed {MAX_PAYLOAD}"));
    }
    Ok(size)
}
