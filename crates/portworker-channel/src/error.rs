use std::fmt;

/// Which side of the protocol a descriptor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host → worker requests. Must be readable.
    Request,
    /// Worker → host responses. Must be writable.
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.write_str("request"),
            Direction::Response => f.write_str("response"),
        }
    }
}

/// Errors that can occur while binding the worker channels.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The descriptor is one of the console streams (0, 1 or 2).
    #[error("{direction} channel fd {fd} is a console stream")]
    ConsoleStream { direction: Direction, fd: i32 },

    /// The descriptor is not open in this process.
    #[error("{direction} channel fd {fd} is unavailable: {source}")]
    Unavailable {
        direction: Direction,
        fd: i32,
        source: std::io::Error,
    },

    /// The descriptor is open with the wrong access mode.
    #[error("{direction} channel fd {fd} is not open for {}", access(.direction))]
    WrongDirection { direction: Direction, fd: i32 },

    /// The channels were already bound by this process.
    #[error("worker channels are already bound")]
    AlreadyBound,

    /// An I/O error occurred while preparing a descriptor.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn access(direction: &Direction) -> &'static str {
    match direction {
        Direction::Request => "reading",
        Direction::Response => "writing",
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
