use std::fs::File;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Direction, Result};
use crate::stream::{RequestChannel, ResponseChannel};

/// Set once a [`bind`] call has adopted the descriptors.
static BOUND: Mutex<bool> = Mutex::new(false);

/// The bound request/response pair.
#[derive(Debug)]
pub struct Channels {
    pub request: RequestChannel,
    pub response: ResponseChannel,
}

/// Adopt the host-provided descriptors described by `config`.
///
/// Succeeds at most once per process; calls after a success return
/// [`ChannelError::AlreadyBound`]. A failed call leaves nothing adopted and
/// reports its own error. Failures are fatal to the worker: the descriptors
/// are a precondition set up by the host, so there is no retry.
pub fn bind(config: ChannelConfig) -> Result<Channels> {
    let mut bound = BOUND.lock().unwrap_or_else(PoisonError::into_inner);
    if *bound {
        return Err(ChannelError::AlreadyBound);
    }

    // SAFETY: inherited protocol descriptors are not owned by anything else in
    // this process, and the held guard prevents adopting them twice.
    let channels = unsafe { from_raw_fds(config) }?;
    *bound = true;
    Ok(channels)
}

/// Adopt two raw descriptors as worker channels without the once-guard.
///
/// Both descriptors are validated (open, not a console stream, correct
/// access mode) before ownership is taken, and marked close-on-exec so that
/// child processes spawned by a handler do not keep the channels alive.
/// When `request_fd == response_fd` the response side is a duplicate of the
/// same bidirectional endpoint.
///
/// # Safety
///
/// The caller must own both descriptors exclusively. On success they are
/// closed when the returned channels are dropped.
pub unsafe fn from_raw_fds(config: ChannelConfig) -> Result<Channels> {
    check_descriptor(config.request_fd, Direction::Request)?;
    check_descriptor(config.response_fd, Direction::Response)?;

    // SAFETY: validated as open above; exclusivity is the caller's contract.
    let request = unsafe { OwnedFd::from_raw_fd(config.request_fd) };
    let response = if config.response_fd == config.request_fd {
        request.try_clone()?
    } else {
        // SAFETY: same as above.
        unsafe { OwnedFd::from_raw_fd(config.response_fd) }
    };

    set_cloexec(&request)?;
    set_cloexec(&response)?;

    info!(
        request_fd = config.request_fd,
        response_fd = config.response_fd,
        "worker channels bound"
    );

    Ok(Channels {
        request: RequestChannel::from_file(File::from(request)),
        response: ResponseChannel::from_file(File::from(response)),
    })
}

fn check_descriptor(fd: RawFd, direction: Direction) -> Result<()> {
    if (0..=2).contains(&fd) {
        return Err(ChannelError::ConsoleStream { direction, fd });
    }

    // SAFETY: F_GETFL only reads the status flags of the descriptor table entry.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(ChannelError::Unavailable {
            direction,
            fd,
            source: std::io::Error::last_os_error(),
        });
    }

    let mode = flags & libc::O_ACCMODE;
    let usable = match direction {
        Direction::Request => mode == libc::O_RDONLY || mode == libc::O_RDWR,
        Direction::Response => mode == libc::O_WRONLY || mode == libc::O_RDWR,
    };
    if !usable {
        return Err(ChannelError::WrongDirection { direction, fd });
    }

    debug!(fd, %direction, "validated channel descriptor");
    Ok(())
}

fn set_cloexec(fd: &OwnedFd) -> Result<()> {
    let raw = fd.as_raw_fd();
    // SAFETY: `raw` belongs to `fd`, which is open for the duration of both calls.
    let flags = unsafe { libc::fcntl(raw, libc::F_GETFD) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    // SAFETY: as above.
    if unsafe { libc::fcntl(raw, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}
