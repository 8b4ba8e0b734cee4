/// Descriptor the host writes request frames to.
pub const DEFAULT_REQUEST_FD: i32 = 3;

/// Descriptor the host reads response frames from.
pub const DEFAULT_RESPONSE_FD: i32 = 4;

/// Which inherited descriptors carry the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    pub request_fd: i32,
    pub response_fd: i32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_fd: DEFAULT_REQUEST_FD,
            response_fd: DEFAULT_RESPONSE_FD,
        }
    }
}
