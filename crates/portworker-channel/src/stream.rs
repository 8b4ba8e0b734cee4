use std::fs::File;
use std::io::{Read, Write};

/// The readable end the host sends request frames on.
pub struct RequestChannel {
    inner: File,
}

/// The writable end the worker sends response frames on.
pub struct ResponseChannel {
    inner: File,
}

impl RequestChannel {
    pub(crate) fn from_file(inner: File) -> Self {
        Self { inner }
    }

    /// Raw descriptor number, for diagnostics.
    #[cfg(unix)]
    pub fn fd(&self) -> i32 {
        use std::os::fd::AsRawFd;
        self.inner.as_raw_fd()
    }
}

impl ResponseChannel {
    pub(crate) fn from_file(inner: File) -> Self {
        Self { inner }
    }

    /// Raw descriptor number, for diagnostics.
    #[cfg(unix)]
    pub fn fd(&self) -> i32 {
        use std::os::fd::AsRawFd;
        self.inner.as_raw_fd()
    }
}

impl Read for RequestChannel {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ResponseChannel {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for RequestChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("RequestChannel");
        #[cfg(unix)]
        s.field("fd", &self.fd());
        s.finish()
    }
}

impl std::fmt::Debug for ResponseChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ResponseChannel");
        #[cfg(unix)]
        s.field("fd", &self.fd());
        s.finish()
    }
}
