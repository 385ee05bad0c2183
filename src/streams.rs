//! Input and output streams owned by the client context
//!
//! Output streams are shared behind [`OutputHandle`] so the error stream can
//! fall back to the output stream without two owners fighting over one writer.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::terminal::{TerminalInfo, TerminalProbe};

/// Readable stream the client may attach to the daemon.
pub trait InputStream: Read + TerminalProbe + Send {}

impl<T: Read + TerminalProbe + Send> InputStream for T {}

/// Writable stream the client renders output to.
pub trait OutputStream: Write + TerminalProbe + Send {}

impl<T: Write + TerminalProbe + Send> OutputStream for T {}

/// Cloneable handle to a shared output stream.
#[derive(Clone)]
pub struct OutputHandle {
    inner: Arc<Mutex<Box<dyn OutputStream>>>,
}

impl OutputHandle {
    pub fn new(stream: impl OutputStream + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(stream))),
        }
    }

    pub fn terminal_info(&self) -> TerminalInfo {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .terminal_info()
    }

    /// Whether both handles write to the same underlying stream
    pub fn same_stream(&self, other: &OutputHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Write for OutputHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl std::fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandle").finish_non_exhaustive()
    }
}

/// In-memory stream whose contents stay readable after being handed to the
/// client. Never reports a terminal.
#[derive(Clone, Default)]
pub struct BufferStream {
    data: Arc<Mutex<Vec<u8>>>,
    read_pos: usize,
}

impl BufferStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::new(Mutex::new(input.into())),
            read_pos: 0,
        }
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&data).into_owned()
    }
}

impl Write for BufferStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for BufferStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let remaining = data.get(self.read_pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl TerminalProbe for BufferStream {}
