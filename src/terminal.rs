//! Terminal capability detection for client streams
//!
//! Streams opt into terminal detection by implementing [`TerminalProbe`].
//! Anything that does not (pipes wrapped in buffers, in-memory writers) is
//! treated as a non-terminal without a descriptor.

use std::fs::File;
use std::io::{self, IsTerminal};

/// OS-level descriptor or handle value of a stream.
pub type RawDescriptor = usize;

/// Terminal status of a single stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalInfo {
    pub is_terminal: bool,
    /// Present when the stream is backed by an OS descriptor.
    pub descriptor: Option<RawDescriptor>,
}

impl TerminalInfo {
    /// Probe a stream that may be absent
    pub fn probe<T: TerminalProbe + ?Sized>(stream: Option<&T>) -> Self {
        stream.map(TerminalProbe::terminal_info).unwrap_or_default()
    }

    fn of<T>(stream: &T) -> Self
    where
        T: IsTerminal + AsDescriptor,
    {
        Self {
            is_terminal: stream.is_terminal(),
            descriptor: Some(stream.raw_descriptor()),
        }
    }
}

/// Capability of a stream to report whether it is attached to a terminal.
pub trait TerminalProbe {
    fn terminal_info(&self) -> TerminalInfo {
        TerminalInfo::default()
    }
}

trait AsDescriptor {
    fn raw_descriptor(&self) -> RawDescriptor;
}

#[cfg(unix)]
impl<T: std::os::fd::AsRawFd> AsDescriptor for T {
    fn raw_descriptor(&self) -> RawDescriptor {
        // Open descriptors are never negative.
        usize::try_from(self.as_raw_fd()).unwrap_or_default()
    }
}

#[cfg(windows)]
impl<T: std::os::windows::io::AsRawHandle> AsDescriptor for T {
    fn raw_descriptor(&self) -> RawDescriptor {
        self.as_raw_handle() as RawDescriptor
    }
}

impl TerminalProbe for io::Stdin {
    fn terminal_info(&self) -> TerminalInfo {
        TerminalInfo::of(self)
    }
}

impl TerminalProbe for io::Stdout {
    fn terminal_info(&self) -> TerminalInfo {
        TerminalInfo::of(self)
    }
}

impl TerminalProbe for io::Stderr {
    fn terminal_info(&self) -> TerminalInfo {
        TerminalInfo::of(self)
    }
}

impl TerminalProbe for File {
    fn terminal_info(&self) -> TerminalInfo {
        TerminalInfo::of(self)
    }
}

impl TerminalProbe for io::Empty {}
impl TerminalProbe for io::Sink {}
impl TerminalProbe for Vec<u8> {}
impl<T> TerminalProbe for io::Cursor<T> {}
