// SPDX-License-Identifier: MIT

//! The start gate: a pipe that carries exactly one byte, once, from the
//! launcher to the cloned process.

use std::{
    fs::File,
    io::Write as _,
    os::fd::{AsRawFd, OwnedFd, RawFd},
};

use nix::{fcntl::OFlag, libc, unistd::pipe2};

use crate::runtime::error::ChildError;

const GO: u8 = b'g';

/// The read end, handed to the cloned process.  The launcher drops its copy
/// as soon as the clone returns.
pub(crate) struct GateReader {
    fd: OwnedFd,
}

/// The write end, kept by the launcher until the gate is opened.
pub(crate) struct GateWriter {
    stream: File,
}

/// Create both ends of the gate.  Both are close-on-exec, so neither end
/// leaks into the program the child runs, nor into any other child.
pub(crate) fn start_gate() -> Result<(GateReader, GateWriter), ChildError> {
    let (read_fd, write_fd) =
        pipe2(OFlag::O_CLOEXEC).map_err(|e| ChildError::os("failed to create the start gate", e))?;
    Ok((
        GateReader { fd: read_fd },
        GateWriter {
            stream: File::from(write_fd),
        },
    ))
}

impl GateReader {
    pub(crate) fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl GateWriter {
    /// Send the go byte.  Consuming the writer closes the pipe afterwards.
    pub(crate) fn open(mut self) -> Result<(), std::io::Error> {
        let written = self.stream.write(&[GO])?;
        if written != 1 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "start gate accepted no data",
            ));
        }
        Ok(())
    }
}

/// Block until the gate delivers its byte, then close the read end.
///
/// Runs inside the cloned process: raw libc calls only, no allocation.
/// Returns false when the read did not produce exactly one byte.
pub(crate) fn wait_for_go(fd: RawFd) -> bool {
    let mut buf = [0u8; 1];
    let ret = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), 1) };
    if ret != 1 {
        return false;
    }
    let _ = unsafe { libc::close(fd) };
    true
}
