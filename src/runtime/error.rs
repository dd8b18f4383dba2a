// SPDX-License-Identifier: MIT

//! Common error types.
//!
//! Failures inside the launched process after the clone have no way back to
//! the caller; those surface as reserved exit codes instead (see
//! `spawn::ChildFailure`).

use std::ffi::NulError;

use thiserror::Error;

/// The command line was rejected before any process or descriptor existed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("command line is empty")]
    Empty,

    #[error("path '{0}' does not exist or is not executable")]
    NotFound(String),

    #[error("path '{path}' must refer to a unique binary but matched {count} binaries")]
    Ambiguous { path: String, count: usize },

    #[error("too many arguments for command ({count} > {max})")]
    TooManyArguments { count: usize, max: usize },

    #[error("command contains an interior nul byte")]
    InteriorNul,
}

#[derive(Debug, Error)]
pub enum ChildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The OS refused a resource: the gate pipe, the clone, a signal, or the gate write.
    #[error("{context}: {source}")]
    Resource {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("child died unexpectedly")]
    Died,

    #[error("child was already released")]
    AlreadyReleased,
}

impl ChildError {
    #[cfg(target_os = "linux")]
    pub(crate) fn os(context: &'static str, errno: nix::errno::Errno) -> Self {
        ChildError::Resource {
            context,
            source: errno.into(),
        }
    }
}

impl From<NulError> for ValidationError {
    fn from(_: NulError) -> Self {
        ValidationError::InteriorNul
    }
}

impl From<ChildError> for std::io::Error {
    fn from(e: ChildError) -> Self {
        match e {
            ChildError::Resource { source, .. } => source,
            ChildError::Validation(ValidationError::NotFound(p)) => {
                std::io::Error::new(std::io::ErrorKind::NotFound, p)
            }
            ChildError::Validation(v) => std::io::Error::new(std::io::ErrorKind::InvalidInput, v),
            ChildError::Died => std::io::Error::new(std::io::ErrorKind::BrokenPipe, e),
            ChildError::AlreadyReleased => std::io::Error::other(e),
        }
    }
}
