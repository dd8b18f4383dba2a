// SPDX-License-Identifier: MIT

//! Turn a raw command line into a command that is safe to hand to the launcher.

use std::{ffi::CString, os::unix::ffi::OsStrExt as _, path::PathBuf};

use crate::runtime::{
    error::ValidationError,
    resolve::{Resolver, split_command},
};

/// Size of the argument vector handed to `execve`, including its null terminator.
pub const MAX_ARGS: usize = 256;

/// A validated command.  Element 0 is the unique, absolute executable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    exec: PathBuf,
    args: Vec<CString>,
}

impl Command {
    /// The resolved executable.
    pub fn exec_path(&self) -> &PathBuf {
        &self.exec
    }

    /// The full argument vector, starting with the executable path.
    pub fn args(&self) -> &[CString] {
        &self.args
    }
}

/// Split the command line on spaces, resolve the program, and check the argument limit.
///
/// Nothing is created on the system by this call.
pub fn validate_command<R: Resolver + ?Sized>(
    line: &str,
    resolver: &R,
) -> Result<Command, ValidationError> {
    let mut tokens = split_command(line, ' ');
    if tokens.is_empty() {
        return Err(ValidationError::Empty);
    }

    let mut paths = resolver.resolve(&tokens[0]);
    let exec = match paths.len() {
        0 => return Err(ValidationError::NotFound(tokens.swap_remove(0))),
        1 => paths.remove(0),
        count => {
            return Err(ValidationError::Ambiguous {
                path: tokens.swap_remove(0),
                count,
            });
        }
    };

    // One slot of the vector is reserved for the terminating null.
    if tokens.len() >= MAX_ARGS - 1 {
        return Err(ValidationError::TooManyArguments {
            count: tokens.len(),
            max: MAX_ARGS - 1,
        });
    }

    let mut args = Vec::with_capacity(tokens.len());
    args.push(CString::new(exec.as_os_str().as_bytes())?);
    for arg in &tokens[1..] {
        args.push(CString::new(arg.as_bytes())?);
    }
    Ok(Command { exec, args })
}
