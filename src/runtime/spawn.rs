// SPDX-License-Identifier: MIT

//! General model for launching gated child processes and tracking their state.

use std::{ffi::CString, os::unix::ffi::OsStrExt as _};

use nix::{sys::signal::Signal, unistd::Pid};

use crate::runtime::error::ChildError;

/// Default size of the stack the cloned process starts on.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024;

/// Control over a launched child process.
pub trait Child {
    /// The OS process identifier.
    fn pid(&self) -> Pid;

    /// The last known state.  Does not poll the process.
    fn state(&self) -> ChildState;

    /// Open the start gate, letting the child replace itself with the requested program.
    ///
    /// Only valid once, while the child is [`ChildState::Forked`].
    fn release(&mut self) -> Result<(), ChildError>;

    /// Poll the process (without blocking) unless it is already known dead.
    fn is_alive(&mut self) -> bool;

    /// Collect the exit status if there is one.  With `block`, wait until the process exits.
    fn reap(&mut self, block: bool) -> ChildState;

    /// Send SIGTERM, or SIGKILL when `force` is set.
    ///
    /// With `force`, this returns only after the process has been reaped.
    fn terminate(&mut self, force: bool) -> Result<(), ChildError>;

    /// How the process ended, if that is known.
    fn termination(&self) -> Option<Termination>;

    /// The exit code, once the process has exited normally.
    fn exit_code(&self) -> Option<i32> {
        match self.termination() {
            Some(Termination::Exited(code)) => Some(code),
            _ => None,
        }
    }

    /// The signal that ended the process, once it has been killed by one.
    fn term_signal(&self) -> Option<Signal> {
        match self.termination() {
            Some(Termination::Signaled(sig)) => Some(sig),
            _ => None,
        }
    }

    /// The launcher-side failure the exit code stands for, if it is a reserved one.
    ///
    /// A program that happens to exit with a reserved code is indistinguishable
    /// from a launch failure.
    fn child_failure(&self) -> Option<ChildFailure> {
        self.exit_code().and_then(ChildFailure::from_exit_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// Created and waiting on the start gate.
    Forked,
    /// Released through the start gate.
    Running,
    /// Reaped, or assumed dead because its status could not be read.
    Died,
}

/// How a reaped process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(Signal),
}

/// Failures inside the cloned process before its program image is replaced.
/// These can only be reported through the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFailure {
    /// Could not request the parent death signal.
    DeathSignalSetup = 10,
    /// The start gate did not deliver exactly one byte.
    GateRead = 11,
    /// `execve` returned.
    ImageReplacement = 12,
}

impl ChildFailure {
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    pub fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            10 => Some(ChildFailure::DeathSignalSetup),
            11 => Some(ChildFailure::GateRead),
            12 => Some(ChildFailure::ImageReplacement),
            _ => None,
        }
    }
}

/// An immutable snapshot of `KEY=VALUE` environment entries for the new program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<CString>,
}

impl Environment {
    /// Snapshot the current process environment.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build the snapshot from explicit pairs.  Entries containing a nul byte are skipped.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<std::ffi::OsStr>,
        V: AsRef<std::ffi::OsStr>,
    {
        let mut entries = Vec::new();
        for (key, val) in vars {
            let mut entry = key.as_ref().to_os_string();
            entry.push("=");
            entry.push(val.as_ref());
            if let Ok(c) = CString::new(entry.as_os_str().as_bytes()) {
                entries.push(c);
            }
        }
        Environment { vars: entries }
    }

    pub fn vars(&self) -> &[CString] {
        &self.vars
    }
}

/// Describes how to launch the child process.
#[derive(Debug, Clone)]
pub struct LaunchEnv {
    /// Raw command line, split on spaces.
    pub cmd: String,
    /// Environment handed to the new program, verbatim.
    pub environ: Environment,
    /// Bytes of stack the cloned process runs on until it replaces its image.
    pub stack_size: usize,
    /// Signal the child receives if the launching thread dies first.
    pub death_signal: Signal,
}

impl LaunchEnv {
    /// Launch `cmd` with the current environment and default settings.
    pub fn new<S: Into<String>>(cmd: S) -> Self {
        LaunchEnv {
            cmd: cmd.into(),
            environ: Environment::capture(),
            stack_size: DEFAULT_STACK_SIZE,
            death_signal: Signal::SIGTERM,
        }
    }
}
