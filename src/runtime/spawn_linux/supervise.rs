// SPDX-License-Identifier: MIT

//! Track the state of a launched child: release, reaping, and termination.

use nix::{
    errno::Errno,
    sys::{
        signal::{Signal, kill},
        wait::{WaitPidFlag, WaitStatus, waitpid},
    },
    unistd::Pid,
};
use tracing::{debug, warn};

use crate::runtime::{
    error::ChildError,
    resolve::PathResolver,
    spawn::{Child, ChildState, LaunchEnv, Termination},
    spawn_linux::gate::GateWriter,
};

/// The handle to a launched Linux child process.
///
/// Dropping the handle kills and reaps the process if it is still alive.
/// The handle is not shared across threads; every state change happens
/// through `&mut self`.
pub struct LinuxChild {
    pid: Pid,
    gate: Option<GateWriter>,
    state: ChildState,
    termination: Option<Termination>,
}

impl LinuxChild {
    pub(crate) fn new(pid: Pid, gate: GateWriter) -> Self {
        LinuxChild {
            pid,
            gate: Some(gate),
            state: ChildState::Forked,
            termination: None,
        }
    }

    /// Launch `cmd`, found through `$PATH`, with the current environment.
    pub fn spawn(cmd: &str) -> Result<Self, ChildError> {
        crate::runtime::launch_child(LaunchEnv::new(cmd), &PathResolver::default())
    }

    fn died(&self) -> bool {
        self.state == ChildState::Died
    }

    fn mark_died(&mut self, termination: Option<Termination>) {
        self.state = ChildState::Died;
        self.termination = termination;
    }

    fn record(&mut self, status: WaitStatus) {
        match status {
            WaitStatus::Exited(_, code) => {
                debug!(pid = self.pid.as_raw(), code, "child exited");
                self.mark_died(Some(Termination::Exited(code)));
            }
            WaitStatus::Signaled(_, sig, _) => {
                debug!(pid = self.pid.as_raw(), signal = %sig, "child killed by signal");
                self.mark_died(Some(Termination::Signaled(sig)));
            }
            // Still running, or a stop / continue notice.
            _ => {}
        }
    }
}

impl Child for LinuxChild {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn state(&self) -> ChildState {
        self.state
    }

    fn release(&mut self) -> Result<(), ChildError> {
        if !self.is_alive() {
            return Err(ChildError::Died);
        }
        if self.state != ChildState::Forked {
            return Err(ChildError::AlreadyReleased);
        }
        let gate = match self.gate.take() {
            Some(g) => g,
            None => return Err(ChildError::AlreadyReleased),
        };

        if let Err(e) = gate.open() {
            if let Err(kill_err) = self.terminate(true) {
                warn!(
                    pid = self.pid.as_raw(),
                    error = %kill_err,
                    "could not kill child after the start gate failed"
                );
            }
            return Err(ChildError::Resource {
                context: "failed to write the start gate",
                source: e,
            });
        }
        self.state = ChildState::Running;
        debug!(pid = self.pid.as_raw(), "child released");
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        if !self.died() {
            self.reap(false);
        }
        !self.died()
    }

    fn reap(&mut self, block: bool) -> ChildState {
        if self.died() {
            return self.state;
        }
        let flags = if block {
            None
        } else {
            Some(WaitPidFlag::WNOHANG)
        };

        let status = loop {
            match waitpid(self.pid, flags) {
                Err(Errno::EINTR) => continue,
                other => break other,
            }
        };

        match status {
            Ok(status) => self.record(status),
            Err(Errno::EINVAL) => panic!("BUG: waitpid({}) returned EINVAL", self.pid),
            Err(Errno::ECHILD) => {
                debug!(pid = self.pid.as_raw(), "child already reaped");
                self.mark_died(None);
            }
            Err(e) => {
                // Assume the child is gone rather than risk blocking on it forever.
                warn!(
                    pid = self.pid.as_raw(),
                    error = %e,
                    "waitpid returned unexpected error, marking the child as dead"
                );
                self.mark_died(None);
            }
        }
        self.state
    }

    fn terminate(&mut self, force: bool) -> Result<(), ChildError> {
        // The child may have exited on its own in the mean time.
        self.reap(false);
        if self.died() {
            return Ok(());
        }

        assert!(
            self.pid.as_raw() > 1,
            "BUG: refusing to signal pid {}",
            self.pid
        );

        let sig = if force {
            Signal::SIGKILL
        } else {
            Signal::SIGTERM
        };
        kill(self.pid, sig).map_err(|e| ChildError::os("failed to signal the child", e))?;
        debug!(pid = self.pid.as_raw(), signal = %sig, "signalled child");

        self.reap(force);
        Ok(())
    }

    fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

impl Drop for LinuxChild {
    fn drop(&mut self) {
        // An unreleased child reading the gate sees EOF and exits on its own.
        self.gate = None;

        if self.is_alive() {
            if let Err(e) = self.terminate(true) {
                warn!(
                    pid = self.pid.as_raw(),
                    error = %e,
                    "failed to kill child while dropping its handle"
                );
            }
        }
    }
}
