// SPDX-License-Identifier: MIT

//! Manages the launch and the lifetime of a gated child process.
//!
//! A raw command line is first validated into a [`validate::Command`] using a
//! [`resolve::Resolver`].  The `launch_child` function then clones a new
//! process that blocks on a one-byte start gate.  The returned child handle
//! releases the gate, watches the process state, and terminates the process
//! when the handle is dropped.

pub mod error;
pub mod resolve;
pub mod validate;

#[cfg(target_os = "linux")]
pub mod spawn;

#[cfg(target_os = "linux")]
mod spawn_linux;

#[cfg(target_os = "linux")]
pub use spawn_linux::LinuxChild;

/// Validate the launch request and start the child process behind its gate.
///
/// On success, the child is in the [`spawn::ChildState::Forked`] state and
/// will not run the requested program until [`spawn::Child::release`] is called.
#[cfg(target_os = "linux")]
pub fn launch_child<R: resolve::Resolver>(
    env: spawn::LaunchEnv,
    resolver: &R,
) -> Result<LinuxChild, error::ChildError> {
    let cmd = validate::validate_command(&env.cmd, resolver)?;
    spawn_linux::launch_child(cmd, env)
}
