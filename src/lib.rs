// SPDX-License-Identifier: MIT

//! # gatedspawn
//!
//! Launches a child process that waits behind a start gate until the parent
//! releases it, then supervises the child until it is reaped.

pub mod runtime;

pub use runtime::error::{ChildError, ValidationError};
pub use runtime::resolve::{PathResolver, Resolver, split_command};
pub use runtime::validate::{Command, MAX_ARGS, validate_command};

#[cfg(target_os = "linux")]
pub use runtime::{
    LinuxChild, launch_child,
    spawn::{Child, ChildFailure, ChildState, Environment, LaunchEnv, Termination},
};
