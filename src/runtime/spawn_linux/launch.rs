// SPDX-License-Identifier: MIT

//! Clone the child process and park it on the start gate.

use std::{
    ffi::{CStr, CString},
    os::fd::RawFd,
};

use nix::{
    libc,
    sched::{CloneFlags, clone},
    sys::{prctl, signal::Signal},
};
use tracing::debug;

use crate::runtime::{
    error::ChildError,
    spawn::{ChildFailure, LaunchEnv},
    spawn_linux::{
        gate::{self, start_gate},
        supervise::LinuxChild,
    },
    validate::Command,
};

/// Smallest stack the cloned process is given, whatever was requested.
const MIN_STACK_SIZE: usize = 16 * 1024;

/// The memory the cloned process starts executing on.
///
/// Without `CLONE_VM` the child runs on its own copy of this block, so the
/// launcher only needs it for the duration of the clone call.
struct ExecutionStack {
    mem: Vec<u8>,
}

impl ExecutionStack {
    fn new(size: usize) -> Self {
        ExecutionStack {
            mem: vec![0; size.max(MIN_STACK_SIZE)],
        }
    }
}

/// Everything the cloned process reads before it replaces its image.
///
/// All of it is built before the clone, since the child must not allocate.
/// The pointer vectors borrow from the validated command and the environment
/// snapshot, which outlive the clone call.
struct LaunchArgs<'a> {
    exec: &'a CStr,
    argv: Vec<*const libc::c_char>,
    envp: Vec<*const libc::c_char>,
    gate_fd: RawFd,
    death_signal: Signal,
}

fn null_terminated(strings: &[CString]) -> Vec<*const libc::c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// Handle the child process launching.
pub(crate) fn launch_child(cmd: Command, env: LaunchEnv) -> Result<LinuxChild, ChildError> {
    // Nothing after this point may leak a descriptor: on any error, both gate
    // ends are closed as they drop.
    let (reader, writer) = start_gate()?;
    let args = LaunchArgs {
        exec: cmd.args()[0].as_c_str(),
        argv: null_terminated(cmd.args()),
        envp: null_terminated(env.environ.vars()),
        gate_fd: reader.raw_fd(),
        death_signal: env.death_signal,
    };
    let mut stack = ExecutionStack::new(env.stack_size);

    let pid = unsafe {
        clone(
            Box::new(|| child_entry(&args)),
            &mut stack.mem,
            CloneFlags::empty(),
            Some(Signal::SIGCHLD as libc::c_int),
        )
    };
    // The read end belongs to the child now.
    drop(reader);

    let pid = pid.map_err(|e| ChildError::os("failed to clone the child", e))?;
    debug!(
        pid = pid.as_raw(),
        exec = %cmd.exec_path().display(),
        "child waiting on the start gate"
    );
    Ok(LinuxChild::new(pid, writer))
}

/// The first code to run in the cloned process.
///
/// Any failure here must end the process with a reserved exit code; the value
/// returned becomes the process exit status.  Errors are not logged, since the
/// child shares the launcher's output and must not allocate.
fn child_entry(args: &LaunchArgs) -> isize {
    if prctl::set_pdeathsig(args.death_signal).is_err() {
        return ChildFailure::DeathSignalSetup.exit_code() as isize;
    }

    if !gate::wait_for_go(args.gate_fd) {
        return ChildFailure::GateRead.exit_code() as isize;
    }

    unsafe {
        libc::execve(args.exec.as_ptr(), args.argv.as_ptr(), args.envp.as_ptr());
    }
    // To reach here means the exec failed.
    ChildFailure::ImageReplacement.exit_code() as isize
}
