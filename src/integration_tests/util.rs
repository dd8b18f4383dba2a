// SPDX-License-Identifier: MIT

//! Utility helpers for running the tests.

use std::path::PathBuf;

use nix::{errno::Errno, sys::wait::WaitPidFlag, unistd::Pid};

use crate::{PathResolver, Resolver};

/// Route library logs into the test output.  Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Number of descriptors this process currently holds open.
pub fn open_fd_count() -> usize {
    std::fs::read_dir("/proc/self/fd")
        .expect("could not list /proc/self/fd")
        .count()
}

/// Find a system program, failing the test with a useful message if it is missing.
pub fn find_exec(name: &str) -> PathBuf {
    let found = PathResolver::default().resolve(name);
    assert_eq!(found.len(), 1, "expected {name} on $PATH, found {found:?}");
    found.into_iter().next().expect("checked above")
}

/// True when nothing is left to reap for `pid`: neither a live process nor a zombie.
pub fn fully_reaped(pid: Pid) -> bool {
    match nix::sys::wait::waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Err(Errno::ECHILD) => true,
        Err(e) => panic!("unexpected waitpid error for {pid}: {e}"),
        Ok(status) => {
            println!("pid {pid} still present: {status:?}");
            false
        }
    }
}

/// Resolver that hands back a fixed answer for any name.
pub struct Fixed(pub Vec<PathBuf>);

impl Resolver for Fixed {
    fn resolve(&self, _name: &str) -> Vec<PathBuf> {
        self.0.clone()
    }
}
