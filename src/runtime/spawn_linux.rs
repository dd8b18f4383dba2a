// SPDX-License-Identifier: MIT

//! Launches the gated child on Linux with `clone(2)`, and supervises it
//! with `waitpid(2)` and `kill(2)`.

mod gate;
mod launch;
mod supervise;

pub(crate) use launch::launch_child;
pub use supervise::LinuxChild;
