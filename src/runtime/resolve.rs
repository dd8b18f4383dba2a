// SPDX-License-Identifier: MIT

//! Find the executable named by a command, and split raw command lines.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Maps a program name to the executables it could refer to.
pub trait Resolver {
    /// Every absolute, executable path that `name` matches.  May be empty.
    fn resolve(&self, name: &str) -> Vec<PathBuf>;
}

/// Resolves program names with the `which` search rules.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    search: Option<OsString>,
}

impl PathResolver {
    /// Match the name against every directory in the `:` separated list,
    /// returning all of the hits rather than only the first.
    pub fn search_all<S: Into<OsString>>(paths: S) -> Self {
        PathResolver {
            search: Some(paths.into()),
        }
    }
}

impl Resolver for PathResolver {
    fn resolve(&self, name: &str) -> Vec<PathBuf> {
        let cwd = match std::env::current_dir() {
            Ok(d) => d,
            Err(_) => PathBuf::from("/"),
        };
        let found: Vec<PathBuf> = match &self.search {
            // The first hit on $PATH, as a shell would pick it.
            None => which::which(name).into_iter().collect(),
            Some(paths) => match which::which_in_all(name, Some(paths), &cwd) {
                Ok(all) => all.collect(),
                Err(_) => Vec::new(),
            },
        };
        found.into_iter().map(|p| make_absolute(&cwd, p)).collect()
    }
}

fn make_absolute(cwd: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        p
    } else {
        match std::path::absolute(&p) {
            Ok(abs) => abs,
            Err(_) => cwd.join(p),
        }
    }
}

/// Split the command line on `sep`, dropping empty tokens.
///
/// There is no quoting or escaping; an argument can never contain `sep`.
pub fn split_command(line: &str, sep: char) -> Vec<String> {
    line.split(sep)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
