// src/error.rs
//
// Error types for each failure domain. The `Display` strings are exactly
// what the user sees on standard error.

use std::fmt;
use std::io;

use nix::errno::Errno;
use nix::unistd::Pid;
use thiserror::Error;

/// Which side of a command a redirection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input  => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("sh: Multiple {0} redirects")]
    MultipleRedirects(Direction),
    #[error("sh: No redirection file specified")]
    MissingRedirectTarget,
    #[error("sh: No command specified")]
    MissingCommand,
}

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("{name}: Usage: {usage}")]
    Usage { name: &'static str, usage: &'static str },
    #[error("{0}: Job ID not found")]
    NoSuchJob(&'static str),
    #[error("{0}: Process ID not found")]
    NoSuchProcess(&'static str),
    #[error("{name}: {subject}: {}", describe(.source))]
    Os {
        name: &'static str,
        subject: String,
        source: io::Error,
    },
    #[error("{name}: {}", describe(.source))]
    OsBare {
        name: &'static str,
        source: io::Error,
    },
    #[error("{name}: {source}")]
    Signal { name: &'static str, source: Errno },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("sh: {0}: Command not found")]
    CommandNotFound(String),
    #[error("sh: {0}: argument contains a NUL byte")]
    NulInArgument(String),
    #[error("sh: fork: {0}")]
    Fork(Errno),
    #[error(transparent)]
    Register(#[from] JobTableError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobTableError {
    #[error("sh: process {0} is already tracked")]
    DuplicatePid(Pid),
    #[error("sh: job id {0} is already in use")]
    DuplicateJobId(usize),
}

/// OS error text without Rust's ` (os error N)` suffix, the way `perror`
/// prints it.
pub fn describe(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_string(),
        None => err.to_string(),
    }
}
