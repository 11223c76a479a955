// src/parser/ast.rs

use std::path::PathBuf;

/// One parsed input line: a simple command with its redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
    pub redirects: Redirects,
    pub background: bool,
}

/// How an output redirection opens its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Truncate,
    Append,
}

/// At most one redirection per direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirects {
    pub stdin: Option<PathBuf>,
    pub stdout: Option<(PathBuf, OutputMode)>,
}

impl Redirects {
    pub fn is_empty(&self) -> bool {
        self.stdin.is_none() && self.stdout.is_none()
    }
}
