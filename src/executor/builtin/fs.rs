// src/executor/builtin/fs.rs
use std::io::ErrorKind;

use super::{expect_args, BuiltinResult};
use crate::error::BuiltinError;
use crate::shell::Flow;

/// `ln <src> <dest>`: hard link.
pub fn builtin_ln(args: &[String]) -> BuiltinResult {
    let [src, dest] = expect_args(args, "ln", "ln <src> <dest>")?;

    match std::fs::hard_link(src, dest) {
        Ok(()) => Ok(Flow::Continue),
        Err(source) if source.kind() == ErrorKind::NotFound => Err(BuiltinError::Os {
            name: "ln",
            subject: src.clone(),
            source,
        }),
        Err(source) if source.kind() == ErrorKind::AlreadyExists => Err(BuiltinError::Os {
            name: "ln",
            subject: dest.clone(),
            source,
        }),
        Err(source) => Err(BuiltinError::OsBare { name: "ln", source }),
    }
}

/// `rm <file>`: unlink one entry. Directories are refused by the OS.
pub fn builtin_rm(args: &[String]) -> BuiltinResult {
    let [file] = expect_args(args, "rm", "rm <file>")?;

    std::fs::remove_file(file).map_err(|source| BuiltinError::Os {
        name: "rm",
        subject: file.clone(),
        source,
    })?;
    Ok(Flow::Continue)
}
