// src/executor/builtin/core.rs
use super::{expect_args, BuiltinResult};
use crate::error::BuiltinError;
use crate::shell::{Flow, Shell};

pub fn builtin_cd(shell: &mut Shell, args: &[String]) -> BuiltinResult {
    let [dir] = expect_args(args, "cd", "cd <dir>")?;

    std::env::set_current_dir(dir).map_err(|source| BuiltinError::Os {
        name: "cd",
        subject: dir.clone(),
        source,
    })?;
    shell.refresh_cwd();
    Ok(Flow::Continue)
}
