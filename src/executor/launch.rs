// src/executor/launch.rs
//
// Fork/exec of external commands, each in its own process group.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use nix::sys::signal::Signal;
use nix::unistd::{self, ForkResult, Pid};

use super::{terminal, wait_foreground};
use crate::error::{describe, LaunchError};
use crate::jobs::JobState;
use crate::parser::ast::{CommandLine, OutputMode, Redirects};
use crate::shell::Shell;
use crate::signals::BlockedSignals;

/// Mode for files created by `>` and `>>`, before the umask.
const CREATE_MODE: u32 = 0o666;

/// Run an external command. Foreground commands return once the job has
/// exited, been killed, or stopped; background commands return right
/// after registration.
pub fn launch(shell: &mut Shell, cmd: &CommandLine) -> Result<(), LaunchError> {
    let argv = build_argv(cmd)?;

    // Check before forking so a missing program never clobbers a `>` target.
    if let Err(e) = std::fs::metadata(&cmd.name) {
        if e.kind() == ErrorKind::NotFound {
            return Err(LaunchError::CommandNotFound(cmd.name.clone()));
        }
    }

    // Output buffered now would otherwise be written twice, once by the child.
    io::stdout().flush().ok();
    io::stderr().flush().ok();

    let blocked = BlockedSignals::block(&[Signal::SIGCHLD]).map_err(LaunchError::Fork)?;

    // SAFETY: the shell is single-threaded, and the child only performs
    // redirection and exec before leaving through `_exit` or the new image.
    let child = match unsafe { unistd::fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Child => {
            let _ = unistd::setpgid(Pid::from_raw(0), Pid::from_raw(0));
            if !cmd.background {
                terminal::hand_to(unistd::getpid());
            }
            let _ = blocked.restore();
            run_child(&argv, &cmd.redirects)
        }
        ForkResult::Parent { child } => child,
    };

    // The child does the same; whichever runs first wins the race.
    let _ = unistd::setpgid(child, child);

    if !cmd.background {
        shell.relay.set_foreground(child);
        terminal::hand_to(child);
    }

    let id = shell.jobs.allocate_id();
    if let Err(e) = shell.jobs.add(id, child, JobState::Running, cmd.name.as_str()) {
        shell.relay.clear_foreground();
        terminal::reclaim();
        return Err(e.into());
    }
    drop(blocked);
    tracing::debug!(job = id, pid = %child, name = %cmd.name, background = cmd.background, "launched");

    if cmd.background {
        if shell.config.announce_background {
            println!("[{id}] ({child})");
        }
    } else {
        wait_foreground(shell, child);
    }
    Ok(())
}

fn build_argv(cmd: &CommandLine) -> Result<Vec<CString>, LaunchError> {
    std::iter::once(&cmd.name)
        .chain(&cmd.args)
        .map(|arg| CString::new(arg.as_str()).map_err(|_| LaunchError::NulInArgument(arg.clone())))
        .collect()
}

/// Child side of the fork. Never returns.
fn run_child(argv: &[CString], redirects: &Redirects) -> ! {
    if let Err((path, e)) = apply_redirects(redirects) {
        eprintln!("sh: {}: {}", path.display(), describe(&e));
        child_exit();
    }

    match unistd::execv(&argv[0], argv) {
        Ok(never) => match never {},
        Err(e) => {
            eprintln!("sh: {}: {}", argv[0].to_string_lossy(), e.desc());
            child_exit()
        }
    }
}

fn child_exit() -> ! {
    // SAFETY: `_exit` skips destructors and atexit handlers that belong to
    // the parent's state.
    unsafe { libc::_exit(1) }
}

fn apply_redirects(redirects: &Redirects) -> Result<(), (&Path, io::Error)> {
    if let Some(path) = &redirects.stdin {
        let file = OpenOptions::new().read(true).open(path).map_err(|e| (path.as_path(), e))?;
        replace_fd(&file, libc::STDIN_FILENO).map_err(|e| (path.as_path(), e))?;
    }
    if let Some((path, mode)) = &redirects.stdout {
        let mut options = OpenOptions::new();
        options.write(true).create(true).mode(CREATE_MODE);
        match mode {
            OutputMode::Truncate => options.truncate(true),
            OutputMode::Append => options.append(true),
        };
        let file = options.open(path).map_err(|e| (path.as_path(), e))?;
        replace_fd(&file, libc::STDOUT_FILENO).map_err(|e| (path.as_path(), e))?;
    }
    Ok(())
}

/// Duplicate `file` onto `target`; the original descriptor closes when
/// `file` is dropped.
fn replace_fd(file: &File, target: libc::c_int) -> io::Result<()> {
    // SAFETY: both descriptors are valid for the duration of the call.
    if unsafe { libc::dup2(file.as_raw_fd(), target) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
