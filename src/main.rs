// src/main.rs
mod completion;
mod config;
mod error;
mod executor;
mod jobs;
mod parser;
mod readline;
mod shell;
mod signals;

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use parser::ast::CommandLine;
use readline::{LineReader, ReadlineError};
use shell::{Flow, Shell};

const LOG_ENV: &str = "JOBSH_LOG";

/// Where the main loop is between two lines of input.
enum State {
    Prompting,
    Parsing(String),
    Executing(CommandLine),
    Terminating,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr and stay silent unless JOBSH_LOG is set.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sh: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("sh: warning: {e:#}");
        Config::default()
    });

    let relay = signals::install().context("failed to install signal handlers")?;
    let mut shell = Shell::new(config, relay);
    let mut input = LineReader::new(&shell.config);

    let mut state = State::Prompting;
    loop {
        state = match state {
            State::Prompting => {
                shell.reap();
                let prompt = shell.build_prompt();
                match input.read_line(&prompt) {
                    Ok(line) if line.trim().is_empty() => State::Prompting,
                    Ok(line) => State::Parsing(line),
                    // Ctrl-C at the prompt only discards the line being edited.
                    Err(ReadlineError::Interrupted) => State::Prompting,
                    Err(ReadlineError::Eof) => State::Terminating,
                    Err(ReadlineError::InvalidUtf8) => {
                        eprintln!("sh: Input line is not valid UTF-8");
                        State::Prompting
                    }
                    Err(ReadlineError::Other(e)) => {
                        eprintln!("sh: {e}");
                        State::Terminating
                    }
                }
            }

            State::Parsing(line) => match parser::parse(&line) {
                Ok(Some(cmd)) => State::Executing(cmd),
                Ok(None) => State::Prompting,
                Err(e) => {
                    eprintln!("{e}");
                    State::Prompting
                }
            },

            State::Executing(cmd) => match executor::execute(&mut shell, &cmd) {
                Flow::Continue => State::Prompting,
                Flow::Exit => State::Terminating,
            },

            State::Terminating => break,
        };
    }

    tracing::debug!(jobs = shell.jobs.len(), "shutting down");
    shell.shutdown();
    Ok(())
}
