// src/readline/mod.rs
// Line input: a reedline editor on a terminal, raw byte reads otherwise.

use std::borrow::Cow;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use reedline::{
    ColumnarMenu, Completer, DefaultHinter, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    Reedline, ReedlineEvent, ReedlineMenu, Signal, Span, Suggestion,
};

use crate::completion;
use crate::config::Config;

// ── Prompt ───────────────────────────────────────────────────────────────────

pub struct ShellPrompt {
    pub text: String,
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }
    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }
    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let indicator = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            indicator, history_search.term
        ))
    }
}

// ── Tab Completer ─────────────────────────────────────────────────────────────

pub struct ShellCompleter;

impl Completer for ShellCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let before_cursor = &line[..pos];
        let word_start = before_cursor
            .rfind(|c: char| matches!(c, ' ' | '\t' | '<' | '>' | '&'))
            .map(|i| i + 1)
            .unwrap_or(0);

        let partial = &before_cursor[word_start..];
        let is_first_word = before_cursor[..word_start].trim().is_empty();

        completion::complete(partial, is_first_word)
            .into_iter()
            .map(|candidate| Suggestion {
                append_whitespace: candidate.is_builtin,
                description: candidate.is_builtin.then(|| "builtin".to_string()),
                value: candidate.value,
                style: None,
                extra: None,
                span: Span::new(word_start, pos),
            })
            .collect()
    }
}

// ── Line reader ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ReadlineError {
    Interrupted,
    Eof,
    /// The line was read but is not UTF-8; it is discarded rather than
    /// passed on with replacement characters.
    InvalidUtf8,
    Other(String),
}

pub enum LineReader {
    Editor(Box<Reedline>),
    /// Reads fd 0 one byte at a time so nothing is buffered away from the
    /// children that share it.
    Raw { echo_newline_at_eof: bool },
}

impl LineReader {
    pub fn new(config: &Config) -> Self {
        if config.line_editor && io::stdin().is_terminal() {
            LineReader::Editor(Box::new(build_editor(config)))
        } else {
            LineReader::Raw {
                echo_newline_at_eof: config.prompt,
            }
        }
    }

    pub fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        match self {
            LineReader::Editor(editor) => {
                let prompt = ShellPrompt { text: prompt.to_string() };
                match editor.read_line(&prompt) {
                    Ok(Signal::Success(line)) => Ok(line),
                    Ok(Signal::CtrlC) => Err(ReadlineError::Interrupted),
                    Ok(Signal::CtrlD) => Err(ReadlineError::Eof),
                    Err(e) => Err(ReadlineError::Other(e.to_string())),
                }
            }
            LineReader::Raw { echo_newline_at_eof } => {
                if !prompt.is_empty() {
                    print!("{prompt}");
                    io::stdout().flush().ok();
                }
                read_raw_line(*echo_newline_at_eof)
            }
        }
    }
}

fn build_editor(config: &Config) -> Reedline {
    let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

    let mut keybindings = reedline::default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    let mut editor = Reedline::create()
        .with_completer(Box::new(ShellCompleter))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(reedline::Emacs::new(keybindings)))
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(
                nu_ansi_term::Style::new()
                    .italic()
                    .fg(nu_ansi_term::Color::DarkGray),
            ),
        ));

    if let Some(history) = open_history(config.history_path(), config.history_size) {
        editor = editor.with_history(history);
    }
    editor
}

fn open_history(path: Option<PathBuf>, size: usize) -> Option<Box<FileBackedHistory>> {
    let history = match path {
        Some(path) => FileBackedHistory::with_file(size, path),
        None => FileBackedHistory::new(size),
    };
    match history {
        Ok(history) => Some(Box::new(history)),
        Err(e) => {
            tracing::warn!(error = %e, "history unavailable");
            None
        }
    }
}

/// One line from fd 0, without its newline.
fn read_raw_line(echo_newline_at_eof: bool) -> Result<String, ReadlineError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match read_byte(&mut byte) {
            Ok(0) => {
                if line.is_empty() {
                    if echo_newline_at_eof {
                        println!();
                    }
                    return Err(ReadlineError::Eof);
                }
                // Last line without a newline: keep the output tidy.
                if echo_newline_at_eof {
                    println!();
                }
                break;
            }
            Ok(_) if byte[0] == b'\n' => break,
            Ok(_) => line.push(byte[0]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReadlineError::Other(e.to_string())),
        }
    }
    decode_line(line)
}

fn decode_line(line: Vec<u8>) -> Result<String, ReadlineError> {
    String::from_utf8(line).map_err(|_| ReadlineError::InvalidUtf8)
}

fn read_byte(byte: &mut [u8; 1]) -> io::Result<usize> {
    // SAFETY: the buffer is valid for one byte of writes.
    let n = unsafe { libc::read(libc::STDIN_FILENO, byte.as_mut_ptr().cast(), 1) };
    if n < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(n as usize)
}
