// src/parser/mod.rs
pub mod ast;

use std::iter::Peekable;
use std::str::Chars;

use ast::{CommandLine, OutputMode, Redirects};
use crate::error::{Direction, ParseError};

/// Parse one input line (trailing newline already removed).
///
/// Returns `Ok(None)` for a line with nothing to run.
pub fn parse(input: &str) -> Result<Option<CommandLine>, ParseError> {
    let (line, background) = strip_background(input);
    let (text, redirects) = extract_redirects(line)?;

    let mut words = split_blanks(&text);
    let Some(name) = words.next() else {
        if redirects.is_empty() {
            return Ok(None);
        }
        return Err(ParseError::MissingCommand);
    };

    Ok(Some(CommandLine {
        name: name.to_string(),
        args: words.map(String::from).collect(),
        redirects,
        background,
    }))
}

/// Cut the line at the first `&` when only blanks follow it.
pub fn strip_background(line: &str) -> (&str, bool) {
    match line.find('&') {
        Some(i) if line[i + 1..].chars().all(is_blank) => (&line[..i], true),
        _ => (line, false),
    }
}

/// Blank-separated words; empty runs are skipped.
pub fn split_blanks(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_blank).filter(|w| !w.is_empty())
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_marker(c: char) -> bool {
    c == '<' || c == '>'
}

/// Copy everything except redirections into the returned command text.
fn extract_redirects(line: &str) -> Result<(String, Redirects), ParseError> {
    let mut command = String::with_capacity(line.len());
    let mut redirects = Redirects::default();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => {
                if redirects.stdin.is_some() {
                    return Err(ParseError::MultipleRedirects(Direction::Input));
                }
                redirects.stdin = Some(read_target(&mut chars)?.into());
            }
            '>' => {
                if redirects.stdout.is_some() {
                    return Err(ParseError::MultipleRedirects(Direction::Output));
                }
                let mode = if chars.peek() == Some(&'>') {
                    chars.next();
                    OutputMode::Append
                } else {
                    OutputMode::Truncate
                };
                redirects.stdout = Some((read_target(&mut chars)?.into(), mode));
            }
            _ => command.push(c),
        }
    }

    Ok((command, redirects))
}

fn read_target(chars: &mut Peekable<Chars>) -> Result<String, ParseError> {
    while chars.peek().is_some_and(|&c| is_blank(c)) {
        chars.next();
    }

    let mut target = String::new();
    while let Some(&c) = chars.peek() {
        if is_blank(c) || is_marker(c) {
            break;
        }
        target.push(c);
        chars.next();
    }

    if target.is_empty() {
        return Err(ParseError::MissingRedirectTarget);
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    fn parsed(line: &str) -> CommandLine {
        parse(line).unwrap().unwrap()
    }

    #[test]
    fn splits_name_and_arguments() {
        let cmd = parsed("  /bin/echo  hello\tworld ");
        assert_eq!(cmd.name, "/bin/echo");
        assert_eq!(cmd.args, ["hello", "world"]);
        assert!(!cmd.background);
        assert!(cmd.redirects.is_empty());
    }

    #[test]
    fn blank_lines_have_no_command() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse(" \t "), Ok(None));
        assert_eq!(parse(" & "), Ok(None));
    }

    #[test]
    fn trailing_ampersand_marks_background() {
        let cmd = parsed("/bin/sleep 100 &");
        assert!(cmd.background);
        assert_eq!(cmd.args, ["100"]);

        let cmd = parsed("/bin/sleep 100&  ");
        assert!(cmd.background);
        assert_eq!(cmd.args, ["100"]);
    }

    #[test]
    fn ampersand_followed_by_text_is_an_ordinary_character() {
        let cmd = parsed("/bin/echo a&b");
        assert!(!cmd.background);
        assert_eq!(cmd.args, ["a&b"]);
    }

    #[test]
    fn output_redirection_truncates_by_default() {
        let cmd = parsed("/bin/echo hi > out.txt");
        assert_eq!(cmd.args, ["hi"]);
        assert_eq!(
            cmd.redirects.stdout,
            Some((PathBuf::from("out.txt"), OutputMode::Truncate))
        );
    }

    #[test]
    fn double_marker_appends() {
        let cmd = parsed("/bin/echo hi >>log");
        assert_eq!(
            cmd.redirects.stdout,
            Some((PathBuf::from("log"), OutputMode::Append))
        );
    }

    #[test]
    fn redirections_may_appear_anywhere() {
        let cmd = parsed("<in /bin/cat -n >out &");
        assert_eq!(cmd.name, "/bin/cat");
        assert_eq!(cmd.args, ["-n"]);
        assert_eq!(cmd.redirects.stdin, Some(PathBuf::from("in")));
        assert_eq!(
            cmd.redirects.stdout,
            Some((PathBuf::from("out"), OutputMode::Truncate))
        );
        assert!(cmd.background);
    }

    #[test]
    fn target_ends_at_the_next_marker() {
        let cmd = parsed("/bin/cat<in>out");
        assert_eq!(cmd.name, "/bin/cat");
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.redirects.stdin, Some(PathBuf::from("in")));
        assert_eq!(
            cmd.redirects.stdout,
            Some((PathBuf::from("out"), OutputMode::Truncate))
        );
    }

    #[test]
    fn text_after_a_target_stays_in_the_command() {
        let cmd = parsed("/bin/echo a >out b");
        assert_eq!(cmd.args, ["a", "b"]);
    }

    #[test]
    fn second_redirection_in_one_direction_is_rejected() {
        assert_eq!(
            parse("/bin/echo > a > b"),
            Err(ParseError::MultipleRedirects(Direction::Output))
        );
        assert_eq!(
            parse("/bin/echo > a >> b"),
            Err(ParseError::MultipleRedirects(Direction::Output))
        );
        assert_eq!(
            parse("/bin/cat < a < b"),
            Err(ParseError::MultipleRedirects(Direction::Input))
        );
    }

    #[test]
    fn marker_without_target_is_rejected() {
        assert_eq!(parse("/bin/echo >"), Err(ParseError::MissingRedirectTarget));
        assert_eq!(parse("/bin/echo >   "), Err(ParseError::MissingRedirectTarget));
        assert_eq!(parse("/bin/cat < > out"), Err(ParseError::MissingRedirectTarget));
        assert_eq!(parse("/bin/cat > <in"), Err(ParseError::MissingRedirectTarget));
    }

    #[test]
    fn redirection_alone_has_no_command() {
        assert_matches!(parse("> out"), Err(ParseError::MissingCommand));
    }

    #[test]
    fn background_is_stripped_before_redirections() {
        let cmd = parsed("/bin/echo hi > out &");
        assert!(cmd.background);
        assert_eq!(
            cmd.redirects.stdout,
            Some((PathBuf::from("out"), OutputMode::Truncate))
        );
    }
}
