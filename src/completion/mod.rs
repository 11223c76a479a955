// src/completion/mod.rs
// Tab completion: builtin names for the first word, filesystem paths always.
// Commands run by exact path, so there is no PATH lookup here.

use std::path::{Path, PathBuf};

use crate::executor::builtin::BUILTIN_NAMES;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub is_builtin: bool,
}

/// Given a partial word, return a list of completions
pub fn complete(partial: &str, is_first_word: bool) -> Vec<Candidate> {
    let mut results = Vec::new();
    if is_first_word && !partial.is_empty() {
        results.extend(
            BUILTIN_NAMES
                .iter()
                .filter(|name| name.starts_with(partial))
                .map(|name| Candidate { value: name.to_string(), is_builtin: true }),
        );
    }
    results.extend(
        complete_path(partial)
            .into_iter()
            .map(|value| Candidate { value, is_builtin: false }),
    );
    results
}

/// Complete file and directory names
pub fn complete_path(partial: &str) -> Vec<String> {
    let (dir, prefix) = match partial.rfind('/') {
        Some(i) => {
            let dir = &partial[..=i];
            (PathBuf::from(dir), &partial[i + 1..])
        }
        None => (PathBuf::from("."), partial),
    };

    let Ok(read_dir) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut matches: Vec<String> = read_dir
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(prefix) || (prefix.is_empty() && name.starts_with('.')) {
                return None;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            Some(join(partial, &dir, &name, is_dir))
        })
        .collect();

    matches.sort();
    matches
}

fn join(partial: &str, dir: &Path, name: &str, is_dir: bool) -> String {
    let trail = if is_dir { "/" } else { "" };
    if partial.contains('/') {
        format!("{}{}{}", dir.display(), name, trail)
    } else {
        format!("{}{}", name, trail)
    }
}
