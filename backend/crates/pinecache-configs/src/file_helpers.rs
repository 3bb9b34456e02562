//! Path helpers shared by configuration consumers.

use std::path::{Path, PathBuf};

/// Resolve a directory path against the current working directory.
///
/// Relative paths stay relative in meaning; the result is absolute so that
/// later `chdir` calls or log messages do not change what they point at.
/// Falls back to the input unchanged when the working directory is unknown.
pub fn normalize_dir_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return path.to_string();
    }

    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        return strip_trailing_separator(trimmed);
    }

    match std::env::current_dir() {
        Ok(cwd) => {
            let joined = cwd.join(candidate.strip_prefix("./").unwrap_or(candidate));
            strip_trailing_separator(&joined.to_string_lossy())
        }
        Err(_) => path.to_string(),
    }
}

/// Join a child component onto a base directory.
pub fn join_path(base: impl AsRef<Path>, child: &str) -> PathBuf {
    base.as_ref().join(child)
}

fn strip_trailing_separator(path: &str) -> String {
    if path.len() > 1 {
        path.trim_end_matches(['/', '\\']).to_string()
    } else {
        path.to_string()
    }
}
