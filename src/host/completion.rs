// Path completion answered by the host
//
// The prefix is split at its last path separator. The directory part is
// listed relative to the tracked cwd and entries are matched against the
// remainder case-insensitively. Items that need quoting start with the
// user's opening quote (or `"` when the name has whitespace); files also get
// the closing quote, directories stay open for the next component.

use std::path::{is_separator, Path, MAIN_SEPARATOR};

use super::cwd::strip_quotes;

/// Candidates for `prefix`, sorted by name; directories end with a separator
pub fn path_completions(prefix: &str, cwd: &Path) -> Vec<String> {
    let opening_quote = prefix.chars().next().filter(|&c| c == '"' || c == '\'');
    let cleaned = strip_quotes(prefix);
    let (dir_part, base_part) = match cleaned.rfind(is_separator) {
        Some(idx) => {
            let split = idx + cleaned[idx..].chars().next().map_or(1, char::len_utf8);
            cleaned.split_at(split)
        }
        None => ("", cleaned),
    };
    let dir = if dir_part.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(dir_part)
    };

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let needle = base_part.to_lowercase();
    let mut matches: Vec<(String, bool)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.to_lowercase().starts_with(&needle) {
                return None;
            }
            // Follows symlinks so linked directories count as directories
            let is_dir = std::fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false);
            Some((name, is_dir))
        })
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0));

    matches
        .into_iter()
        .map(|(name, is_dir)| {
            let path = format!("{}{}", dir_part, name);
            let quote = opening_quote.or_else(|| path.contains(char::is_whitespace).then_some('"'));
            let mut item = String::with_capacity(path.len() + 2);
            if let Some(q) = quote {
                item.push(q);
            }
            item.push_str(&path);
            match (is_dir, quote) {
                (true, _) => item.push(MAIN_SEPARATOR),
                (false, Some(q)) => item.push(q),
                (false, None) => {}
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bar.txt"), "").unwrap();
        std::fs::write(dir.path().join("Baz.txt"), "").unwrap();
        std::fs::write(dir.path().join("other"), "").unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build").join("out.log"), "").unwrap();
        dir
    }

    #[test]
    fn test_matches_case_insensitively_and_sorts() {
        let dir = fixture();
        let items = path_completions("ba", dir.path());
        assert_eq!(items, vec!["Baz.txt".to_string(), "bar.txt".to_string()]);
    }

    #[test]
    fn test_directories_get_separator() {
        let dir = fixture();
        let items = path_completions("bu", dir.path());
        assert_eq!(items, vec![format!("build{}", MAIN_SEPARATOR)]);
    }

    #[test]
    fn test_nested_prefix_keeps_dir_part() {
        let dir = fixture();
        let prefix = format!("build{}o", MAIN_SEPARATOR);
        let items = path_completions(&prefix, dir.path());
        assert_eq!(items, vec![format!("build{}out.log", MAIN_SEPARATOR)]);
    }

    #[test]
    fn test_quoted_prefix_keeps_quote() {
        let dir = fixture();
        assert_eq!(path_completions("\"oth", dir.path()), vec!["\"other\"".to_string()]);
        assert_eq!(path_completions("'bu", dir.path()), vec![format!("'build{}", MAIN_SEPARATOR)]);
    }

    #[test]
    fn test_names_with_spaces_are_quoted() {
        let dir = fixture();
        std::fs::create_dir(dir.path().join("my dir")).unwrap();
        std::fs::write(dir.path().join("my notes.txt"), "").unwrap();
        let items = path_completions("my", dir.path());
        assert_eq!(
            items,
            vec![format!("\"my dir{}", MAIN_SEPARATOR), "\"my notes.txt\"".to_string()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_gets_separator() {
        let dir = fixture();
        std::os::unix::fs::symlink(dir.path().join("build"), dir.path().join("link")).unwrap();
        let items = path_completions("li", dir.path());
        assert_eq!(items, vec![format!("link{}", MAIN_SEPARATOR)]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = fixture();
        let prefix = format!("nope{}x", MAIN_SEPARATOR);
        assert!(path_completions(&prefix, dir.path()).is_empty());
    }
}
