//! Watch-path matching (§4.C step 5): exact match; directory-prefix
//! (`a/b/`); file-glob (`*.ext`, single-segment `?`/`*`); recursive glob
//! (`a/**`, implemented as an `a/` prefix match). Services without
//! watch-paths always match (testable property 1).

use regex::Regex;

/// Whether `changed_files` contains at least one path matched by at least
/// one of `watch_paths`. An empty `watch_paths` always matches.
#[must_use]
pub fn matches_any(watch_paths: &[String], changed_files: &[String]) -> bool {
    if watch_paths.is_empty() {
        return true;
    }
    watch_paths.iter().any(|pattern| changed_files.iter().any(|file| matches_one(pattern, file)))
}

fn matches_one(pattern: &str, file: &str) -> bool {
    if pattern == file {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix("/**") {
        return file == prefix || file.starts_with(&format!("{prefix}/"));
    }
    if pattern.ends_with('/') {
        return file.starts_with(pattern);
    }
    if pattern.contains('*') || pattern.contains('?') {
        return glob_match(pattern, file);
    }
    false
}

/// Single-segment glob: `*` and `?` never cross a `/` boundary, matching
/// the spec's "file-glob (`*.ext`, with single-segment `?` and `*`)".
fn glob_match(pattern: &str, file: &str) -> bool {
    let mut regex_str = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => regex_str.push_str("[^/]*"),
            '?' => regex_str.push_str("[^/]"),
            c => regex_str.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex_str.push('$');
    Regex::new(&regex_str).map(|re| re.is_match(file)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_watch_paths_always_matches() {
        assert!(matches_any(&[], &files(&["anything.go"])));
    }

    #[test]
    fn exact_match() {
        assert!(matches_any(&["apps/api/server.go".to_string()], &files(&["apps/api/server.go"])));
        assert!(!matches_any(&["apps/api/server.go".to_string()], &files(&["apps/web/server.go"])));
    }

    #[test]
    fn directory_prefix_match() {
        let watch = vec!["apps/api/".to_string()];
        assert!(matches_any(&watch, &files(&["apps/api/server.go"])));
        assert!(!matches_any(&watch, &files(&["apps/web/server.go"])));
    }

    #[test]
    fn file_glob_is_single_segment() {
        let watch = vec!["apps/api/*.go".to_string()];
        assert!(matches_any(&watch, &files(&["apps/api/server.go"])));
        assert!(!matches_any(&watch, &files(&["apps/api/sub/server.go"])));
    }

    #[test]
    fn recursive_glob_matches_any_depth() {
        let watch = vec!["apps/api/**".to_string()];
        assert!(matches_any(&watch, &files(&["apps/api/sub/deep/server.go"])));
        assert!(matches_any(&watch, &files(&["apps/api"])));
        assert!(!matches_any(&watch, &files(&["apps/web/server.go"])));
    }

    #[test]
    fn services_without_changed_files_in_watch_paths_are_skipped() {
        let watch = vec!["apps/api/".to_string()];
        assert!(!matches_any(&watch, &files(&["apps/web/index.tsx"])));
    }
}
