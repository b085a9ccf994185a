//! Path identity helpers
//!
//! Graph identities are plain strings with `/` separators so that they compare,
//! sort and prefix-match the same way on every platform.

use std::path::Path;

/// Replaces backslashes with forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Canonical identity of a path: absolute, `..`/symlink free, on-disk form.
///
/// Paths that do not exist are returned with normalized separators only.
pub fn canonical_identity(path: &Path) -> String {
    match std::fs::canonicalize(path) {
        Ok(canonical) => {
            let text = canonical.to_string_lossy();
            let text = text.strip_prefix(r"\\?\").unwrap_or(&text);
            normalize_separators(text)
        }
        Err(_) => normalize_separators(&path.to_string_lossy()),
    }
}

/// Whether an identity is an absolute path (Unix root, drive letter or UNC share).
pub fn is_rooted(identity: &str) -> bool {
    let bytes = identity.as_bytes();
    match bytes {
        [b'/' | b'\\', ..] => true,
        [drive, b':', b'/' | b'\\', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Folder part of an identity split into segments.
///
/// `/src/a/x.h` yields `["", "src", "a"]`; a file directly below the Unix root
/// yields `[""]`.
pub fn folder_segments(identity: &str) -> Vec<&str> {
    let folder = identity.rfind('/').map_or("", |idx| &identity[..idx]);
    folder.split('/').collect()
}

/// Joins folder segments back into a path; the bare Unix root renders as `/`.
pub fn join_segments(segments: &[&str]) -> String {
    let joined = segments.join("/");
    if joined.is_empty() { "/".to_string() } else { joined }
}

/// Relative path from `base_dir` to `target`, both absolute identities.
///
/// Returns `None` when the two live on different roots (e.g. drive letters).
pub fn relative_to(base_dir: &str, target: &str) -> Option<String> {
    let base_dir = normalize_separators(base_dir);
    let target = normalize_separators(target);
    let base: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let goal: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let same_root = match (base.first(), goal.first()) {
        (Some(a), Some(b)) if a.ends_with(':') || b.ends_with(':') => a.eq_ignore_ascii_case(b),
        _ => true,
    };
    if !same_root {
        return None;
    }

    let common = base.iter().zip(&goal).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = std::iter::repeat_n("..", base.len() - common).collect();
    parts.extend(&goal[common..]);
    Some(parts.join("/"))
}

/// Shortest relative form of `target` over a list of base directories.
///
/// With `avoid_up_steps`, proposals that climb out of a base directory are skipped.
pub fn shortest_relative<'a>(
    target: &str,
    base_dirs: impl IntoIterator<Item = &'a str>,
    avoid_up_steps: bool,
) -> Option<String> {
    let mut best: Option<String> = None;
    for dir in base_dirs {
        let Some(proposal) = relative_to(dir, target) else {
            continue;
        };
        if avoid_up_steps && proposal.split('/').any(|part| part == "..") {
            continue;
        }
        if best.as_ref().is_none_or(|b| proposal.len() < b.len()) {
            best = Some(proposal);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rooted() {
        assert!(is_rooted("/usr/include/stdio.h"));
        assert!(is_rooted("C:/dev/a.h"));
        assert!(is_rooted(r"D:\dev\a.h"));
        assert!(!is_rooted("stdio.h"));
        assert!(!is_rooted("sub/a.h"));
        assert!(!is_rooted(""));
    }

    #[test]
    fn test_folder_segments() {
        assert_eq!(folder_segments("/src/a/x.h"), vec!["", "src", "a"]);
        assert_eq!(folder_segments("/x.h"), vec![""]);
        assert_eq!(folder_segments("C:/x.h"), vec!["C:"]);
        assert_eq!(join_segments(&["", "src", "a"]), "/src/a");
        assert_eq!(join_segments(&[""]), "/");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("/p/include", "/p/include/lib/a.h").as_deref(), Some("lib/a.h"));
        assert_eq!(relative_to("/p/src", "/p/include/a.h").as_deref(), Some("../include/a.h"));
        assert_eq!(relative_to("C:/p", "D:/p/a.h"), None);
    }

    #[test]
    fn test_shortest_relative() {
        let dirs = ["/p/src", "/p", "/p/include"];
        assert_eq!(
            shortest_relative("/p/include/a.h", dirs, false).as_deref(),
            Some("a.h")
        );
        assert_eq!(
            shortest_relative("/p/include/a.h", ["/p/src", "/p"], true).as_deref(),
            Some("include/a.h")
        );
        assert_eq!(shortest_relative("/p/include/a.h", ["/p/src"], true), None);
        assert_eq!(
            shortest_relative("/p/include/a.h", ["/p/src"], false).as_deref(),
            Some("../include/a.h")
        );
    }
}
