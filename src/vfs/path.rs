//! String helpers for `/`-separated logical paths.
//!
//! Request paths and the names stored in archives are both reduced with
//! [`segments`]: empty and `.` segments are dropped and `..` is refused. An
//! archive member is then addressed by its [`canonical`] name, so a stored
//! `./docs//a.txt` and a requested `docs/a.txt` meet on the same key.

/// Extension that turns a path segment into an archive boundary.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Whether a name marks an archive. Case-sensitive, shared by the resolver
/// and the entry model so both agree on where archives begin.
pub fn is_archive_name(name: &str) -> bool {
    name.ends_with(ARCHIVE_EXTENSION)
}

/// Meaningful segments of a `/`-separated path; `None` if any segment
/// climbs out with `..`.
pub fn segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ => segments.push(segment),
        }
    }
    Some(segments)
}

/// The segments of `path` joined back with single separators.
pub fn canonical(path: &str) -> Option<String> {
    segments(path).map(|segments| segments.join("/"))
}

/// Strip trailing separators.
pub fn normalize(path: &str) -> &str {
    path.trim_end_matches('/')
}

/// Directory portion of a path; empty for a top-level name.
pub fn parent_of(path: &str) -> &str {
    match normalize(path).rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

/// Last component of a path; empty for the empty path.
pub fn leaf_name(path: &str) -> &str {
    let path = normalize(path);
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// Join two logical paths, either of which may be empty.
pub fn join(prefix: &str, rest: &str) -> String {
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}/{rest}"),
    }
}
