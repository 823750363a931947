//! Request URL parsing: context path, percent-decoding and query options.

use thiserror::Error;

use crate::vfs::{SortCriteria, UnknownSortCriteria};

/// What a request asks for, relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Decoded path below the context path, without leading `/`
    pub path: String,
    /// `sort=` parameters in the order given
    pub sort: Vec<SortCriteria>,
    /// `download` parameter present
    pub download: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("path is outside the context path")]
    OutsideContext,
    #[error("malformed percent-encoding")]
    BadEncoding,
    #[error(transparent)]
    BadSort(#[from] UnknownSortCriteria),
}

/// Normalize a configured context path to either `""` or `/segment[/...]`.
pub fn normalize_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Parse a request URL (path and query) received under `context_path`,
/// which must already be normalized.
pub fn parse_target(url: &str, context_path: &str) -> Result<Target, TargetError> {
    let (raw_path, query) = url.split_once('?').unwrap_or((url, ""));

    let below = if context_path.is_empty() {
        raw_path
    } else {
        match raw_path.strip_prefix(context_path) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return Err(TargetError::OutsideContext),
        }
    };
    let path = percent_decode(below.trim_start_matches('/'), false)
        .ok_or(TargetError::BadEncoding)?;

    let mut sort: Vec<SortCriteria> = Vec::new();
    let mut download = false;
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "sort" => {
                let value = percent_decode(value, true).ok_or(TargetError::BadEncoding)?;
                sort.push(value.parse()?);
            }
            "download" => download = true,
            _ => {}
        }
    }

    Ok(Target {
        path,
        sort,
        download,
    })
}

/// Decode `%XX` escapes (and `+` as space when `plus_as_space`). `None` on a
/// truncated escape, a non-hex digit or a result that is not UTF-8.
pub fn percent_decode(input: &str, plus_as_space: bool) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                if !hex.iter().all(u8::is_ascii_hexdigit) {
                    return None;
                }
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

/// Escape a path for use in a URL, keeping `/` and unreserved characters.
pub fn percent_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'/' | b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
