//! Lexical path arithmetic over `/`-separated paths.
//!
//! Resolution never touches the filesystem: a source map can name files that
//! only existed on the machine that compiled the stylesheet.

use camino::Utf8Path;
use url::Url;

/// Splits a raw URL into its path and its `?query` / `#fragment` suffix.
pub fn split_suffix(raw: &str) -> (&str, &str) {
    match raw.find(['?', '#']) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    }
}

/// Returns the directory part of a path, `.` when there is none.
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." };
    }

    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => trimmed[..idx].trim_end_matches('/'),
        None => ".",
    }
}

/// Collapses `.` and `..` segments and duplicate separators.
///
/// Leading `..` segments of a relative path are kept; `..` at the root of an
/// absolute path is dropped. A trailing separator survives. An empty result
/// becomes `.`.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }

    let mut normalized = segments.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if normalized.is_empty() {
        return ".".to_string();
    }
    if path.ends_with('/') && !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Joins two paths and normalizes the result.
pub fn join(base: &str, path: &str) -> String {
    if base.is_empty() {
        return normalize(path);
    }
    normalize(&format!("{base}/{path}"))
}

/// Resolves a raw relative URL against the file it was written in.
///
/// The query/fragment suffix is carried over unchanged.
pub fn resolve(source: &str, raw: &str) -> String {
    let (path, suffix) = split_suffix(raw);
    let mut resolved = join(dirname(source), path);
    resolved.push_str(suffix);
    resolved
}

/// Expresses `path` relative to `base`, both taken lexically.
pub fn relative_to(path: &str, base: &str) -> String {
    let path = normalize(path);
    let base = normalize(base);
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let base_segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = path_segments
        .iter()
        .zip(&base_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments = vec![".."; base_segments.len() - common];
    segments.extend(&path_segments[common..]);

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Turns a source map `sources` entry into the path handed to policies.
///
/// `file://` URLs become filesystem paths. When `base_dir` is set, absolute
/// sources are made relative to it.
pub fn normalize_source(source: &str, base_dir: Option<&Utf8Path>) -> String {
    let mut source = source.to_string();

    if source.starts_with("file:") {
        if let Some(path) = Url::parse(&source)
            .ok()
            .and_then(|url| url.to_file_path().ok())
        {
            source = path.to_string_lossy().replace('\\', "/");
        }
    }

    match base_dir {
        Some(base) if source.starts_with('/') => {
            relative_to(&source, &base.as_str().replace('\\', "/"))
        }
        _ => source,
    }
}
