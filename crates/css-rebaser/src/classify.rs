//! Deciding which `url(...)` values are eligible for rebasing.

use url::Url;

/// What kind of reference a raw `url(...)` value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    /// Nothing but whitespace.
    Empty,
    /// A rooted filesystem path, a protocol-relative URL or a Windows drive path.
    AbsolutePath,
    /// A URL with a scheme, such as `https:`, `data:` or `mailto:`.
    Remote,
    /// A bare fragment such as `#gradient`, pointing into the same document.
    Fragment,
    /// A relative path that moves with the stylesheet.
    Relative,
}

impl UrlKind {
    /// Returns true if references of this kind are rewritten.
    #[inline]
    pub fn is_rebasable(self) -> bool {
        self == UrlKind::Relative
    }
}

/// Classifies a raw `url(...)` value.
pub fn classify(raw: &str) -> UrlKind {
    let raw = raw.trim();

    if raw.is_empty() {
        return UrlKind::Empty;
    }
    if is_absolute_path(raw) {
        return UrlKind::AbsolutePath;
    }
    if Url::parse(raw).is_ok() {
        return UrlKind::Remote;
    }
    if raw.starts_with('#') {
        return UrlKind::Fragment;
    }

    UrlKind::Relative
}

/// Returns true if the raw `url(...)` value should be rebased.
pub fn is_rebasable(raw: &str) -> bool {
    classify(raw).is_rebasable()
}

fn is_absolute_path(raw: &str) -> bool {
    if raw.starts_with('/') || raw.starts_with('\\') {
        return true;
    }

    // Checked before URL parsing, which would read `C:` as a scheme.
    let bytes = raw.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths() {
        for raw in ["x.png", "./img/x.png", "../fonts/a.woff2?v=1#iefix", "img/a b.png", "?v=1"] {
            assert_eq!(classify(raw), UrlKind::Relative, "{raw}");
            assert!(is_rebasable(raw));
        }
    }

    #[test]
    fn test_absolute_paths() {
        for raw in ["/img/x.png", "//cdn.example.com/x.png", "\\img\\x.png", "C:\\img\\x.png", "c:/img/x.png"] {
            assert_eq!(classify(raw), UrlKind::AbsolutePath, "{raw}");
        }
    }

    #[test]
    fn test_remote_urls() {
        for raw in [
            "http://host/x.png",
            "https://host/x.png?a=b",
            "data:image/png;base64,iVBORw0KGgo=",
            "mailto:someone@example.com",
        ] {
            assert_eq!(classify(raw), UrlKind::Remote, "{raw}");
        }
    }

    #[test]
    fn test_fragment_and_empty() {
        assert_eq!(classify("#frag"), UrlKind::Fragment);
        assert_eq!(classify(""), UrlKind::Empty);
        assert_eq!(classify("   "), UrlKind::Empty);
        assert!(!is_rebasable("#frag"));
        assert!(!is_rebasable(""));
    }
}
