//! Virtual path handling.
//!
//! The protocol front end hands the adapter slash-separated paths rooted at
//! the adapter's base (`/docs/readme.md`, `/docs/*`). Backends address
//! objects without the leading separator (`docs/readme.md`).
//!
//! No traversal resolution is performed: a literal `..` segment survives
//! normalization. The front end is responsible for confining paths to the
//! virtual root. The contents API binding refuses `.` and `..` segments
//! since URL normalization would address a different object.

/// Path separator.
pub const SEPARATOR: char = '/';

/// Trailing glob marker accepted by [`GlobPattern`].
pub const WILDCARD: char = '*';

/// Canonicalize a virtual path for a backend call.
///
/// Strips leading separators and any trailing wildcard characters. Nothing
/// else changes. Pure and idempotent.
///
/// ```
/// use repofs::path::normalize;
///
/// assert_eq!(normalize("/docs/readme.md"), "docs/readme.md");
/// assert_eq!(normalize("/docs/*"), "docs/");
/// assert_eq!(normalize("/"), "");
/// ```
pub fn normalize(path: &str) -> String {
    path.trim_start_matches(SEPARATOR)
        .trim_end_matches(WILDCARD)
        .to_string()
}

/// Normalize and drop trailing separators, giving the object key.
///
/// `"/docs/"` and `"/docs"` both address `"docs"`. The root is `""`.
pub fn object_key(path: &str) -> String {
    normalize(path).trim_end_matches(SEPARATOR).to_string()
}

/// Re-qualify a backend key as a virtual path with one leading separator.
pub fn qualify(key: &str) -> String {
    format!("{}{}", SEPARATOR, key.trim_start_matches(SEPARATOR))
}

/// Join a child name onto a backend key.
pub fn join(key: &str, name: &str) -> String {
    if key.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", key, SEPARATOR, name)
    }
}

/// Final component of a backend key, or `""` for the root.
pub fn file_name(key: &str) -> &str {
    key.rsplit(SEPARATOR).next().unwrap_or("")
}

/// A `dir` argument split into the listing prefix and whether it was globbed.
///
/// - `/docs/*` lists `docs` and keeps entries starting with `docs/`
/// - `/docs/re*` lists `docs` and keeps entries starting with `docs/re`
/// - `/*` lists the root and keeps everything
/// - `/docs/readme.md` names a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    prefix: String,
    wildcard: bool,
}

impl GlobPattern {
    /// Parse a raw virtual path.
    pub fn parse(path: &str) -> Self {
        Self {
            prefix: normalize(path),
            wildcard: path.ends_with(WILDCARD),
        }
    }

    /// True if the path ended in a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Text preceding the wildcard, without the leading separator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the directory whose listing holds the candidates.
    pub fn directory(&self) -> &str {
        match self.prefix.rfind(SEPARATOR) {
            Some(pos) => &self.prefix[..pos],
            None => "",
        }
    }

    /// True if a backend key is selected by this pattern.
    pub fn matches(&self, key: &str) -> bool {
        if self.wildcard {
            key.starts_with(&self.prefix)
        } else {
            key == self.prefix.trim_end_matches(SEPARATOR)
        }
    }

    /// Like [`matches`](Self::matches), but a glob only selects keys
    /// directly inside [`directory`](Self::directory).
    pub fn matches_immediate(&self, key: &str) -> bool {
        if !self.matches(key) {
            return false;
        }
        !self.wildcard || !key[self.prefix.len()..].contains(SEPARATOR)
    }
}
