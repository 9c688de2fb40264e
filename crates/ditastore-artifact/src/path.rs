//! Member paths inside archives and topic directories
//!
//! Provides [`MemberPath`], a validated relative path that can be joined onto
//! a base directory without escaping it.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Relative path below a base directory
///
/// Hierarchical structure using string segments, always relative.
///
/// # Examples
/// - `docs/page1.dita` → `["docs", "page1.dita"]`
/// - `./docs//page1.dita` → `["docs", "page1.dita"]`
/// - `../page1.dita` → rejected
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberPath(Vec<String>);

impl MemberPath {
    /// Create a path from pre-validated segments
    ///
    /// # Errors
    /// Returns error if any segment is not a plain name
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        for segment in &segments {
            validate_segment(segment)?;
        }
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments))
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty member path cannot be constructed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Final segment (the file name)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// Parent directory (if any)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Join onto a base directory
    #[must_use]
    pub fn resolve_under(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        path.extend(&self.0);
        path
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for MemberPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for MemberPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(['/', '\\']) || has_drive_prefix(s) {
            return Err(PathError::Absolute(s.to_string()));
        }

        let segments: Vec<String> = s
            .split(['/', '\\'])
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .map(|seg| {
                if seg == ".." {
                    Err(PathError::ParentTraversal(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments))
    }
}

/// `C:`, `C:/...` or `C:\...`; `x:page.dita` is an ordinary name
fn has_drive_prefix(s: &str) -> bool {
    match s.as_bytes() {
        [drive, b':'] => drive.is_ascii_alphabetic(),
        [drive, b':', sep, ..] => drive.is_ascii_alphabetic() && matches!(sep, b'/' | b'\\'),
        _ => false,
    }
}

/// Check that `segment` is a single plain path component
///
/// # Errors
/// Returns error for empty strings, `.`/`..`, or strings with separators
pub fn validate_segment(segment: &str) -> Result<&str, PathError> {
    match segment {
        "" => Err(PathError::Empty),
        "." | ".." => Err(PathError::ParentTraversal(segment.to_string())),
        s if s.contains(['/', '\\']) => Err(PathError::InvalidSegment(s.to_string())),
        s => Ok(s),
    }
}

/// Errors related to member paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Nothing left after normalization
    #[error("path is empty")]
    Empty,

    /// Absolute path where a relative one is required
    #[error("path '{0}' must be relative")]
    Absolute(String),

    /// Path climbs out of its base directory
    #[error("path '{0}' escapes its base directory")]
    ParentTraversal(String),

    /// Segment containing a separator
    #[error("invalid path segment: '{0}'")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let path: MemberPath = "docs/page1.dita".parse().unwrap();
        assert_eq!(path.segments(), &["docs", "page1.dita"]);
        assert_eq!(path.file_name(), "page1.dita");
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn parse_normalizes_dots_and_repeated_separators() {
        let path: MemberPath = "./docs//topics\\page1.dita".parse().unwrap();
        assert_eq!(path.to_string(), "docs/topics/page1.dita");
    }

    #[test]
    fn parse_rejects_absolute() {
        assert!(matches!("/etc/passwd".parse::<MemberPath>(), Err(PathError::Absolute(_))));
        assert!(matches!("C:/x.dita".parse::<MemberPath>(), Err(PathError::Absolute(_))));
        assert!(matches!("c:\\x.dita".parse::<MemberPath>(), Err(PathError::Absolute(_))));
        assert!(matches!("C:".parse::<MemberPath>(), Err(PathError::Absolute(_))));
    }

    #[test]
    fn colon_after_single_letter_is_a_name() {
        let path: MemberPath = "x:page.dita".parse().unwrap();
        assert_eq!(path.segments(), &["x:page.dita"]);

        let nested: MemberPath = "x:docs/page.dita".parse().unwrap();
        assert_eq!(nested.segments(), &["x:docs", "page.dita"]);
    }

    #[test]
    fn parse_rejects_traversal() {
        let result = "docs/../../outside.dita".parse::<MemberPath>();
        assert!(matches!(result, Err(PathError::ParentTraversal(_))));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!("".parse::<MemberPath>(), Err(PathError::Empty));
        assert_eq!("./".parse::<MemberPath>(), Err(PathError::Empty));
    }

    #[test]
    fn parent_and_resolve() {
        let path: MemberPath = "a/b/c.dita".parse().unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "a/b");
        assert!(MemberPath::new(vec!["c.dita".into()]).unwrap().parent().is_none());

        let resolved = path.resolve_under(Path::new("/out/topics"));
        assert_eq!(resolved, PathBuf::from("/out/topics/a/b/c.dita"));
    }

    #[test]
    fn segment_validation() {
        assert_eq!(validate_segment("com.acme"), Ok("com.acme"));
        assert!(validate_segment("com/acme").is_err());
        assert!(validate_segment("..").is_err());
        assert!(validate_segment("").is_err());
    }

    #[test]
    fn new_validates_segments() {
        assert!(MemberPath::new(vec!["ok".into(), "..".into()]).is_err());
        assert!(MemberPath::new(Vec::new()).is_err());
    }
}
