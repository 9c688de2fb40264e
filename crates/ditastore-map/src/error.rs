//! Error types for map documents
//!
//! Covers the three places a document can fail:
//! - Load (file → text, well-formedness check)
//! - Edit (recording an `href` replacement)
//! - Write (text → output file)

use std::path::PathBuf;

/// Errors while loading, editing or writing a map document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// IO error reading the input
    #[error("io error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not well-formed XML
    #[error("syntax error in {name}: {message}")]
    Syntax { name: String, message: String },

    /// Handle does not point at an attribute value of this document
    #[error("stale reference handle #{index} (bytes {start}..{end})")]
    StaleHandle {
        index: usize,
        start: usize,
        end: usize,
    },

    /// Document has no file name to write under
    #[error("document has no file name")]
    Unnamed,

    /// IO error writing the output
    #[error("io error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    /// Create read error for path
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create write error for path
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create syntax error for a document name
    pub fn syntax_error(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Syntax {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = DocumentError::syntax_error("guide.ditamap", "unexpected end of stream");
        assert_eq!(
            err.to_string(),
            "syntax error in guide.ditamap: unexpected end of stream"
        );
    }

    #[test]
    fn write_error_classification() {
        let err = DocumentError::write_error(
            "/out/guide.ditamap",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, DocumentError::Write { .. }));
        assert!(err.to_string().starts_with("io error writing /out/guide.ditamap"));
    }
}
