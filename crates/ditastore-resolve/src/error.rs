//! Error types for reference resolution
//!
//! - [`FetchError`]: the repository client could not produce an artifact
//! - [`ResolveError`]: a coordinate could not be turned into a local file

use ditastore_artifact::PathError;
use std::path::PathBuf;

/// Errors reported by an [`ArtifactFetcher`](crate::ArtifactFetcher)
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Artifact is in none of the configured repositories
    #[error("artifact {coordinate} not found (searched: {})", .searched.join(", "))]
    NotFound {
        coordinate: String,
        searched: Vec<String>,
    },

    /// IO error while copying or extracting
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be read
    #[error("cannot read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Artifact type has no known archive format
    #[error("artifact type '{kind}' of {coordinate} is not an archive")]
    NotAnArchive { coordinate: String, kind: String },

    /// Remote repository download failed
    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// Collaborator-specific failure
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create archive error for path
    pub fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Errors while resolving a single coordinate
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Type and internal path disagree with the selected strategy
    #[error("inconsistent reference {coordinate}: {reason}")]
    InvariantViolation { coordinate: String, reason: String },

    /// Group or internal path would leave the topics directory
    #[error("unsafe path in {coordinate}: {source}")]
    UnsafePath {
        coordinate: String,
        #[source]
        source: PathError,
    },

    /// Destination directory could not be created
    #[error("cannot create destination directory {path}: {source}")]
    PrepareDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Repository client failed
    #[error("fetch failed: {0}")]
    FetchFailure(#[from] FetchError),

    /// Fetch succeeded but the expected file is not there
    #[error("resolved file not found: {}", .0.display())]
    ResolvedFileMissing(PathBuf),
}

impl ResolveError {
    /// Create invariant violation error
    pub fn invariant(coordinate: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            coordinate: coordinate.to_string(),
            reason: reason.into(),
        }
    }
}
