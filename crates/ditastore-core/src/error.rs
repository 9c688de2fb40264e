//! Error types for the rewrite pipeline
//!
//! Every failure aborts the pass. Per-reference failures carry the raw `href`
//! so the message points at the offending map entry.

use crate::config::ConfigError;
use crate::pipeline::PipelineState;
use ditastore_artifact::CoordinateError;
use ditastore_map::DocumentError;
use ditastore_resolve::ResolveError;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Failure category, stable across wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Reference does not use the `m2` scheme
    UnsupportedScheme,
    /// Reference has too few or empty mandatory tokens
    MalformedReference,
    /// Type and internal path disagree, or a path is unsafe
    InvariantViolation,
    /// Repository client failed
    FetchFailure,
    /// Fetch reported success but the file is absent
    ResolvedFileMissing,
    /// Output document could not be written
    Serialization,
    /// Input document could not be read or parsed
    Load,
    /// Configuration rejected
    Config,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnsupportedScheme => "unsupported-scheme",
            Self::MalformedReference => "malformed-reference",
            Self::InvariantViolation => "invariant-violation",
            Self::FetchFailure => "fetch-failure",
            Self::ResolvedFileMissing => "resolved-file-missing",
            Self::Serialization => "serialization",
            Self::Load => "load",
            Self::Config => "config",
        })
    }
}

/// Failure resolving one reference
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// Reference text did not parse
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),

    /// Strategy, fetch or existence check failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Rewrite could not be recorded in the document
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ReferenceError {
    /// Failure category
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Coordinate(CoordinateError::UnsupportedScheme { .. }) => ErrorKind::UnsupportedScheme,
            Self::Coordinate(CoordinateError::Malformed { .. }) => ErrorKind::MalformedReference,
            Self::Resolve(ResolveError::FetchFailure(_)) => ErrorKind::FetchFailure,
            Self::Resolve(ResolveError::ResolvedFileMissing(_)) => ErrorKind::ResolvedFileMissing,
            Self::Resolve(ResolveError::PrepareDestination { .. }) => ErrorKind::Serialization,
            Self::Resolve(ResolveError::InvariantViolation { .. } | ResolveError::UnsafePath { .. })
            | Self::Document(_) => ErrorKind::InvariantViolation,
        }
    }
}

/// Pipeline failure
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Input document could not be loaded
    #[error("cannot load map: {0}")]
    Load(#[source] DocumentError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A reference failed; the remaining ones were not attempted
    #[error("reference #{index} '{href}': {source}")]
    Reference {
        index: usize,
        href: String,
        #[source]
        source: ReferenceError,
    },

    /// Rewritten document could not be written
    #[error("cannot write map: {0}")]
    Serialization(#[source] DocumentError),

    /// State machine misuse
    #[error("illegal pipeline transition {from:?} -> {to:?}")]
    IllegalTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

impl PipelineError {
    /// Failure category
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load(_) => ErrorKind::Load,
            Self::Config(_) => ErrorKind::Config,
            Self::Reference { source, .. } => source.kind(),
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::IllegalTransition { .. } => ErrorKind::InvariantViolation,
        }
    }

    /// Raw `href` of the failing reference, if any
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Reference { href, .. } => Some(href),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
