//! Resolution strategy selection
//!
//! Provides [`StrategySelector`], which turns a parsed coordinate into a
//! [`ResolutionRequest`]:
//!
//! - `type == "dita"` → [`ResolutionStrategy::RetrieveWhole`], copied to
//!   `<topicsDir>/<group>/<artifact>.dita`
//! - any other type → [`ResolutionStrategy::ExtractMember`], unpacked into
//!   `<topicsDir>` and addressed as `<topicsDir>/<internalPath>`

use crate::error::ResolveError;
use ditastore_artifact::{validate_segment, ArtifactCoordinate, MemberPath};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// How a coordinate becomes a local file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    /// Copy the artifact file itself
    RetrieveWhole,

    /// Unpack the archive and address one member
    ExtractMember,
}

impl Display for ResolutionStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RetrieveWhole => "retrieve-whole",
            Self::ExtractMember => "extract-member",
        })
    }
}

/// Fully derived instructions for resolving one coordinate
///
/// # Invariants
/// - `RetrieveWhole` ⇔ `file_name.is_some()` and `member.is_none()`
/// - `ExtractMember` ⇔ `member.is_some()` and `file_name.is_none()`
/// - `expected_path` is below the topics directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionRequest {
    coordinate: ArtifactCoordinate,
    strategy: ResolutionStrategy,
    output_directory: PathBuf,
    overwrite_existing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
    #[serde(skip)]
    member: Option<MemberPath>,
    expected_path: PathBuf,
}

impl ResolutionRequest {
    /// Coordinate being resolved
    #[inline]
    #[must_use]
    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    /// Selected strategy
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Directory handed to the fetcher
    #[inline]
    #[must_use]
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Whether existing destination content is refreshed
    #[inline]
    #[must_use]
    pub fn overwrite_existing(&self) -> bool {
        self.overwrite_existing
    }

    /// Destination file name (`RetrieveWhole` only)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Archive member to address (`ExtractMember` only)
    #[inline]
    #[must_use]
    pub fn member(&self) -> Option<&MemberPath> {
        self.member.as_ref()
    }

    /// Local path the reference resolves to once fetched
    #[inline]
    #[must_use]
    pub fn expected_path(&self) -> &Path {
        &self.expected_path
    }

    /// Create the directory component of the expected path
    ///
    /// Idempotent: existing directories are left alone.
    ///
    /// # Errors
    /// Returns [`ResolveError::PrepareDestination`] if creation fails
    pub fn prepare_destination(&self) -> Result<(), ResolveError> {
        let dir = self
            .expected_path
            .parent()
            .unwrap_or(self.output_directory.as_path());
        std::fs::create_dir_all(dir).map_err(|source| ResolveError::PrepareDestination {
            path: dir.to_path_buf(),
            source,
        })
    }
}

/// Chooses a strategy and computes destinations under a topics directory
///
/// Stateless apart from its configuration; the same coordinate always maps
/// to the same request.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    topics_directory: PathBuf,
    overwrite: bool,
}

impl StrategySelector {
    /// Create selector for a topics directory (overwrite enabled)
    #[must_use]
    pub fn new(topics_directory: impl Into<PathBuf>) -> Self {
        Self {
            topics_directory: topics_directory.into(),
            overwrite: true,
        }
    }

    /// Set overwrite behaviour
    #[inline]
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Topics directory destinations are computed under
    #[inline]
    #[must_use]
    pub fn topics_directory(&self) -> &Path {
        &self.topics_directory
    }

    /// Select strategy and derive the request
    ///
    /// # Errors
    /// - [`ResolveError::InvariantViolation`] if the internal path is present
    ///   for a `dita` artifact or missing for any other type
    /// - [`ResolveError::UnsafePath`] if group or internal path would leave
    ///   the topics directory
    pub fn select(&self, coordinate: &ArtifactCoordinate) -> Result<ResolutionRequest, ResolveError> {
        let artifact_type = coordinate.artifact_type();
        let unsafe_path = |source| ResolveError::UnsafePath {
            coordinate: coordinate.to_string(),
            source,
        };

        let request = if artifact_type.is_single_document() {
            if let Some(path) = coordinate.internal_path() {
                return Err(ResolveError::invariant(
                    coordinate,
                    format!("'{artifact_type}' artifacts are retrieved whole but internal path '{path}' was given"),
                ));
            }

            let group = validate_segment(coordinate.group()).map_err(unsafe_path)?;
            let file_name = format!("{}.{}", coordinate.artifact(), artifact_type);
            validate_segment(&file_name).map_err(unsafe_path)?;

            let output_directory = self.topics_directory.join(group);
            ResolutionRequest {
                coordinate: coordinate.clone(),
                strategy: ResolutionStrategy::RetrieveWhole,
                expected_path: output_directory.join(&file_name),
                output_directory,
                overwrite_existing: self.overwrite,
                file_name: Some(file_name),
                member: None,
            }
        } else {
            let Some(path) = coordinate.internal_path() else {
                return Err(ResolveError::invariant(
                    coordinate,
                    format!("'{artifact_type}' artifacts are extracted but no internal path was given"),
                ));
            };

            let member: MemberPath = path.parse().map_err(unsafe_path)?;
            ResolutionRequest {
                coordinate: coordinate.clone(),
                strategy: ResolutionStrategy::ExtractMember,
                expected_path: member.resolve_under(&self.topics_directory),
                output_directory: self.topics_directory.clone(),
                overwrite_existing: self.overwrite,
                file_name: None,
                member: Some(member),
            }
        };

        tracing::debug!(
            coordinate = %coordinate,
            strategy = %request.strategy,
            expected = %request.expected_path.display(),
            "Selected resolution strategy"
        );
        Ok(request)
    }
}
