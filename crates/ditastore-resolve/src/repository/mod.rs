//! Maven repository client
//!
//! [`MavenRepository`] is the production [`ArtifactFetcher`]. It looks an
//! artifact up in the local repository, falls back to each configured
//! [`RemoteRepository`] in order, and then copies or unpacks the file.

mod archive;
mod remote;

pub use archive::{extract, ExtractStats};
pub use remote::{RemoteRepository, DEFAULT_TIMEOUT};

use crate::error::FetchError;
use crate::fetcher::ArtifactFetcher;
use ditastore_artifact::{ArtifactCoordinate, RepositoryLayout};
use std::fs;
use std::path::{Path, PathBuf};

/// Local repository plus optional remotes
#[derive(Debug, Clone)]
pub struct MavenRepository {
    local_root: PathBuf,
    remotes: Vec<RemoteRepository>,
}

impl MavenRepository {
    /// Create client for a local repository root
    #[must_use]
    pub fn new(local_root: impl Into<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            remotes: Vec::new(),
        }
    }

    /// Add a remote repository, consulted after the ones already added
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteRepository) -> Self {
        self.remotes.push(remote);
        self
    }

    /// `$HOME/.m2/repository`, if a home directory is known
    #[must_use]
    pub fn default_local_root() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".m2").join("repository"))
    }

    /// Local repository root
    #[inline]
    #[must_use]
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// Configured remotes in lookup order
    #[inline]
    #[must_use]
    pub fn remotes(&self) -> &[RemoteRepository] {
        &self.remotes
    }

    /// Path of the artifact in the local repository, downloading it if needed
    ///
    /// # Errors
    /// Returns [`FetchError::NotFound`] when neither the local repository nor
    /// any remote has the artifact
    pub fn locate(&self, coordinate: &ArtifactCoordinate) -> Result<PathBuf, FetchError> {
        let layout = RepositoryLayout::for_coordinate(coordinate);
        let local = layout
            .segments()
            .iter()
            .fold(self.local_root.clone(), |path, segment| path.join(segment));

        if local.is_file() {
            tracing::debug!(coordinate = %coordinate, path = %local.display(), "Found in local repository");
            return Ok(local);
        }

        let mut searched = vec![self.local_root.display().to_string()];
        for remote in &self.remotes {
            match remote.download(&layout, &local) {
                Ok(()) => return Ok(local),
                Err(e) => {
                    tracing::warn!(coordinate = %coordinate, remote = remote.base_url(), error = %e, "Remote lookup failed");
                    searched.push(remote.base_url().to_string());
                }
            }
        }

        Err(FetchError::NotFound {
            coordinate: coordinate.to_string(),
            searched,
        })
    }
}

impl ArtifactFetcher for MavenRepository {
    fn retrieve_whole(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        destination_file_name: &str,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        let target = destination_dir.join(destination_file_name);
        if !overwrite && target.exists() {
            tracing::debug!(path = %target.display(), "Keeping existing file");
            return Ok(target);
        }

        let source = self.locate(coordinate)?;
        fs::create_dir_all(destination_dir).map_err(|e| FetchError::io_error(destination_dir, e))?;
        fs::copy(&source, &target).map_err(|e| FetchError::io_error(&target, e))?;
        Ok(target)
    }

    fn extract_member(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        let artifact_type = coordinate.artifact_type();
        let Some(format) = artifact_type.archive_format() else {
            return Err(FetchError::NotAnArchive {
                coordinate: coordinate.to_string(),
                kind: artifact_type.to_string(),
            });
        };

        let archive = self.locate(coordinate)?;
        extract(format, &archive, destination_dir, overwrite)?;
        Ok(destination_dir.to_path_buf())
    }
}
