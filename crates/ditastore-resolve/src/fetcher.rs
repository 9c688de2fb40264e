//! Repository client boundary
//!
//! Provides the [`ArtifactFetcher`] trait implemented by repository clients
//! and [`fetch`], which runs a [`ResolutionRequest`] against one.

use crate::error::{FetchError, ResolveError};
use crate::strategy::{ResolutionRequest, ResolutionStrategy};
use ditastore_artifact::ArtifactCoordinate;
use std::path::{Path, PathBuf};

/// Repository client performing the actual retrieval or extraction
///
/// Both operations block until done and report failure through
/// [`FetchError`], never through a sentinel value.
///
/// # Overwrite
/// - `true`: always refresh the destination
/// - `false`: existing destination content is left in place
pub trait ArtifactFetcher {
    /// Copy the artifact file to `destination_dir/destination_file_name`
    ///
    /// # Returns
    /// Path of the file produced
    fn retrieve_whole(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        destination_file_name: &str,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError>;

    /// Unpack the artifact archive into `destination_dir`
    ///
    /// # Returns
    /// Directory the archive was unpacked into; members are addressed
    /// relative to it
    fn extract_member(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError>;
}

impl<T: ArtifactFetcher + ?Sized> ArtifactFetcher for &T {
    fn retrieve_whole(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        destination_file_name: &str,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        (**self).retrieve_whole(coordinate, destination_dir, destination_file_name, overwrite)
    }

    fn extract_member(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        (**self).extract_member(coordinate, destination_dir, overwrite)
    }
}

impl<T: ArtifactFetcher + ?Sized> ArtifactFetcher for Box<T> {
    fn retrieve_whole(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        destination_file_name: &str,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        (**self).retrieve_whole(coordinate, destination_dir, destination_file_name, overwrite)
    }

    fn extract_member(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        (**self).extract_member(coordinate, destination_dir, overwrite)
    }
}

/// Outcome of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Local path the reference resolved to
    pub resolved_path: PathBuf,
    /// Whether that path exists as a file
    pub found: bool,
}

impl ResolutionResult {
    /// Build result by checking the filesystem
    #[must_use]
    pub fn probe(resolved_path: PathBuf) -> Self {
        let found = resolved_path.is_file();
        Self {
            resolved_path,
            found,
        }
    }

    /// Path of a file that exists
    ///
    /// # Errors
    /// Returns [`ResolveError::ResolvedFileMissing`] if nothing was found
    pub fn into_verified(self) -> Result<PathBuf, ResolveError> {
        if self.found {
            Ok(self.resolved_path)
        } else {
            Err(ResolveError::ResolvedFileMissing(self.resolved_path))
        }
    }
}

/// Run a request against a fetcher
///
/// # Errors
/// Returns [`ResolveError::FetchFailure`] if the fetcher fails. A missing
/// result file is *not* an error here; see [`ResolutionResult::into_verified`].
pub fn fetch<F>(fetcher: &F, request: &ResolutionRequest) -> Result<ResolutionResult, ResolveError>
where
    F: ArtifactFetcher + ?Sized,
{
    let coordinate = request.coordinate();
    let resolved_path = match (request.strategy(), request.file_name(), request.member()) {
        (ResolutionStrategy::RetrieveWhole, Some(file_name), _) => fetcher.retrieve_whole(
            coordinate,
            request.output_directory(),
            file_name,
            request.overwrite_existing(),
        )?,
        (ResolutionStrategy::ExtractMember, _, Some(member)) => {
            let directory = fetcher.extract_member(
                coordinate,
                request.output_directory(),
                request.overwrite_existing(),
            )?;
            member.resolve_under(&directory)
        }
        (strategy, _, _) => {
            return Err(ResolveError::invariant(
                coordinate,
                format!("request for {strategy} lacks its destination"),
            ))
        }
    };

    Ok(ResolutionResult::probe(resolved_path))
}
