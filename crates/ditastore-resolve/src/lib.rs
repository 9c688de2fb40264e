//! ditastore Reference Resolution
//!
//! Turns a parsed `m2:` coordinate into a local file.
//!
//! # Core Concepts
//!
//! - [`StrategySelector`]: Picks [`ResolutionStrategy`] and destination paths
//! - [`ResolutionRequest`]: Everything a fetcher needs for one coordinate
//! - [`ArtifactFetcher`]: Repository client boundary (retrieve or extract)
//! - [`fetch`]: Runs a request against a fetcher and probes the result
//! - [`MavenRepository`]: Local repository with optional remote fallbacks
//!
//! # Example
//!
//! ```rust,no_run
//! use ditastore_artifact::ArtifactCoordinate;
//! use ditastore_resolve::{fetch, MavenRepository, StrategySelector};
//!
//! let coord = ArtifactCoordinate::parse("m2:com.acme:guide:1.0:dita").unwrap();
//! let request = StrategySelector::new("target/dita-topics").select(&coord).unwrap();
//! request.prepare_destination().unwrap();
//!
//! let repo = MavenRepository::new("/home/me/.m2/repository");
//! let path = fetch(&repo, &request).unwrap().into_verified().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod fetcher;
mod repository;
mod strategy;

// Re-exports
pub use error::{FetchError, ResolveError};
pub use fetcher::{fetch, ArtifactFetcher, ResolutionResult};
pub use repository::{extract, ExtractStats, MavenRepository, RemoteRepository, DEFAULT_TIMEOUT};
pub use strategy::{ResolutionRequest, ResolutionStrategy, StrategySelector};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use ditastore_artifact::ArtifactCoordinate;
    use std::fs;

    #[test]
    fn select_and_fetch_from_local_repository() {
        let repo_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifact = repo_dir.path().join("com/acme/guide/1.0/guide-1.0.dita");
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, "<topic id=\"guide\"/>").unwrap();

        let coord = ArtifactCoordinate::parse("m2:com.acme:guide:1.0:dita").unwrap();
        let request = StrategySelector::new(out.path()).select(&coord).unwrap();
        request.prepare_destination().unwrap();

        let repo = MavenRepository::new(repo_dir.path());
        let path = fetch(&repo, &request).unwrap().into_verified().unwrap();
        assert_eq!(path, request.expected_path());
        assert_eq!(fs::read_to_string(path).unwrap(), "<topic id=\"guide\"/>");
    }

    #[test]
    fn missing_artifact_is_fetch_failure() {
        let repo_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        let coord = ArtifactCoordinate::parse("m2:com.acme:bundle:2.3::zip:docs/page1.dita").unwrap();
        let request = StrategySelector::new(out.path()).select(&coord).unwrap();
        let err = fetch(&MavenRepository::new(repo_dir.path()), &request).unwrap_err();
        assert!(matches!(err, ResolveError::FetchFailure(FetchError::NotFound { .. })));
    }
}
