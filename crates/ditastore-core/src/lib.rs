//! ditastore Core - Pull-topics pipeline
//!
//! Rewrites the `m2:` references of a DITA map into local topic paths:
//! - Scans the map for `m2:` topic references
//! - Resolves each one through a repository client
//! - Replaces the `href` with the resolved absolute path
//! - Writes the rewritten map to the output directory
//!
//! # Example
//!
//! ```rust,no_run
//! use ditastore_core::{pull_topics, PullTopicsConfig};
//!
//! let config = PullTopicsConfig::new("src/guide.ditamap")
//!     .with_output_directory("target")
//!     .with_local_repository("/home/me/.m2/repository");
//!
//! let report = pull_topics(&config).unwrap();
//! println!("Resolved {} references into {}", report.references.len(), report.output_file.display());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod pipeline;

// Re-exports for convenience
pub use config::{ConfigError, PullTopicsConfig, DEFAULT_OUTPUT_DIRECTORY, DEFAULT_TOPICS_DIRECTORY};
pub use error::{ErrorKind, PipelineError, PipelineResult, ReferenceError};
pub use pipeline::{
    allowed_transitions, plan_references, plan_topics, pull_topics, validate_transition, PipelineState, PlannedReference,
    ResolvedReference, RewriteOrchestrator, RewriteReport,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ditastore Core
    pub use crate::{pull_topics, PipelineError, PullTopicsConfig, RewriteOrchestrator, RewriteReport};
    pub use ditastore_map::{MapDocument, ReferenceScanner};
    pub use ditastore_resolve::{ArtifactFetcher, MavenRepository, StrategySelector};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use ditastore_test_utils::{write_map, LocalRepoFixture};

    #[test]
    fn pull_topics_from_config() {
        let repo = LocalRepoFixture::new();
        repo.install_file("m2:com.acme:guide:1.0:dita", "<topic id=\"guide\"/>");
        let work = tempfile::tempdir().unwrap();
        let map = write_map(work.path(), "guide.ditamap", &["m2:com.acme:guide:1.0:dita"]);

        let config = PullTopicsConfig::new(&map)
            .with_output_directory(work.path().join("target"))
            .with_local_repository(repo.root());
        let report = pull_topics(&config).unwrap();

        assert_eq!(report.output_file, work.path().join("target/guide.ditamap"));
        assert_eq!(
            report.references[0].path,
            work.path().join("target/dita-topics/com.acme/guide.dita")
        );
    }

    #[test]
    fn invalid_config_is_reported() {
        let err = pull_topics(&PullTopicsConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
