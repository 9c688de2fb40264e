//! ditastore Artifact Model
//!
//! Typed `m2:` artifact coordinates and the repository conventions around them.
//!
//! # Core Concepts
//!
//! - [`ArtifactCoordinate`]: Parsed `m2:<group>:<artifact>:<version>[...]` reference
//! - [`ArtifactType`]: Declared type with Maven extension and archive handling
//! - [`MemberPath`]: Relative path that cannot escape its base directory
//! - [`RepositoryLayout`]: Maven 2 location of an artifact file
//! - [`ContentHash`]: 32-byte Blake3 digest of resolved content
//!
//! # Example
//!
//! ```rust
//! use ditastore_artifact::ArtifactCoordinate;
//!
//! let coord = ArtifactCoordinate::parse("m2:com.acme:bundle:2.3::zip:docs/page1.dita").unwrap();
//! assert_eq!(coord.kind(), "zip");
//! assert_eq!(coord.internal_path(), Some("docs/page1.dita"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod artifact_type;
mod coordinate;
mod hash;
mod layout;
mod path;

// Re-exports
pub use artifact_type::{ArchiveFormat, ArtifactType, DITA_TYPE};
pub use coordinate::{ArtifactCoordinate, CoordinateError, MIN_TOKENS, SCHEME, SCHEME_PREFIX};
pub use hash::{ContentHash, HashError};
pub use layout::RepositoryLayout;
pub use path::{validate_segment, MemberPath, PathError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn coordinate_to_member_path() {
        let coord = ArtifactCoordinate::parse("m2:com.acme:bundle:2.3::zip:docs/page1.dita").unwrap();
        let member: MemberPath = coord.internal_path().unwrap().parse().unwrap();
        assert_eq!(
            member.resolve_under(Path::new("/out/topics")),
            Path::new("/out/topics/docs/page1.dita")
        );
        assert_eq!(coord.artifact_type().archive_format(), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn coordinate_to_layout() {
        let coord = ArtifactCoordinate::parse("m2:com.acme:guide:1.0:dita").unwrap();
        assert!(coord.artifact_type().is_single_document());
        let layout = RepositoryLayout::for_coordinate(&coord);
        assert_eq!(layout.segments().len(), 5);
    }
}
