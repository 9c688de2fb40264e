//! Artifact types
//!
//! Maps the declared `type` of a coordinate to how the repository stores it
//! (file extension) and how it is consumed (single document or archive).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Type name of single-document DITA topics
pub const DITA_TYPE: &str = "dita";

/// Archive container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Zip container (zip, jar, war, ear, ...)
    Zip,
    /// Uncompressed tarball
    Tar,
}

/// Declared artifact type
///
/// Wraps the raw `type` token. Known Maven packaging types map to their
/// on-disk extension the way Maven's artifact handlers do; unknown types use
/// the type name itself as the extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactType(String);

impl ArtifactType {
    /// Create from a raw type token
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Raw type name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the artifact is a single DITA document retrieved as-is
    #[inline]
    #[must_use]
    pub fn is_single_document(&self) -> bool {
        self.0 == DITA_TYPE
    }

    /// File extension used by the repository layout
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.0.as_str() {
            "" | "jar" | "bundle" | "ejb" | "ejb-client" | "maven-plugin" | "test-jar"
            | "java-source" | "javadoc" => "jar",
            other => other,
        }
    }

    /// Archive format, if artifacts of this type are archives
    #[must_use]
    pub fn archive_format(&self) -> Option<ArchiveFormat> {
        match self.extension() {
            "zip" | "jar" | "war" | "ear" | "rar" | "aar" => Some(ArchiveFormat::Zip),
            "tar" => Some(ArchiveFormat::Tar),
            _ => None,
        }
    }

    /// Classifier Maven implies for this type when none is given
    #[must_use]
    pub fn implied_classifier(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "test-jar" => Some("tests"),
            "java-source" => Some("sources"),
            "javadoc" => Some("javadoc"),
            "ejb-client" => Some("client"),
            _ => None,
        }
    }
}

impl From<&str> for ArtifactType {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl Display for ArtifactType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
