//! Maven 2 repository layout
//!
//! Computes where an artifact lives inside a repository:
//!
//! ```text
//! <group as dirs>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<ext>
//! ```

use crate::coordinate::ArtifactCoordinate;

/// Repository-relative location of an artifact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLayout {
    segments: Vec<String>,
}

impl RepositoryLayout {
    /// Layout for a coordinate
    #[must_use]
    pub fn for_coordinate(coordinate: &ArtifactCoordinate) -> Self {
        let artifact_type = coordinate.artifact_type();
        let classifier = if coordinate.classifier().is_empty() {
            artifact_type.implied_classifier().unwrap_or("")
        } else {
            coordinate.classifier()
        };

        let mut file_name = format!("{}-{}", coordinate.artifact(), coordinate.version());
        if !classifier.is_empty() {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(artifact_type.extension());

        let mut segments: Vec<String> = coordinate
            .group()
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        segments.push(coordinate.artifact().to_string());
        segments.push(coordinate.version().to_string());
        segments.push(file_name);

        Self { segments }
    }

    /// Path segments from the repository root
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Artifact file name
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// `/`-joined relative path, as used in repository URLs
    #[inline]
    #[must_use]
    pub fn relative_url(&self) -> String {
        self.segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(reference: &str) -> RepositoryLayout {
        RepositoryLayout::for_coordinate(&ArtifactCoordinate::parse(reference).unwrap())
    }

    #[test]
    fn dita_topic() {
        let l = layout("m2:com.acme:guide:1.0:dita");
        assert_eq!(l.relative_url(), "com/acme/guide/1.0/guide-1.0.dita");
        assert_eq!(l.file_name(), "guide-1.0.dita");
    }

    #[test]
    fn classifier_and_archive() {
        let l = layout("m2:com.acme:bundle:2.3:topics:zip:docs/page1.dita");
        assert_eq!(l.relative_url(), "com/acme/bundle/2.3/bundle-2.3-topics.zip");
    }

    #[test]
    fn default_type_is_jar() {
        let l = layout("m2:org.example:lib:0.1");
        assert_eq!(l.file_name(), "lib-0.1.jar");
    }

    #[test]
    fn implied_classifier() {
        let l = layout("m2:org.example:lib:0.1::test-jar:a.dita");
        assert_eq!(l.file_name(), "lib-0.1-tests.jar");
    }
}
