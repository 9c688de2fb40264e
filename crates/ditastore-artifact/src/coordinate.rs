//! `m2:` artifact coordinates
//!
//! Provides [`ArtifactCoordinate`], the parsed form of an `m2:` reference:
//!
//! ```text
//! m2:<group>:<artifact>:<version>[:<classifier>[:<type>[:<internalPath>]]]
//! ```
//!
//! Optional fields are assigned from the token count, not from a running
//! threshold, using the following table:
//!
//! | tokens | classifier | type    | internal path             |
//! |--------|------------|---------|---------------------------|
//! | 4      | empty      | empty   | absent                    |
//! | 5      | empty      | token 4 | absent                    |
//! | 6      | token 4    | token 5 | absent                    |
//! | 7      | token 4    | token 5 | token 6                   |
//! | 8+     | token 4    | token 5 | tokens 6.. joined by `:`  |

use crate::artifact_type::ArtifactType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Scheme literal of artifact references
pub const SCHEME: &str = "m2";

/// Prefix every artifact reference starts with
pub const SCHEME_PREFIX: &str = "m2:";

/// Minimum number of `:`-separated tokens (scheme, group, artifact, version)
pub const MIN_TOKENS: usize = 4;

/// Optional-field assignment for a given token count
///
/// Indices point into the token list. `path_from` marks the first token of
/// the internal path; everything from there on belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldLayout {
    classifier: Option<usize>,
    kind: Option<usize>,
    path_from: Option<usize>,
}

impl FieldLayout {
    /// Field layout for `count` tokens (`count >= MIN_TOKENS`)
    const fn for_token_count(count: usize) -> Self {
        match count {
            0..=4 => Self {
                classifier: None,
                kind: None,
                path_from: None,
            },
            5 => Self {
                classifier: None,
                kind: Some(4),
                path_from: None,
            },
            6 => Self {
                classifier: Some(4),
                kind: Some(5),
                path_from: None,
            },
            _ => Self {
                classifier: Some(4),
                kind: Some(5),
                path_from: Some(6),
            },
        }
    }
}

/// Parsed artifact coordinate
///
/// # Invariants
/// - `group`, `artifact` and `version` are non-empty
/// - `internal_path`, when present, is non-empty
///
/// Whether the internal path is *required* depends on the artifact type and
/// is checked by the resolution strategy, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    group: String,
    artifact: String,
    version: String,
    classifier: String,
    #[serde(rename = "type")]
    kind: String,
    internal_path: Option<String>,
}

impl ArtifactCoordinate {
    /// Create a coordinate with empty classifier and type
    ///
    /// # Errors
    /// Returns [`CoordinateError::Malformed`] if any of the required fields
    /// is empty.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, CoordinateError> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: String::new(),
            kind: String::new(),
            internal_path: None,
        };
        coordinate.check_required()?;
        Ok(coordinate)
    }

    /// Set the classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Set the artifact type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the internal (archive member) path; empty means absent
    #[inline]
    #[must_use]
    pub fn with_internal_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.internal_path = (!path.is_empty()).then_some(path);
        self
    }

    /// Parse an `m2:` reference
    ///
    /// # Errors
    /// - [`CoordinateError::UnsupportedScheme`] if the scheme is not `m2`
    /// - [`CoordinateError::Malformed`] if fewer than four tokens are present
    ///   or group/artifact/version is empty
    pub fn parse(reference: &str) -> Result<Self, CoordinateError> {
        let tokens: Vec<&str> = reference.split(':').collect();

        if tokens[0] != SCHEME {
            return Err(CoordinateError::UnsupportedScheme {
                scheme: tokens[0].to_string(),
            });
        }

        if tokens.len() < MIN_TOKENS {
            return Err(CoordinateError::Malformed {
                reference: reference.to_string(),
                reason: format!(
                    "expected at least {MIN_TOKENS} ':'-separated tokens, found {}",
                    tokens.len()
                ),
            });
        }

        let layout = FieldLayout::for_token_count(tokens.len());
        let token = |index: Option<usize>| index.map_or("", |i| tokens[i]);

        let coordinate = Self {
            group: tokens[1].to_string(),
            artifact: tokens[2].to_string(),
            version: tokens[3].to_string(),
            classifier: token(layout.classifier).to_string(),
            kind: token(layout.kind).to_string(),
            internal_path: layout
                .path_from
                .map(|from| tokens[from..].join(":"))
                .filter(|path| !path.is_empty()),
        };

        coordinate.check_required().map_err(|_| CoordinateError::Malformed {
            reference: reference.to_string(),
            reason: "group, artifact and version must not be empty".to_string(),
        })?;

        Ok(coordinate)
    }

    /// Check whether a raw attribute value uses the artifact scheme
    #[inline]
    #[must_use]
    pub fn is_artifact_reference(value: &str) -> bool {
        value.starts_with(SCHEME_PREFIX)
    }

    fn check_required(&self) -> Result<(), CoordinateError> {
        for (field, value) in [
            ("group", &self.group),
            ("artifact", &self.artifact),
            ("version", &self.version),
        ] {
            if value.is_empty() {
                return Err(CoordinateError::Malformed {
                    reference: self.to_string(),
                    reason: format!("{field} must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// Group id
    #[inline]
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Artifact id
    #[inline]
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Version
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Classifier (empty when not given)
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Declared artifact type (empty when not given)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Artifact type with its repository handling
    #[inline]
    #[must_use]
    pub fn artifact_type(&self) -> ArtifactType {
        ArtifactType::from(self.kind.as_str())
    }

    /// Internal archive member path, if any
    #[inline]
    #[must_use]
    pub fn internal_path(&self) -> Option<&str> {
        self.internal_path.as_deref()
    }
}

impl Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}:{}:{}:{}", self.group, self.artifact, self.version)?;
        match (&self.internal_path, self.classifier.is_empty(), self.kind.is_empty()) {
            (Some(path), _, _) => write!(f, ":{}:{}:{path}", self.classifier, self.kind),
            (None, true, true) => Ok(()),
            (None, true, false) => write!(f, ":{}", self.kind),
            (None, false, _) => write!(f, ":{}:{}", self.classifier, self.kind),
        }
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors produced while parsing an `m2:` reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// Reference does not use the artifact scheme
    #[error("unsupported reference scheme '{scheme}' (expected '{SCHEME}')")]
    UnsupportedScheme { scheme: String },

    /// Not enough tokens or an empty required field
    #[error("malformed artifact reference '{reference}': {reason}")]
    Malformed { reference: String, reason: String },
}
