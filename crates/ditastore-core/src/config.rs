//! Pull-topics configuration
//!
//! [`PullTopicsConfig`] can be built in code, loaded from TOML, or assembled
//! by the CLI from flags layered over a file.
//!
//! ```toml
//! map-file = "src/guide.ditamap"
//! output-directory = "target"
//! overwrite = true
//! remote-repositories = ["https://repo.maven.apache.org/maven2"]
//! ```

use ditastore_map::{ReferenceScanner, DEFAULT_ELEMENTS};
use ditastore_resolve::{MavenRepository, RemoteRepository, StrategySelector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default output directory
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "target";

/// Topics directory name below the output directory
pub const DEFAULT_TOPICS_DIRECTORY: &str = "dita-topics";

/// Errors in configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is out of range or missing
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one pull-topics run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PullTopicsConfig {
    /// Map document to process
    pub map_file: PathBuf,
    /// Directory receiving the rewritten map
    pub output_directory: PathBuf,
    /// Directory receiving resolved topics; `<output>/dita-topics` if unset
    pub topics_directory: Option<PathBuf>,
    /// Refresh files that already exist
    pub overwrite: bool,
    /// Local Maven repository; `$HOME/.m2/repository` if unset
    pub local_repository: Option<PathBuf>,
    /// Remote repository base URLs, tried in order
    pub remote_repositories: Vec<String>,
    /// Per-download timeout
    pub http_timeout_secs: u64,
    /// Element local names scanned for references
    pub reference_elements: Vec<String>,
    /// Also scan `map/topicref` specializations
    pub match_specializations: bool,
}

impl Default for PullTopicsConfig {
    fn default() -> Self {
        Self {
            map_file: PathBuf::new(),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            topics_directory: None,
            overwrite: true,
            local_repository: None,
            remote_repositories: Vec::new(),
            http_timeout_secs: ditastore_resolve::DEFAULT_TIMEOUT.as_secs(),
            reference_elements: DEFAULT_ELEMENTS.iter().map(|s| (*s).to_string()).collect(),
            match_specializations: true,
        }
    }
}

impl PullTopicsConfig {
    /// Configuration for a map file with defaults elsewhere
    #[must_use]
    pub fn new(map_file: impl Into<PathBuf>) -> Self {
        Self {
            map_file: map_file.into(),
            ..Self::default()
        }
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    /// With topics directory
    #[inline]
    #[must_use]
    pub fn with_topics_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.topics_directory = Some(dir.into());
        self
    }

    /// With overwrite flag
    #[inline]
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// With local repository root
    #[inline]
    #[must_use]
    pub fn with_local_repository(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_repository = Some(dir.into());
        self
    }

    /// Append a remote repository
    #[inline]
    #[must_use]
    pub fn with_remote_repository(mut self, url: impl Into<String>) -> Self {
        self.remote_repositories.push(url.into());
        self
    }

    /// With download timeout
    #[inline]
    #[must_use]
    pub fn with_http_timeout_secs(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    /// With scanned element names
    #[must_use]
    pub fn with_reference_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// With specialization matching
    #[inline]
    #[must_use]
    pub fn with_match_specializations(mut self, enabled: bool) -> Self {
        self.match_specializations = enabled;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Toml`] for syntax or schema errors
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Toml`] if it does not parse
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values before a run
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("map file is required".to_string()));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output directory must not be empty".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid("http timeout must be greater than zero".to_string()));
        }
        if self.reference_elements.is_empty() && !self.match_specializations {
            return Err(ConfigError::Invalid(
                "no reference elements configured and specialization matching is off".to_string(),
            ));
        }
        if let Some(url) = self
            .remote_repositories
            .iter()
            .find(|u| !(u.starts_with("http://") || u.starts_with("https://")))
        {
            return Err(ConfigError::Invalid(format!("remote repository '{url}' is not an http(s) URL")));
        }
        Ok(())
    }

    /// Topics directory as an absolute path
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the working directory is unknown
    pub fn resolved_topics_directory(&self) -> Result<PathBuf, ConfigError> {
        let dir = self
            .topics_directory
            .clone()
            .unwrap_or_else(|| self.output_directory.join(DEFAULT_TOPICS_DIRECTORY));
        if dir.is_absolute() {
            return Ok(dir);
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .map_err(|e| ConfigError::Invalid(format!("cannot determine working directory: {e}")))
    }

    /// Strategy selector for this configuration
    ///
    /// # Errors
    /// See [`Self::resolved_topics_directory`]
    pub fn selector(&self) -> Result<StrategySelector, ConfigError> {
        Ok(StrategySelector::new(self.resolved_topics_directory()?).with_overwrite(self.overwrite))
    }

    /// Reference scanner for this configuration
    #[must_use]
    pub fn scanner(&self) -> ReferenceScanner {
        ReferenceScanner::new(self.reference_elements.iter().cloned())
            .with_specializations(self.match_specializations)
    }

    /// Repository client for this configuration
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if no local repository is configured
    /// and no home directory is known
    pub fn repository(&self) -> Result<MavenRepository, ConfigError> {
        let root = match &self.local_repository {
            Some(root) => root.clone(),
            None => MavenRepository::default_local_root().ok_or_else(|| {
                ConfigError::Invalid("no local repository configured and no home directory".to_string())
            })?,
        };

        let timeout = Duration::from_secs(self.http_timeout_secs);
        Ok(self
            .remote_repositories
            .iter()
            .fold(MavenRepository::new(root), |repo, url| {
                repo.with_remote(RemoteRepository::new(url.as_str()).with_timeout(timeout))
            }))
    }
}
