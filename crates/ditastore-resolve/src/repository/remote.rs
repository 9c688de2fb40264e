//! Remote Maven repositories
//!
//! Downloads artifacts over HTTP(S) into the local repository with a blocking
//! `ureq` agent.

use crate::error::FetchError;
use ditastore_artifact::RepositoryLayout;
use std::path::Path;
use std::time::Duration;

/// Default timeout for a single download
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote repository base URL
#[derive(Debug, Clone)]
pub struct RemoteRepository {
    base_url: String,
    timeout: Duration,
}

impl RemoteRepository {
    /// Create remote repository from base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set download timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without trailing slash
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an artifact
    #[must_use]
    pub fn url_for(&self, layout: &RepositoryLayout) -> String {
        format!("{}/{}", self.base_url, layout.relative_url())
    }

    /// Download an artifact to `target`
    ///
    /// The body goes to a temporary file next to `target` and is renamed
    /// into place once complete. A failed transfer leaves nothing behind.
    ///
    /// # Errors
    /// Returns [`FetchError::Download`] for HTTP failures and
    /// [`FetchError::Io`] when the file cannot be written
    #[cfg(feature = "remote")]
    pub fn download(&self, layout: &RepositoryLayout, target: &Path) -> Result<(), FetchError> {
        let url = self.url_for(layout);
        tracing::info!(url = %url, "Downloading artifact");

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);

        let mut response = agent.get(&url).call().map_err(|e| FetchError::Download {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| FetchError::io_error(parent, e))?;
        let mut partial = tempfile::Builder::new()
            .suffix(".part")
            .tempfile_in(parent)
            .map_err(|e| FetchError::io_error(parent, e))?;

        let mut body = response.body_mut().as_reader();
        if let Err(e) = std::io::copy(&mut body, partial.as_file_mut()) {
            return Err(FetchError::Download {
                url,
                message: format!("failed to read response: {e}"),
            });
        }

        partial
            .persist(target)
            .map(drop)
            .map_err(|e| FetchError::io_error(target, e.error))
    }

    /// Download an artifact to `target`
    ///
    /// # Errors
    /// Always fails: built without the `remote` feature
    #[cfg(not(feature = "remote"))]
    pub fn download(&self, layout: &RepositoryLayout, _target: &Path) -> Result<(), FetchError> {
        Err(FetchError::Download {
            url: self.url_for(layout),
            message: "remote repositories require the 'remote' feature".to_string(),
        })
    }
}
