//! Testing utilities for ditastore workspace
//!
//! Shared test helpers, fixtures, and fetchers.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use ditastore_artifact::{ArtifactCoordinate, RepositoryLayout};
use ditastore_resolve::{ArtifactFetcher, FetchError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Topic body written by fixtures
pub const TOPIC_BODY: &str = "<topic id=\"t\"><title>T</title></topic>";

/// Call seen by a [`RecordingFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Retrieve { coordinate: String, file: PathBuf },
    Extract { coordinate: String, directory: PathBuf },
}

/// Fetcher that writes placeholder files and records every call
///
/// `fail_on(n)` makes the n-th call (1-based) fail; `skip_writes()` returns
/// success without producing files.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    calls: Mutex<Vec<FetchCall>>,
    fail_on: Option<usize>,
    skip_writes: bool,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn fail_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    #[must_use]
    pub fn skip_writes(mut self) -> Self {
        self.skip_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: FetchCall) -> Result<(), FetchError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        if self.fail_on == Some(calls.len()) {
            return Err(FetchError::Other(format!("injected failure on call {}", calls.len())));
        }
        Ok(())
    }
}

impl ArtifactFetcher for RecordingFetcher {
    fn retrieve_whole(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        destination_file_name: &str,
        _overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        let file = destination_dir.join(destination_file_name);
        self.record(FetchCall::Retrieve {
            coordinate: coordinate.to_string(),
            file: file.clone(),
        })?;
        if !self.skip_writes {
            fs::write(&file, TOPIC_BODY).map_err(|e| FetchError::io_error(&file, e))?;
        }
        Ok(file)
    }

    fn extract_member(
        &self,
        coordinate: &ArtifactCoordinate,
        destination_dir: &Path,
        _overwrite: bool,
    ) -> Result<PathBuf, FetchError> {
        self.record(FetchCall::Extract {
            coordinate: coordinate.to_string(),
            directory: destination_dir.to_path_buf(),
        })?;
        if !self.skip_writes {
            if let Some(member) = coordinate.internal_path() {
                let file = destination_dir.join(member);
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent).map_err(|e| FetchError::io_error(parent, e))?;
                }
                fs::write(&file, TOPIC_BODY).map_err(|e| FetchError::io_error(&file, e))?;
            }
        }
        Ok(destination_dir.to_path_buf())
    }
}

/// Map document with one `topicref` per href
pub fn map_with_hrefs(hrefs: &[&str]) -> String {
    let mut map = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE map PUBLIC \"-//OASIS//DTD DITA Map//EN\" \"map.dtd\">\n\
         <map>\n  <title>Fixture</title>\n",
    );
    for href in hrefs {
        map.push_str(&format!("  <topicref href=\"{href}\"/>\n"));
    }
    map.push_str("</map>\n");
    map
}

/// Write a map into `dir` and return its path
pub fn write_map(dir: &Path, name: &str, hrefs: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, map_with_hrefs(hrefs)).unwrap();
    path
}

/// Scratch local Maven repository
pub struct LocalRepoFixture {
    dir: tempfile::TempDir,
}

impl LocalRepoFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path an artifact occupies in this repository
    pub fn artifact_path(&self, reference: &str) -> PathBuf {
        let coordinate = ArtifactCoordinate::parse(reference).unwrap();
        let layout = RepositoryLayout::for_coordinate(&coordinate);
        layout
            .segments()
            .iter()
            .fold(self.root().to_path_buf(), |path, segment| path.join(segment))
    }

    /// Install a single-file artifact
    pub fn install_file(&self, reference: &str, body: &str) -> PathBuf {
        let path = self.artifact_path(reference);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    /// Install a zip-family artifact with the given members
    pub fn install_zip(&self, reference: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = self.artifact_path(reference);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        for (name, body) in members {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    /// Install a tar artifact with the given members
    pub fn install_tar(&self, reference: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = self.artifact_path(reference);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut builder = tar::Builder::new(fs::File::create(&path).unwrap());
        for (name, body) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, body.as_bytes()).unwrap();
        }
        builder.finish().unwrap();
        path
    }
}

impl Default for LocalRepoFixture {
    fn default() -> Self {
        Self::new()
    }
}
