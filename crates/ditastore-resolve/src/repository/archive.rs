//! Archive extraction
//!
//! Unpacks zip-family and tar archives into a destination directory. Entries
//! whose names would land outside the destination are skipped.

use crate::error::FetchError;
use ditastore_artifact::{ArchiveFormat, MemberPath};
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Counts of what an extraction did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Files written
    pub written: usize,
    /// Files left alone because they existed and overwrite was off
    pub kept: usize,
    /// Entries ignored because their name was unsafe
    pub rejected: usize,
}

/// Unpack `archive` into `destination`
///
/// # Errors
/// Returns [`FetchError::Archive`] for unreadable archives and
/// [`FetchError::Io`] for filesystem failures
pub fn extract(
    format: ArchiveFormat,
    archive: &Path,
    destination: &Path,
    overwrite: bool,
) -> Result<ExtractStats, FetchError> {
    fs::create_dir_all(destination).map_err(|e| FetchError::io_error(destination, e))?;
    let file = File::open(archive).map_err(|e| FetchError::io_error(archive, e))?;

    let stats = match format {
        ArchiveFormat::Zip => extract_zip(file, archive, destination, overwrite)?,
        ArchiveFormat::Tar => extract_tar(file, archive, destination, overwrite)?,
    };

    tracing::debug!(
        archive = %archive.display(),
        destination = %destination.display(),
        written = stats.written,
        kept = stats.kept,
        rejected = stats.rejected,
        "Extracted archive"
    );
    Ok(stats)
}

fn extract_zip(
    file: File,
    archive: &Path,
    destination: &Path,
    overwrite: bool,
) -> Result<ExtractStats, FetchError> {
    let mut zip = zip::ZipArchive::new(file).map_err(|e| FetchError::archive(archive, e))?;
    let mut stats = ExtractStats::default();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| FetchError::archive(archive, e))?;
        let Some(member) = safe_member(entry.name()) else {
            tracing::warn!(entry = entry.name(), archive = %archive.display(), "Skipping unsafe archive entry");
            stats.rejected += 1;
            continue;
        };

        let target = member.resolve_under(destination);
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| FetchError::io_error(&target, e))?;
            continue;
        }
        if !overwrite && target.exists() {
            stats.kept += 1;
            continue;
        }

        write_entry(&mut entry, &target)?;
        stats.written += 1;
    }
    Ok(stats)
}

fn extract_tar(
    file: File,
    archive: &Path,
    destination: &Path,
    overwrite: bool,
) -> Result<ExtractStats, FetchError> {
    let mut tar = tar::Archive::new(file);
    let mut stats = ExtractStats::default();

    let entries = tar.entries().map_err(|e| FetchError::archive(archive, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| FetchError::archive(archive, e))?;
        let name = entry
            .path()
            .map_err(|e| FetchError::archive(archive, e))?
            .to_string_lossy()
            .into_owned();
        let Some(member) = safe_member(&name) else {
            tracing::warn!(entry = %name, archive = %archive.display(), "Skipping unsafe archive entry");
            stats.rejected += 1;
            continue;
        };

        let target = member.resolve_under(destination);
        let kind = entry.header().entry_type();
        match kind {
            tar::EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| FetchError::io_error(&target, e))?;
            }
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                if !overwrite && target.exists() {
                    stats.kept += 1;
                    continue;
                }
                write_entry(&mut entry, &target)?;
                stats.written += 1;
            }
            other => {
                tracing::debug!(entry = %name, kind = ?other, "Ignoring non-file archive entry");
            }
        }
    }
    Ok(stats)
}

fn safe_member(name: &str) -> Option<MemberPath> {
    name.parse().ok()
}

fn write_entry(reader: &mut impl io::Read, target: &Path) -> Result<(), FetchError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| FetchError::io_error(parent, e))?;
    }
    let mut out = File::create(target).map_err(|e| FetchError::io_error(target, e))?;
    io::copy(reader, &mut out).map_err(|e| FetchError::io_error(target, e))?;
    Ok(())
}
