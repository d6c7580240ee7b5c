// crates/geofield-core/src/store/mod.rs

//! # Dataset Store
//!
//! Maps a dataset identifier to a local directory holding the unpacked
//! dataset, fetching and unpacking the archive first when it is missing.
//!
//! On-disk layout of [`DiskStore`]:
//!
//! ```text
//! <data_dir>/
//!   geoids-egm96-5/
//!     manifest.json
//!     geoids/egm96-5.pgm ...
//!   gravity-egm96/
//!     manifest.json
//!     gravity/egm96.egm ...
//! ```

use crate::config::StoreConfig;
use crate::error::{GeoFieldError, Result};
use crate::keys::DatasetRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

mod archive;
mod fetch;

pub use archive::extract_zip;
pub use fetch::ArchiveSource;
#[cfg(feature = "download")]
pub use fetch::HttpSource;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Locates unpacked datasets.
pub trait DatasetStore: Send + Sync {
    /// Returns the root directory of the unpacked dataset, fetching it if
    /// needed. Failures are reported as
    /// [`DatasetUnavailable`](GeoFieldError::DatasetUnavailable) and are not
    /// remembered: the next call tries again.
    fn locate(&self, dataset: &DatasetRef) -> Result<PathBuf>;
}

/// Written next to an unpacked dataset once it is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub dataset: String,
    pub url: String,
    /// Hex SHA-256 of the archive the dataset was unpacked from.
    pub sha256: String,
    /// Seconds since the Unix epoch.
    pub fetched_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    Missing,
    /// A directory exists but has no valid manifest or lacks the model directory.
    Incomplete,
    Present(Manifest),
}

impl DatasetStatus {
    pub fn is_present(&self) -> bool {
        matches!(self, DatasetStatus::Present(_))
    }
}

/// Filesystem-backed store under [`StoreConfig::data_dir`].
pub struct DiskStore {
    config: StoreConfig,
    source: Option<Box<dyn ArchiveSource>>,
}

impl DiskStore {
    pub fn new(config: StoreConfig) -> Self {
        let source = if config.offline {
            None
        } else {
            default_source()
        };
        Self { config, source }
    }

    pub fn from_env() -> Self {
        Self::new(StoreConfig::from_env())
    }

    /// Replaces the archive source (HTTP by default).
    pub fn with_source(mut self, source: impl ArchiveSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dataset_dir(&self, dataset: &DatasetRef) -> PathBuf {
        self.config.data_dir.join(dataset.id)
    }

    pub fn status(&self, dataset: &DatasetRef) -> DatasetStatus {
        let dir = self.dataset_dir(dataset);
        if !dir.exists() {
            return DatasetStatus::Missing;
        }
        match read_manifest(&dir) {
            Ok(m) if m.dataset == dataset.id && dir.join(dataset.kind.subdir()).is_dir() => {
                DatasetStatus::Present(m)
            }
            _ => DatasetStatus::Incomplete,
        }
    }

    /// Deletes the dataset. Returns `false` if there was nothing to delete.
    pub fn remove(&self, dataset: &DatasetRef) -> Result<bool> {
        let dir = self.dataset_dir(dataset);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).map_err(|e| GeoFieldError::io(&dir, e))?;
        info!(dataset = dataset.id, "removed dataset");
        Ok(true)
    }

    /// Downloads the dataset even if it is present. An installed copy is only
    /// replaced once the new one is complete, so a failed re-fetch keeps it.
    pub fn refetch(&self, dataset: &DatasetRef) -> Result<PathBuf> {
        let source = self.source_for(dataset)?;
        self.install(dataset, source)
            .map_err(|e| retrieval_failed(dataset, e))
    }

    fn source_for(&self, dataset: &DatasetRef) -> Result<&dyn ArchiveSource> {
        if self.config.offline {
            return Err(GeoFieldError::unavailable(dataset.id, "the store is offline"));
        }
        self.source.as_deref().ok_or_else(|| {
            GeoFieldError::unavailable(dataset.id, "no archive source configured")
        })
    }

    fn install(&self, dataset: &DatasetRef, source: &dyn ArchiveSource) -> Result<PathBuf> {
        let url = dataset.archive_url(&self.config.base_url);
        info!(dataset = dataset.id, %url, "fetching dataset");

        let root = &self.config.data_dir;
        fs::create_dir_all(root).map_err(|e| GeoFieldError::io(root, e))?;

        // Download and unpack next to the target so the final rename stays on
        // one filesystem.
        let mut download = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".zip")
            .tempfile_in(root)
            .map_err(|e| GeoFieldError::io(root, e))?;

        let mut sink = HashingWriter::new(download.as_file_mut());
        let size = source
            .fetch(&url, &mut sink)
            .and_then(|n| sink.flush().map(|_| n))
            .map_err(|e| GeoFieldError::unavailable(dataset.id, format!("{url}: {e}")))?;
        let sha256 = sink.finish();

        let file = download.as_file_mut();
        file.seek(SeekFrom::Start(0))
            .map_err(|e| GeoFieldError::io(root, e))?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(root)
            .map_err(|e| GeoFieldError::io(root, e))?;

        let files = extract_zip(dataset.id, BufReader::new(file), staging.path())?;
        if !staging.path().join(dataset.kind.subdir()).is_dir() {
            return Err(GeoFieldError::Archive {
                dataset: dataset.id.to_string(),
                reason: format!("archive has no `{}/` directory", dataset.kind.subdir()),
            });
        }

        let manifest = Manifest {
            dataset: dataset.id.to_string(),
            url,
            sha256,
            fetched_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        let manifest_path = staging.path().join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(&manifest)?;
        fs::write(&manifest_path, json).map_err(|e| GeoFieldError::io(&manifest_path, e))?;

        let target = self.dataset_dir(dataset);
        replace_dir(staging.path(), &target, &root.join(format!(".replaced-{}", dataset.id)))?;

        info!(
            dataset = dataset.id,
            files,
            bytes = size,
            sha256 = %manifest.sha256,
            "dataset installed"
        );
        Ok(target)
    }
}

impl DatasetStore for DiskStore {
    fn locate(&self, dataset: &DatasetRef) -> Result<PathBuf> {
        if self.status(dataset).is_present() {
            let dir = self.dataset_dir(dataset);
            debug!(dataset = dataset.id, path = %dir.display(), "dataset present");
            return Ok(dir);
        }

        let source = self.source_for(dataset)?;
        self.install(dataset, source)
            .map_err(|e| retrieval_failed(dataset, e))
    }
}

/// Nothing of a failed install is kept, so every failure is worth a retry.
fn retrieval_failed(dataset: &DatasetRef, err: GeoFieldError) -> GeoFieldError {
    match err {
        e @ GeoFieldError::DatasetUnavailable { .. } => e,
        other => {
            warn!(dataset = dataset.id, error = %other, "dataset install failed");
            GeoFieldError::unavailable(dataset.id, other)
        }
    }
}

/// Moves `staged` to `target`. An existing `target` is parked at `backup`
/// until the move succeeds and restored if it fails.
fn replace_dir(staged: &Path, target: &Path, backup: &Path) -> Result<()> {
    if !target.exists() {
        return fs::rename(staged, target).map_err(|e| GeoFieldError::io(target, e));
    }

    if backup.exists() {
        fs::remove_dir_all(backup).map_err(|e| GeoFieldError::io(backup, e))?;
    }
    fs::rename(target, backup).map_err(|e| GeoFieldError::io(target, e))?;

    if let Err(e) = fs::rename(staged, target) {
        if let Err(restore) = fs::rename(backup, target) {
            warn!(path = %backup.display(), error = %restore, "could not restore previous dataset");
        }
        return Err(GeoFieldError::io(target, e));
    }

    if let Err(e) = fs::remove_dir_all(backup) {
        warn!(path = %backup.display(), error = %e, "could not delete replaced dataset");
    }
    Ok(())
}

/// Hashes everything written through it.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Hex SHA-256 of the bytes written.
    fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let bytes = fs::read(&path).map_err(|e| GeoFieldError::io(&path, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(feature = "download")]
fn default_source() -> Option<Box<dyn ArchiveSource>> {
    match HttpSource::new() {
        Ok(http) => Some(Box::new(http)),
        Err(e) => {
            warn!(error = %e, "HTTP client unavailable; datasets must already be present");
            None
        }
    }
}

#[cfg(not(feature = "download"))]
fn default_source() -> Option<Box<dyn ArchiveSource>> {
    None
}
