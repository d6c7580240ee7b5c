// crates/geofield-core/src/store/archive.rs
use crate::error::{GeoFieldError, Result};
use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;

/// Unpacks a zip archive into `dest`.
///
/// Entries whose names would escape `dest` are skipped.
pub fn extract_zip<R: Read + Seek>(dataset: &str, reader: R, dest: &Path) -> Result<usize> {
    let invalid = |reason: String| GeoFieldError::Archive {
        dataset: dataset.to_string(),
        reason,
    };

    let mut archive =
        ZipArchive::new(reader).map_err(|e| invalid(format!("not a zip file: {e}")))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| invalid(format!("unreadable entry {i}: {e}")))?;

        let Some(rel) = entry.enclosed_name() else {
            warn!(dataset, entry = entry.name(), "skipping archive entry outside dataset root");
            continue;
        };
        let out = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| GeoFieldError::io(&out, e))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| GeoFieldError::io(parent, e))?;
        }
        let mut file = File::create(&out).map_err(|e| GeoFieldError::io(&out, e))?;
        io::copy(&mut entry, &mut file).map_err(|e| GeoFieldError::io(&out, e))?;
        written += 1;
    }

    Ok(written)
}
