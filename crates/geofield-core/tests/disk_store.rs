mod common;

use common::MockEngine;
use geofield_core::store::ArchiveSource;
use geofield_core::{
    DatasetStore, DiskStore, GeoFieldError, GeoidKey, GravityKey, ModelKey, ModelRegistry,
    StoreConfig,
};
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

/// Serves one zip from memory. While `busy` is set it answers with an HTML
/// page instead, like a mirror showing a maintenance notice.
#[derive(Clone)]
struct ZipSource {
    archive: Arc<Vec<u8>>,
    calls: Arc<AtomicUsize>,
    busy: Arc<AtomicBool>,
}

impl ZipSource {
    fn new(entries: &[(&str, &str)]) -> Self {
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            w.start_file(*name, SimpleFileOptions::default()).unwrap();
            w.write_all(data.as_bytes()).unwrap();
        }
        Self {
            archive: Arc::new(w.finish().unwrap().into_inner()),
            calls: Arc::new(AtomicUsize::new(0)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveSource for ZipSource {
    fn fetch(&self, _url: &str, out: &mut dyn Write) -> io::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body: &[u8] = if self.busy.load(Ordering::SeqCst) {
            b"<html><body>Down for maintenance</body></html>"
        } else {
            &self.archive
        };
        out.write_all(body)?;
        Ok(body.len() as u64)
    }
}

fn egm96_source() -> ZipSource {
    ZipSource::new(&[
        ("gravity/egm96.egm", "EGMF-1 coefficients"),
        ("gravity/egm96.egm.cof", "0 0 1.0"),
    ])
}

fn disk_registry(dir: &Path, source: &ZipSource) -> (ModelRegistry, Arc<MockEngine>) {
    let engine = Arc::new(MockEngine::default());
    let store = DiskStore::new(StoreConfig::default().with_data_dir(dir)).with_source(source.clone());
    (ModelRegistry::new(engine.clone(), Arc::new(store)), engine)
}

#[test]
fn engine_opens_the_unpacked_model_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let source = egm96_source();
    let (reg, engine) = disk_registry(tmp.path(), &source);

    reg.resolve(GravityKey::Egm96).unwrap();

    let dir = engine.last_dir.lock().unwrap().clone().unwrap();
    assert_eq!(dir, tmp.path().join("gravity-egm96").join("gravity"));
    assert!(dir.join("egm96.egm").is_file());
    assert!(dir.join("egm96.egm.cof").is_file());
    assert!(tmp.path().join("gravity-egm96/manifest.json").is_file());
}

#[test]
fn dataset_is_downloaded_once() {
    let tmp = tempfile::tempdir().unwrap();
    let source = egm96_source();
    let (reg, engine) = disk_registry(tmp.path(), &source);

    let first = reg.resolve(GravityKey::Egm96).unwrap();
    for _ in 0..5 {
        let again = reg.resolve(GravityKey::Egm96).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }
    assert_eq!(source.calls(), 1);
    assert_eq!(engine.opens_of("egm96"), 1);

    // A fresh registry over the same directory finds the installed copy.
    let (reg, engine) = disk_registry(tmp.path(), &source);
    reg.resolve(GravityKey::Egm96).unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(engine.opens_of("egm96"), 1);
}

#[test]
fn html_instead_of_archive_is_retryable() {
    let tmp = tempfile::tempdir().unwrap();
    let source = egm96_source();
    source.busy.store(true, Ordering::SeqCst);
    let (reg, engine) = disk_registry(tmp.path(), &source);

    let err = reg.resolve(GravityKey::Egm96).unwrap_err();
    assert!(
        matches!(&err, GeoFieldError::DatasetUnavailable { dataset, .. } if dataset == "gravity-egm96"),
        "{err:?}"
    );
    assert!(err.is_retryable());
    assert!(!reg.is_loaded(GravityKey::Egm96));
    assert_eq!(engine.total_opens(), 0);
    assert!(!tmp.path().join("gravity-egm96").exists());

    source.busy.store(false, Ordering::SeqCst);
    reg.resolve(GravityKey::Egm96).unwrap();
    assert!(reg.is_loaded(GravityKey::Egm96));
    assert_eq!(source.calls(), 2);
}

#[test]
fn archive_for_another_kind_is_retryable() {
    let tmp = tempfile::tempdir().unwrap();
    // A gravity archive served where a geoid grid was expected.
    let source = egm96_source();
    let (reg, engine) = disk_registry(tmp.path(), &source);

    let err = reg.resolve(GeoidKey::Egm96_5).unwrap_err();
    match &err {
        GeoFieldError::DatasetUnavailable { dataset, reason } => {
            assert_eq!(dataset, GeoidKey::Egm96_5.dataset_id());
            assert!(reason.contains("geoids/"), "{reason}");
        }
        other => panic!("expected DatasetUnavailable, got {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(engine.total_opens(), 0);
}

#[test]
fn offline_store_never_calls_the_source() {
    let tmp = tempfile::tempdir().unwrap();
    let source = egm96_source();
    let store = DiskStore::new(StoreConfig::default().with_data_dir(tmp.path()).offline(true))
        .with_source(source.clone());

    let err = store.locate(&GravityKey::Egm96.dataset()).unwrap_err();
    assert!(matches!(err, GeoFieldError::DatasetUnavailable { .. }));
    assert_eq!(source.calls(), 0);
}
