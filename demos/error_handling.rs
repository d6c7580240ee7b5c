//! Error handling example for geofield-rs
//!
//! This example demonstrates the failure modes of the registry and how to
//! tell retryable failures from permanent ones.

use geofield_rs::prelude::*;
use geofield_rs::{
    AnyKey, DatasetStore, Datum, DiskStore, GeodesyEngine, GeoidModel, GeoidOptions, GravityModel,
    GravityOptions, MagneticModel, StoreConfig,
};
use std::path::Path;
use std::sync::Arc;

/// A geoid grid covering only |lat| <= 60.
struct RegionalGeoid;

impl GeoidModel for RegionalGeoid {
    fn name(&self) -> &str {
        "regional"
    }

    fn height(&self, lat: f64, lon: f64) -> Result<f64> {
        if lat.abs() > 60.0 {
            return Err(GeoFieldError::OutOfDomain {
                model: self.name().to_string(),
                lat,
                lon,
            });
        }
        Ok(42.0)
    }
}

/// Builds geoids, rejects everything else.
struct GeoidOnlyEngine;

impl GeodesyEngine for GeoidOnlyEngine {
    fn open_geoid(&self, _: &str, _: &Path, _: GeoidOptions) -> Result<Arc<dyn GeoidModel>> {
        Ok(Arc::new(RegionalGeoid))
    }

    fn open_gravity(&self, name: &str, _: &Path, _: GravityOptions) -> Result<Arc<dyn GravityModel>> {
        Err(GeoFieldError::construction(name, "gravity synthesis not supported"))
    }

    fn open_magnetic(&self, name: &str, _: &Path, _: &Datum) -> Result<Arc<dyn MagneticModel>> {
        Err(GeoFieldError::construction(name, "magnetic synthesis not supported"))
    }
}

struct AnywhereStore;

impl DatasetStore for AnywhereStore {
    fn locate(&self, dataset: &geofield_rs::DatasetRef) -> Result<std::path::PathBuf> {
        Ok(std::env::temp_dir().join(dataset.id))
    }
}

fn report<T: std::fmt::Debug>(what: &str, r: Result<T>) {
    match r {
        Ok(v) => println!("  ✓ {what}: {v:?}"),
        Err(e) => println!("  ✗ {what}: {e} (retryable: {})", e.is_retryable()),
    }
}

fn main() -> Result<()> {
    println!("=== geofield-rs Error Handling Example ===\n");

    // Example 1: No engine installed yet
    println!("--- Example 1: Global registry without an engine ---");
    report("global registry", ModelRegistry::global().map(|_| ()));
    println!();

    // Example 2: Unknown model names
    println!("--- Example 2: Parsing model names ---");
    for name in ["egm96-5", "wmm2020", "egm2020", ""] {
        report(name, name.parse::<AnyKey>());
    }
    println!();

    // Example 3: Offline store with nothing installed
    println!("--- Example 3: Offline dataset store ---");
    let empty = std::env::temp_dir().join("geofield-demo-empty");
    let store = DiskStore::new(StoreConfig::default().with_data_dir(&empty).offline(true));
    let registry = ModelRegistry::new(Arc::new(GeoidOnlyEngine), Arc::new(store));
    report("resolve egm96-5", registry.resolve(GeoidKey::Egm96_5).map(|m| m.name().to_string()));
    println!("  loaded afterwards: {}", registry.is_loaded(GeoidKey::Egm96_5));
    println!();

    // Example 4: Construction failures and out-of-domain queries
    println!("--- Example 4: Engine errors ---");
    let registry = ModelRegistry::new(Arc::new(GeoidOnlyEngine), Arc::new(AnywhereStore));
    report("gravity height", registry.height(GravityKey::Egm2008, Lla::new(10.0, 0.0, 0.0)));
    report("geoid height at 45°", registry.height(GeoidKey::Egm84_15, Lla::new(45.0, 0.0, 0.0)));
    report("geoid height at 75°", registry.height(GeoidKey::Egm84_15, Lla::new(75.0, 0.0, 0.0)));
    println!("  geoid still loaded: {}", registry.is_loaded(GeoidKey::Egm84_15));

    // Example 5: Matching on the error kind
    println!("\n--- Example 5: Matching on error kinds ---");
    match registry.field(DefaultModel, 2025.0, Lla::new(0.0, 0.0, 0.0)) {
        Ok(b) => println!("  field: {b:?}"),
        Err(GeoFieldError::ModelConstruction { model, reason }) => {
            println!("  cannot build {model}: {reason}")
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
