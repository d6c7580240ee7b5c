// Shared fixtures: an analytic engine and an in-memory dataset store.
#![allow(dead_code)]

use geofield_core::{
    DatasetRef, DatasetStore, Datum, Ecef, EcefVector, Enu, FieldAndRate, GeoFieldError,
    GeodesyEngine, GeoidModel, GeoidOptions, GravityModel, GravityOptions, Lla, MagneticModel,
    ModelRegistry, Potential, Result,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GM: f64 = 3.986_004_418e14;
pub const OMEGA: f64 = 7.292_115e-5;
/// Normal field uses a slightly different mass so `T` is not zero.
pub const GM_NORMAL: f64 = GM * (1.0 - 1e-6);
/// Geoid height of the analytic gravity model at (0°, 0°).
pub const EQUATOR_GEOID_HEIGHT: f64 = 17.16;
/// The analytic geoid grid only covers |lat| <= 80°.
pub const GRID_LAT_LIMIT: f64 = 80.0;

fn point_mass(gm: f64, p: Ecef) -> Potential<EcefVector> {
    let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
    let k = -gm / (r * r * r);
    Potential::new(gm / r, EcefVector::new(k * p.x, k * p.y, k * p.z))
}

fn centrifugal(p: Ecef) -> Potential<EcefVector> {
    let w2 = OMEGA * OMEGA;
    Potential::new(
        0.5 * w2 * (p.x * p.x + p.y * p.y),
        EcefVector::new(w2 * p.x, w2 * p.y, 0.0),
    )
}

fn sum(a: Potential<EcefVector>, b: Potential<EcefVector>) -> Potential<EcefVector> {
    Potential::new(a.potential + b.potential, a.gradient + b.gradient)
}

fn to_local(p: Lla, v: Potential<EcefVector>) -> Potential<Enu> {
    let d = Datum::wgs84();
    v.map(|g| d.ecef_to_enu(p.lat, p.lon, g))
}

pub struct AnalyticGravity {
    pub name: String,
}

impl AnalyticGravity {
    /// Normal gravity `U` (normal mass plus centrifugal).
    pub fn normal(&self, p: Ecef) -> Potential<EcefVector> {
        sum(point_mass(GM_NORMAL, p), centrifugal(p))
    }
}

impl GravityModel for AnalyticGravity {
    fn name(&self) -> &str {
        &self.name
    }

    fn geoid_height(&self, lat: f64, lon: f64) -> Result<f64> {
        Ok(EQUATOR_GEOID_HEIGHT + 10.0 * lat.to_radians().sin() * lon.to_radians().cos())
    }

    fn gravity(&self, p: Lla) -> Result<Potential<Enu>> {
        Ok(to_local(p, self.gravity_ecef(Ecef::from(p))?))
    }

    fn gravity_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(sum(point_mass(GM, p), centrifugal(p)))
    }

    fn inertial_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(point_mass(GM, p))
    }

    fn centrifugal_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(centrifugal(p))
    }

    fn disturbance(&self, p: Lla) -> Result<Potential<Enu>> {
        Ok(to_local(p, self.disturbance_ecef(Ecef::from(p))?))
    }

    fn disturbance_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        let w = self.gravity_ecef(p)?;
        let u = self.normal(p);
        Ok(Potential::new(w.potential - u.potential, w.gradient - u.gradient))
    }
}

pub struct AnalyticGeoid {
    pub name: String,
    pub options: GeoidOptions,
}

impl GeoidModel for AnalyticGeoid {
    fn name(&self) -> &str {
        &self.name
    }

    fn height(&self, lat: f64, lon: f64) -> Result<f64> {
        if self.options.strict && lat.abs() > GRID_LAT_LIMIT {
            return Err(GeoFieldError::OutOfDomain {
                model: self.name.clone(),
                lat,
                lon,
            });
        }
        Ok(30.0 * lat.to_radians().cos() - 5.0 * lon.to_radians().sin())
    }
}

/// Axial dipole with linear secular variation.
pub struct Dipole {
    pub name: String,
}

impl Dipole {
    pub const EPOCH: f64 = 2020.0;
    pub const DRIFT: f64 = 1e-3;

    fn base(p: Lla) -> Enu {
        let phi = p.lat.to_radians();
        Enu::new(0.0, 30_000.0 * phi.cos(), -60_000.0 * phi.sin())
    }
}

impl MagneticModel for Dipole {
    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self, year: f64, p: Lla) -> Result<FieldAndRate<Enu>> {
        let b = Self::base(p);
        let s = 1.0 + Self::DRIFT * (year - Self::EPOCH);
        Ok(FieldAndRate {
            field: Enu::new(b.east * s, b.north * s, b.up * s),
            rate: Enu::new(b.east * Self::DRIFT, b.north * Self::DRIFT, b.up * Self::DRIFT),
        })
    }
}

/// Engine building the analytic models, counting every construction.
#[derive(Default)]
pub struct MockEngine {
    pub opens: Mutex<HashMap<String, usize>>,
    pub delay: Option<Duration>,
    /// Number of upcoming constructions that fail.
    pub failures: AtomicUsize,
    pub last_dir: Mutex<Option<PathBuf>>,
    pub last_geoid_options: Mutex<Option<GeoidOptions>>,
    pub last_gravity_options: Mutex<Option<GravityOptions>>,
    pub saw_shared_datum: AtomicBool,
}

impl MockEngine {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn opens_of(&self, name: &str) -> usize {
        self.opens.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn total_opens(&self) -> usize {
        self.opens.lock().unwrap().values().sum()
    }

    fn open(&self, name: &str, dir: &Path) -> Result<()> {
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(GeoFieldError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated coefficients"),
            ));
        }
        *self.opens.lock().unwrap().entry(name.to_string()).or_default() += 1;
        *self.last_dir.lock().unwrap() = Some(dir.to_path_buf());
        Ok(())
    }
}

impl GeodesyEngine for MockEngine {
    fn open_geoid(
        &self,
        name: &str,
        dir: &Path,
        options: GeoidOptions,
    ) -> Result<Arc<dyn GeoidModel>> {
        self.open(name, dir)?;
        *self.last_geoid_options.lock().unwrap() = Some(options);
        Ok(Arc::new(AnalyticGeoid {
            name: name.to_string(),
            options,
        }))
    }

    fn open_gravity(
        &self,
        name: &str,
        dir: &Path,
        options: GravityOptions,
    ) -> Result<Arc<dyn GravityModel>> {
        self.open(name, dir)?;
        *self.last_gravity_options.lock().unwrap() = Some(options);
        Ok(Arc::new(AnalyticGravity {
            name: name.to_string(),
        }))
    }

    fn open_magnetic(
        &self,
        name: &str,
        dir: &Path,
        datum: &Datum,
    ) -> Result<Arc<dyn MagneticModel>> {
        self.open(name, dir)?;
        self.saw_shared_datum
            .store(std::ptr::eq(datum, Datum::wgs84()), Ordering::SeqCst);
        Ok(Arc::new(Dipole {
            name: name.to_string(),
        }))
    }
}

/// Store that hands out `<root>/<dataset id>` without touching the disk.
pub struct MemoryStore {
    pub root: PathBuf,
    pub locates: AtomicUsize,
    /// Number of upcoming lookups that fail.
    pub failures: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/datasets"),
            locates: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }
}

impl DatasetStore for MemoryStore {
    fn locate(&self, dataset: &DatasetRef) -> Result<PathBuf> {
        self.locates.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(GeoFieldError::unavailable(dataset.id, "connection reset"));
        }
        Ok(self.root.join(dataset.id))
    }
}

pub fn registry_with(engine: MockEngine) -> (ModelRegistry, Arc<MockEngine>, Arc<MemoryStore>) {
    let engine = Arc::new(engine);
    let store = Arc::new(MemoryStore::new());
    let registry = ModelRegistry::new(engine.clone(), store.clone());
    (registry, engine, store)
}

pub fn registry() -> (ModelRegistry, Arc<MockEngine>, Arc<MemoryStore>) {
    registry_with(MockEngine::default())
}

pub fn assert_close(a: f64, b: f64, tol: f64, what: &str) {
    assert!(
        (a - b).abs() <= tol,
        "{what}: {a} vs {b} (diff {}, tol {tol})",
        (a - b).abs()
    );
}

pub fn assert_vec_close(a: EcefVector, b: EcefVector, tol: f64, what: &str) {
    assert_close(a.x, b.x, tol, &format!("{what}.x"));
    assert_close(a.y, b.y, tol, &format!("{what}.y"));
    assert_close(a.z, b.z, tol, &format!("{what}.z"));
}
