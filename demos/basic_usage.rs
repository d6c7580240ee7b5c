//! Basic usage example for geofield-rs
//!
//! This example demonstrates how to:
//! - Plug a geodesy engine into the process-wide registry
//! - Evaluate geoid height, gravity and magnetic field by key or by default
//! - Query in geodetic or earth-fixed coordinates
//!
//! The engine here is a toy (point mass, constant dipole) so the example runs
//! without any downloaded datasets.

use geofield_rs::prelude::*;
use geofield_rs::{
    field_and_rate, gravitational_gradient, height, inertial_gradient, install_global,
    resolve, DatasetRef, DatasetStore, Datum, FieldAndRate, GeodesyEngine, GeoidModel,
    GeoidOptions, GravityModel, GravityOptions, MagneticModel, Potential,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const GM: f64 = 3.986_004_418e14;
const OMEGA: f64 = 7.292_115e-5;

struct ToyGravity(String);

impl ToyGravity {
    fn point_mass(p: Ecef) -> Potential<EcefVector> {
        let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
        let k = -GM / (r * r * r);
        Potential::new(GM / r, EcefVector::new(k * p.x, k * p.y, k * p.z))
    }

    fn spin(p: Ecef) -> Potential<EcefVector> {
        let w2 = OMEGA * OMEGA;
        Potential::new(
            0.5 * w2 * (p.x * p.x + p.y * p.y),
            EcefVector::new(w2 * p.x, w2 * p.y, 0.0),
        )
    }
}

impl GravityModel for ToyGravity {
    fn name(&self) -> &str {
        &self.0
    }

    fn geoid_height(&self, lat: f64, _lon: f64) -> Result<f64> {
        Ok(10.0 * lat.to_radians().cos())
    }

    fn gravity(&self, p: Lla) -> Result<Potential<Enu>> {
        let g = self.gravity_ecef(Ecef::from(p))?;
        Ok(g.map(|v| Datum::wgs84().ecef_to_enu(p.lat, p.lon, v)))
    }

    fn gravity_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        let (v, c) = (Self::point_mass(p), Self::spin(p));
        Ok(Potential::new(v.potential + c.potential, v.gradient + c.gradient))
    }

    fn inertial_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(Self::point_mass(p))
    }

    fn centrifugal_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(Self::spin(p))
    }

    // The toy field is its own normal field.
    fn disturbance(&self, _p: Lla) -> Result<Potential<Enu>> {
        Ok(Potential::new(0.0, Enu::default()))
    }

    fn disturbance_ecef(&self, _p: Ecef) -> Result<Potential<EcefVector>> {
        Ok(Potential::new(0.0, EcefVector::default()))
    }
}

struct ToyGeoid(String);

impl GeoidModel for ToyGeoid {
    fn name(&self) -> &str {
        &self.0
    }

    fn height(&self, lat: f64, lon: f64) -> Result<f64> {
        Ok(10.0 * lat.to_radians().cos() + lon.to_radians().sin())
    }
}

struct ToyDipole(String);

impl MagneticModel for ToyDipole {
    fn name(&self) -> &str {
        &self.0
    }

    fn field(&self, year: f64, p: Lla) -> Result<FieldAndRate<Enu>> {
        let phi = p.lat.to_radians();
        let scale = 1.0 - 1e-3 * (year - 2020.0);
        Ok(FieldAndRate {
            field: Enu::new(0.0, 30_000.0 * phi.cos() * scale, -60_000.0 * phi.sin() * scale),
            rate: Enu::new(0.0, -30.0 * phi.cos(), 60.0 * phi.sin()),
        })
    }
}

struct ToyEngine;

impl GeodesyEngine for ToyEngine {
    fn open_geoid(&self, name: &str, dir: &Path, _: GeoidOptions) -> Result<Arc<dyn GeoidModel>> {
        println!("  [engine] opening geoid {name} from {}", dir.display());
        Ok(Arc::new(ToyGeoid(name.to_string())))
    }

    fn open_gravity(
        &self,
        name: &str,
        dir: &Path,
        _: GravityOptions,
    ) -> Result<Arc<dyn GravityModel>> {
        println!("  [engine] opening gravity {name} from {}", dir.display());
        Ok(Arc::new(ToyGravity(name.to_string())))
    }

    fn open_magnetic(&self, name: &str, dir: &Path, _: &Datum) -> Result<Arc<dyn MagneticModel>> {
        println!("  [engine] opening magnetic {name} from {}", dir.display());
        Ok(Arc::new(ToyDipole(name.to_string())))
    }
}

/// Pretends every dataset is already unpacked under `/opt/geofield`.
struct PreinstalledStore;

impl DatasetStore for PreinstalledStore {
    fn locate(&self, dataset: &DatasetRef) -> Result<PathBuf> {
        Ok(Path::new("/opt/geofield").join(dataset.id))
    }
}

fn main() -> Result<()> {
    println!("=== geofield-rs Basic Usage Example ===\n");

    install_global(ModelRegistry::new(Arc::new(ToyEngine), Arc::new(PreinstalledStore)))?;
    println!("✓ Registry installed\n");

    let zurich = Lla::new(47.37, 8.54, 408.0);

    // Example 1: Geoid height by key, by default, and via a gravity model
    println!("--- Example 1: Geoid height ---");
    println!("  EGM96 5' grid:    {:.3} m", height(GeoidKey::Egm96_5, zurich)?);
    println!("  Default model:    {:.3} m", height(DefaultModel, zurich)?);
    println!("  EGM2008 gravity:  {:.3} m", height(GravityKey::Egm2008, zurich)?);
    println!();

    // Example 2: Models are built once and shared
    println!("--- Example 2: Shared instances ---");
    let a = resolve(GravityKey::Egm96)?;
    let b = resolve(GravityKey::Egm96)?;
    println!("  Same instance: {}", Arc::ptr_eq(&a, &b));
    println!("  Reusing it skips the registry: {:.3} m", height(&a, zurich)?);
    println!();

    // Example 3: The frame of the result follows the frame of the input
    println!("--- Example 3: Gravity in two frames ---");
    let local = gravitational_gradient(DefaultModel, zurich)?;
    let fixed = gravitational_gradient(DefaultModel, Ecef::from(zurich))?;
    println!("  ENU:  {local:?}  |g| = {:.5}", local.norm());
    println!("  ECEF: {fixed:?}  |g| = {:.5}", fixed.norm());
    let inertial = inertial_gradient(DefaultModel, Ecef::from(zurich))?;
    println!("  Without centrifugal: |g| = {:.5}", inertial.norm());
    println!();

    // Example 4: Magnetic field and secular variation
    println!("--- Example 4: Magnetic field ---");
    let b = field_and_rate(MagneticKey::Wmm2020, 2024.5, zurich)?;
    println!("  B     = {:?} nT", b.field);
    println!("  dB/dt = {:?} nT/yr", b.rate);

    let registry = ModelRegistry::global()?;
    println!("\n{registry:?}");

    Ok(())
}
