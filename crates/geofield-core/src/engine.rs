// crates/geofield-core/src/engine.rs

//! # Geodesy Engine Interface
//!
//! The numerical kernels (grid interpolation, spherical-harmonic synthesis)
//! live outside this crate. An engine plugs in by implementing
//! [`GeodesyEngine`], which turns an unpacked dataset directory into model
//! objects implementing [`GeoidModel`], [`GravityModel`] or
//! [`MagneticModel`].
//!
//! Models are shared between threads for the lifetime of the process and
//! are never mutated after construction, so every evaluation method takes
//! `&self`.

use crate::coord::{Datum, Ecef, EcefVector, Enu, Lla};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A scalar potential together with its gradient, in the frame of the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Potential<V> {
    /// m²/s²
    pub potential: f64,
    /// m/s²
    pub gradient: V,
}

impl<V> Potential<V> {
    pub fn new(potential: f64, gradient: V) -> Self {
        Self { potential, gradient }
    }

    pub fn map<W>(self, f: impl FnOnce(V) -> W) -> Potential<W> {
        Potential {
            potential: self.potential,
            gradient: f(self.gradient),
        }
    }
}

/// A magnetic field vector and its secular variation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldAndRate<V> {
    /// nT
    pub field: V,
    /// nT/year
    pub rate: V,
}

impl<V> FieldAndRate<V> {
    pub fn map<W>(self, mut f: impl FnMut(V) -> W) -> FieldAndRate<W> {
        FieldAndRate {
            field: f(self.field),
            rate: f(self.rate),
        }
    }
}

/// Geoid construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoidOptions {
    /// Cubic interpolation when `true`, bilinear otherwise.
    pub cubic: bool,
    /// Raise [`OutOfDomain`](crate::GeoFieldError::OutOfDomain) for queries
    /// outside the grid's coverage instead of extrapolating.
    pub strict: bool,
}

impl Default for GeoidOptions {
    fn default() -> Self {
        Self {
            cubic: true,
            strict: true,
        }
    }
}

/// Gravity construction parameters. `None` keeps the dataset's native maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityOptions {
    pub max_degree: Option<u32>,
    pub max_order: Option<u32>,
}

pub trait GeoidModel: Send + Sync {
    fn name(&self) -> &str;

    /// Height of the geoid above the ellipsoid at the given latitude and
    /// longitude, in meters.
    fn height(&self, lat: f64, lon: f64) -> Result<f64>;
}

/// Gravity field evaluation.
///
/// The `*_ecef` methods take earth-fixed coordinates and return gradients
/// along the ECEF axes; the geodetic methods return local east/north/up
/// gradients.
pub trait GravityModel: Send + Sync {
    fn name(&self) -> &str;

    /// Geoid height implied by this gravity model, in meters.
    fn geoid_height(&self, lat: f64, lon: f64) -> Result<f64>;

    /// Gravity potential `W` (gravitational plus centrifugal) and its gradient.
    fn gravity(&self, p: Lla) -> Result<Potential<Enu>>;

    fn gravity_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>>;

    /// Gravitational potential `V` alone, as seen from an inertial frame.
    fn inertial_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>>;

    /// Centrifugal potential `Φ` of the rotating frame.
    fn centrifugal_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>>;

    /// Disturbing potential `T = W − U` against the model's normal ellipsoid.
    fn disturbance(&self, p: Lla) -> Result<Potential<Enu>>;

    fn disturbance_ecef(&self, p: Ecef) -> Result<Potential<EcefVector>>;
}

pub trait MagneticModel: Send + Sync {
    fn name(&self) -> &str;

    /// Field and its rate of change at fractional year `year`, in the local
    /// east/north/up frame.
    fn field(&self, year: f64, p: Lla) -> Result<FieldAndRate<Enu>>;
}

macro_rules! debug_by_name {
    ($($model:ident),+) => {
        $(
            impl fmt::Debug for dyn $model {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_tuple(stringify!($model)).field(&self.name()).finish()
                }
            }
        )+
    };
}

debug_by_name!(GeoidModel, GravityModel, MagneticModel);

/// Constructs models from unpacked datasets.
///
/// `dir` is the kind-specific directory of the dataset (for example
/// `<store>/geoids-egm96-5/geoids`) and `name` the model name inside it
/// (`egm96-5`). Implementations should report unreadable or malformed data
/// as [`ModelConstruction`](crate::GeoFieldError::ModelConstruction).
pub trait GeodesyEngine: Send + Sync {
    fn open_geoid(&self, name: &str, dir: &Path, options: GeoidOptions)
        -> Result<Arc<dyn GeoidModel>>;

    fn open_gravity(
        &self,
        name: &str,
        dir: &Path,
        options: GravityOptions,
    ) -> Result<Arc<dyn GravityModel>>;

    /// `datum` is always the process-wide [`Datum::wgs84`].
    fn open_magnetic(
        &self,
        name: &str,
        dir: &Path,
        datum: &Datum,
    ) -> Result<Arc<dyn MagneticModel>>;
}
