// crates/geofield-core/src/field.rs

//! # Field Evaluation
//!
//! Every operation takes two inputs:
//!
//! 1. **Which model.** Anything convertible into [`ModelRef`] (or
//!    [`HeightModel`] for [`height`]): a key, an already resolved model, or
//!    [`DefaultModel`] for the kind's default key. Keys of the wrong kind do
//!    not convert, so passing a magnetic key to a gravity operation is a
//!    compile error.
//! 2. **Where.** Any [`Position`]: [`Lla`], [`Ecef`] or [`AnyPosition`].
//!    Vector results come back in the matching frame: [`Enu`] for `Lla`,
//!    [`EcefVector`] for `Ecef`, [`AnyVector`] for `AnyPosition`.
//!
//! The free functions use [`ModelRegistry::global`]; the same operations are
//! available as methods on any [`ModelRegistry`].
//!
//! ```no_run
//! use geofield_core::{height, field, DefaultModel, GeoidKey, Lla, MagneticKey};
//!
//! let here = Lla::new(47.37, 8.54, 408.0);
//! let n = height(GeoidKey::Egm2008_1, here)?;
//! let n_default = height(DefaultModel, here)?;
//! let b = field(MagneticKey::Wmm2020, 2024.5, here)?;
//! println!("N = {n:.3} m ({n_default:.3} m), B_up = {:.1} nT", b.up);
//! # Ok::<(), geofield_core::GeoFieldError>(())
//! ```

use crate::coord::{AnyPosition, AnyVector, Datum, Ecef, EcefVector, Enu, Lla};
use crate::engine::{FieldAndRate, GeoidModel, GravityModel, MagneticModel, Potential};
use crate::error::Result;
use crate::keys::{GeoidKey, GravityKey, MagneticKey, ModelKey};
use crate::registry::{ModelRegistry, Registered};
use std::fmt;
use std::sync::Arc;

// -----------------------------------------------------------------------------
// MODEL SELECTION
// -----------------------------------------------------------------------------

/// Stand-in for "no model given": resolves to the kind's default key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultModel;

/// How an operation's model is specified.
pub enum ModelRef<K: ModelKey> {
    Instance(Arc<K::Model>),
    Key(K),
    Default,
}

impl<K: Registered> ModelRef<K> {
    /// The single place where a model reference becomes a model.
    pub fn resolve(self, registry: &ModelRegistry) -> Result<Arc<K::Model>> {
        match self {
            ModelRef::Instance(model) => Ok(model),
            ModelRef::Key(key) => registry.resolve(key),
            ModelRef::Default => registry.resolve(K::DEFAULT),
        }
    }
}

impl<K: ModelKey> Clone for ModelRef<K> {
    fn clone(&self) -> Self {
        match self {
            ModelRef::Instance(m) => ModelRef::Instance(Arc::clone(m)),
            ModelRef::Key(k) => ModelRef::Key(*k),
            ModelRef::Default => ModelRef::Default,
        }
    }
}

impl<K: ModelKey> fmt::Debug for ModelRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Instance(_) => f.write_str("Instance(..)"),
            ModelRef::Key(k) => f.debug_tuple("Key").field(k).finish(),
            ModelRef::Default => f.write_str("Default"),
        }
    }
}

impl<K: ModelKey> Default for ModelRef<K> {
    fn default() -> Self {
        ModelRef::Default
    }
}

impl<K: ModelKey> From<DefaultModel> for ModelRef<K> {
    fn from(_: DefaultModel) -> Self {
        ModelRef::Default
    }
}

macro_rules! model_ref_from {
    ($key:ty, $model:ident) => {
        impl From<$key> for ModelRef<$key> {
            fn from(key: $key) -> Self {
                ModelRef::Key(key)
            }
        }

        impl From<Arc<dyn $model>> for ModelRef<$key> {
            fn from(model: Arc<dyn $model>) -> Self {
                ModelRef::Instance(model)
            }
        }

        impl From<&Arc<dyn $model>> for ModelRef<$key> {
            fn from(model: &Arc<dyn $model>) -> Self {
                ModelRef::Instance(Arc::clone(model))
            }
        }
    };
}

model_ref_from!(GeoidKey, GeoidModel);
model_ref_from!(GravityKey, GravityModel);
model_ref_from!(MagneticKey, MagneticModel);

/// Models that can answer [`height`]: a gridded geoid or a gravity model.
/// The default is the default gravity model.
#[derive(Debug, Clone)]
pub enum HeightModel {
    Geoid(ModelRef<GeoidKey>),
    Gravity(ModelRef<GravityKey>),
}

impl Default for HeightModel {
    fn default() -> Self {
        HeightModel::Gravity(ModelRef::Default)
    }
}

impl From<DefaultModel> for HeightModel {
    fn from(_: DefaultModel) -> Self {
        HeightModel::default()
    }
}

impl From<ModelRef<GeoidKey>> for HeightModel {
    fn from(m: ModelRef<GeoidKey>) -> Self {
        HeightModel::Geoid(m)
    }
}

impl From<ModelRef<GravityKey>> for HeightModel {
    fn from(m: ModelRef<GravityKey>) -> Self {
        HeightModel::Gravity(m)
    }
}

macro_rules! height_model_from {
    ($variant:ident, $key:ty, $($src:ty),+) => {
        $(
            impl From<$src> for HeightModel {
                fn from(m: $src) -> Self {
                    HeightModel::$variant(ModelRef::<$key>::from(m))
                }
            }
        )+
    };
}

height_model_from!(Geoid, GeoidKey, GeoidKey, Arc<dyn GeoidModel>, &Arc<dyn GeoidModel>);
height_model_from!(Gravity, GravityKey, GravityKey, Arc<dyn GravityModel>, &Arc<dyn GravityModel>);

// -----------------------------------------------------------------------------
// FRAME DISPATCH
// -----------------------------------------------------------------------------

/// A query position. The associated `Vector` is the frame results come back in.
pub trait Position: Copy {
    type Vector: Copy + fmt::Debug;

    /// Latitude and longitude on the WGS84 ellipsoid, in degrees.
    fn horizontal(self) -> (f64, f64);

    fn gravity(self, model: &dyn GravityModel) -> Result<Potential<Self::Vector>>;

    fn disturbance(self, model: &dyn GravityModel) -> Result<Potential<Self::Vector>>;

    fn magnetic(self, model: &dyn MagneticModel, year: f64) -> Result<FieldAndRate<Self::Vector>>;
}

impl Position for Lla {
    type Vector = Enu;

    fn horizontal(self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    fn gravity(self, model: &dyn GravityModel) -> Result<Potential<Enu>> {
        model.gravity(self)
    }

    fn disturbance(self, model: &dyn GravityModel) -> Result<Potential<Enu>> {
        model.disturbance(self)
    }

    fn magnetic(self, model: &dyn MagneticModel, year: f64) -> Result<FieldAndRate<Enu>> {
        model.field(year, self)
    }
}

impl Position for Ecef {
    type Vector = EcefVector;

    fn horizontal(self) -> (f64, f64) {
        let p = Datum::wgs84().to_geodetic(self);
        (p.lat, p.lon)
    }

    fn gravity(self, model: &dyn GravityModel) -> Result<Potential<EcefVector>> {
        model.gravity_ecef(self)
    }

    fn disturbance(self, model: &dyn GravityModel) -> Result<Potential<EcefVector>> {
        model.disturbance_ecef(self)
    }

    // Magnetic models only evaluate geodetically; rotate the result back.
    fn magnetic(self, model: &dyn MagneticModel, year: f64) -> Result<FieldAndRate<EcefVector>> {
        let datum = Datum::wgs84();
        let p = datum.to_geodetic(self);
        let local = model.field(year, p)?;
        Ok(local.map(|v| datum.enu_to_ecef(p.lat, p.lon, v)))
    }
}

impl Position for AnyPosition {
    type Vector = AnyVector;

    fn horizontal(self) -> (f64, f64) {
        match self {
            AnyPosition::Geodetic(p) => p.horizontal(),
            AnyPosition::Cartesian(p) => p.horizontal(),
        }
    }

    fn gravity(self, model: &dyn GravityModel) -> Result<Potential<AnyVector>> {
        match self {
            AnyPosition::Geodetic(p) => Ok(p.gravity(model)?.map(AnyVector::Geodetic)),
            AnyPosition::Cartesian(p) => Ok(p.gravity(model)?.map(AnyVector::Cartesian)),
        }
    }

    fn disturbance(self, model: &dyn GravityModel) -> Result<Potential<AnyVector>> {
        match self {
            AnyPosition::Geodetic(p) => Ok(p.disturbance(model)?.map(AnyVector::Geodetic)),
            AnyPosition::Cartesian(p) => Ok(p.disturbance(model)?.map(AnyVector::Cartesian)),
        }
    }

    fn magnetic(self, model: &dyn MagneticModel, year: f64) -> Result<FieldAndRate<AnyVector>> {
        match self {
            AnyPosition::Geodetic(p) => Ok(p.magnetic(model, year)?.map(AnyVector::Geodetic)),
            AnyPosition::Cartesian(p) => Ok(p.magnetic(model, year)?.map(AnyVector::Cartesian)),
        }
    }
}

// -----------------------------------------------------------------------------
// OPERATIONS
// -----------------------------------------------------------------------------

impl ModelRegistry {
    /// Geoid height above the ellipsoid, in meters. Altitude is ignored.
    pub fn height<P: Position>(&self, model: impl Into<HeightModel>, position: P) -> Result<f64> {
        let (lat, lon) = position.horizontal();
        let model: HeightModel = model.into();
        match model {
            HeightModel::Geoid(m) => m.resolve(self)?.height(lat, lon),
            HeightModel::Gravity(m) => m.resolve(self)?.geoid_height(lat, lon),
        }
    }

    /// Gravity potential `W` and acceleration (gravitational plus centrifugal).
    pub fn gravitational_potential_and_gradient<P: Position>(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: P,
    ) -> Result<Potential<P::Vector>> {
        let model: ModelRef<GravityKey> = model.into();
        position.gravity(model.resolve(self)?.as_ref())
    }

    pub fn gravitational_gradient<P: Position>(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: P,
    ) -> Result<P::Vector> {
        Ok(self
            .gravitational_potential_and_gradient(model, position)?
            .gradient)
    }

    /// Gravitational potential `V` alone (no centrifugal term).
    pub fn inertial_potential_and_gradient(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: Ecef,
    ) -> Result<Potential<EcefVector>> {
        let model: ModelRef<GravityKey> = model.into();
        model.resolve(self)?.inertial_ecef(position)
    }

    pub fn inertial_gradient(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: Ecef,
    ) -> Result<EcefVector> {
        Ok(self.inertial_potential_and_gradient(model, position)?.gradient)
    }

    /// Centrifugal potential `Φ` and acceleration.
    pub fn centrifugal_potential_and_gradient(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: Ecef,
    ) -> Result<Potential<EcefVector>> {
        let model: ModelRef<GravityKey> = model.into();
        model.resolve(self)?.centrifugal_ecef(position)
    }

    pub fn centrifugal_gradient(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: Ecef,
    ) -> Result<EcefVector> {
        Ok(self
            .centrifugal_potential_and_gradient(model, position)?
            .gradient)
    }

    /// Disturbing potential `T = W − U` and gravity disturbance.
    pub fn disturbing_potential_and_gradient<P: Position>(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: P,
    ) -> Result<Potential<P::Vector>> {
        let model: ModelRef<GravityKey> = model.into();
        position.disturbance(model.resolve(self)?.as_ref())
    }

    pub fn disturbing_gradient<P: Position>(
        &self,
        model: impl Into<ModelRef<GravityKey>>,
        position: P,
    ) -> Result<P::Vector> {
        Ok(self
            .disturbing_potential_and_gradient(model, position)?
            .gradient)
    }

    /// Magnetic field in nT at fractional year `year`.
    pub fn field<P: Position>(
        &self,
        model: impl Into<ModelRef<MagneticKey>>,
        year: f64,
        position: P,
    ) -> Result<P::Vector> {
        Ok(self.field_and_rate(model, year, position)?.field)
    }

    /// Magnetic field (nT) and its rate of change (nT/year).
    pub fn field_and_rate<P: Position>(
        &self,
        model: impl Into<ModelRef<MagneticKey>>,
        year: f64,
        position: P,
    ) -> Result<FieldAndRate<P::Vector>> {
        let model: ModelRef<MagneticKey> = model.into();
        position.magnetic(model.resolve(self)?.as_ref(), year)
    }
}

// -----------------------------------------------------------------------------
// GLOBAL REGISTRY SHORTHANDS
// -----------------------------------------------------------------------------

/// Resolves `key` in the process-wide registry.
pub fn resolve<K: Registered>(key: K) -> Result<Arc<K::Model>> {
    ModelRegistry::global()?.resolve(key)
}

/// See [`ModelRegistry::height`].
pub fn height<P: Position>(model: impl Into<HeightModel>, position: P) -> Result<f64> {
    ModelRegistry::global()?.height(model, position)
}

/// See [`ModelRegistry::gravitational_potential_and_gradient`].
pub fn gravitational_potential_and_gradient<P: Position>(
    model: impl Into<ModelRef<GravityKey>>,
    position: P,
) -> Result<Potential<P::Vector>> {
    ModelRegistry::global()?.gravitational_potential_and_gradient(model, position)
}

pub fn gravitational_gradient<P: Position>(
    model: impl Into<ModelRef<GravityKey>>,
    position: P,
) -> Result<P::Vector> {
    ModelRegistry::global()?.gravitational_gradient(model, position)
}

/// See [`ModelRegistry::inertial_potential_and_gradient`].
pub fn inertial_potential_and_gradient(
    model: impl Into<ModelRef<GravityKey>>,
    position: Ecef,
) -> Result<Potential<EcefVector>> {
    ModelRegistry::global()?.inertial_potential_and_gradient(model, position)
}

pub fn inertial_gradient(
    model: impl Into<ModelRef<GravityKey>>,
    position: Ecef,
) -> Result<EcefVector> {
    ModelRegistry::global()?.inertial_gradient(model, position)
}

/// See [`ModelRegistry::centrifugal_potential_and_gradient`].
pub fn centrifugal_potential_and_gradient(
    model: impl Into<ModelRef<GravityKey>>,
    position: Ecef,
) -> Result<Potential<EcefVector>> {
    ModelRegistry::global()?.centrifugal_potential_and_gradient(model, position)
}

pub fn centrifugal_gradient(
    model: impl Into<ModelRef<GravityKey>>,
    position: Ecef,
) -> Result<EcefVector> {
    ModelRegistry::global()?.centrifugal_gradient(model, position)
}

/// See [`ModelRegistry::disturbing_potential_and_gradient`].
pub fn disturbing_potential_and_gradient<P: Position>(
    model: impl Into<ModelRef<GravityKey>>,
    position: P,
) -> Result<Potential<P::Vector>> {
    ModelRegistry::global()?.disturbing_potential_and_gradient(model, position)
}

pub fn disturbing_gradient<P: Position>(
    model: impl Into<ModelRef<GravityKey>>,
    position: P,
) -> Result<P::Vector> {
    ModelRegistry::global()?.disturbing_gradient(model, position)
}

/// See [`ModelRegistry::field`].
pub fn field<P: Position>(
    model: impl Into<ModelRef<MagneticKey>>,
    year: f64,
    position: P,
) -> Result<P::Vector> {
    ModelRegistry::global()?.field(model, year, position)
}

/// See [`ModelRegistry::field_and_rate`].
pub fn field_and_rate<P: Position>(
    model: impl Into<ModelRef<MagneticKey>>,
    year: f64,
    position: P,
) -> Result<FieldAndRate<P::Vector>> {
    ModelRegistry::global()?.field_and_rate(model, year, position)
}
