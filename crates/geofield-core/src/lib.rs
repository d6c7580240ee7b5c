// crates/geofield-core/src/lib.rs

pub mod config; // Store configuration (env + builder)
pub mod coord; // Positions, vectors, WGS84 datum
pub mod engine; // The numerical engine seam
pub mod error;
pub mod field; // Model selection + frame dispatch
pub mod keys; // Closed model enumerations
pub mod registry; // Lazy, process-wide model cache
pub mod store; // Dataset download / unpack / locate

// Re-exports
pub use crate::config::StoreConfig;
pub use crate::coord::{AnyPosition, AnyVector, Datum, Ecef, EcefVector, Ellipsoid, Enu, Lla};
pub use crate::engine::{
    FieldAndRate, GeodesyEngine, GeoidModel, GeoidOptions, GravityModel, GravityOptions,
    MagneticModel, Potential,
};
pub use crate::error::{GeoFieldError, Result};
pub use crate::field::{
    centrifugal_gradient, centrifugal_potential_and_gradient, disturbing_gradient,
    disturbing_potential_and_gradient, field, field_and_rate, gravitational_gradient,
    gravitational_potential_and_gradient, height, inertial_gradient,
    inertial_potential_and_gradient, resolve, DefaultModel, HeightModel, ModelRef, Position,
};
pub use crate::keys::{AnyKey, DatasetRef, GeoidKey, GravityKey, MagneticKey, ModelKey, ModelKind};
pub use crate::registry::{install_engine, install_global, ModelHandle, ModelRegistry, Registered};
pub use crate::store::{DatasetStatus, DatasetStore, DiskStore};

pub mod prelude {
    pub use crate::{
        DefaultModel, Ecef, EcefVector, Enu, GeoFieldError, GeoidKey, GravityKey, Lla,
        MagneticKey, ModelKey, ModelRegistry, Position, Result,
    };
}
