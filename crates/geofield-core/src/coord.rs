// crates/geofield-core/src/coord.rs

//! # Positions, Vectors and the Reference Datum
//!
//! Two position frames are supported:
//! - [`Lla`]: geodetic latitude/longitude (degrees) and ellipsoidal height (meters).
//!   Vectors evaluated at an `Lla` are expressed in the local tangent frame ([`Enu`]).
//! - [`Ecef`]: earth-centered, earth-fixed Cartesian coordinates (meters).
//!   Vectors evaluated at an `Ecef` are expressed as [`EcefVector`].
//!
//! All frame conversions go through the single WGS84 [`Datum`].

use nalgebra::{Matrix3, Vector3};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// -----------------------------------------------------------------------------
// POSITIONS
// -----------------------------------------------------------------------------

/// Geodetic position: latitude and longitude in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lla {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Lla {
    pub const fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }
}

impl fmt::Display for Lla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}°, {:.6}°, {:.3} m)", self.lat, self.lon, self.alt)
    }
}

/// Earth-centered, earth-fixed position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<Lla> for Ecef {
    fn from(p: Lla) -> Self {
        Datum::wgs84().to_ecef(p)
    }
}

impl From<Ecef> for Lla {
    fn from(p: Ecef) -> Self {
        Datum::wgs84().to_geodetic(p)
    }
}

// -----------------------------------------------------------------------------
// VECTORS
// -----------------------------------------------------------------------------

/// Vector in the local east/north/up tangent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub const fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }

    pub fn norm(&self) -> f64 {
        Vector3::from(*self).norm()
    }
}

/// Vector along the earth-fixed Cartesian axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EcefVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EcefVector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        Vector3::from(*self).norm()
    }
}

impl From<Enu> for Vector3<f64> {
    fn from(v: Enu) -> Self {
        Vector3::new(v.east, v.north, v.up)
    }
}

impl From<Vector3<f64>> for Enu {
    fn from(v: Vector3<f64>) -> Self {
        Enu::new(v.x, v.y, v.z)
    }
}

impl From<EcefVector> for Vector3<f64> {
    fn from(v: EcefVector) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f64>> for EcefVector {
    fn from(v: Vector3<f64>) -> Self {
        EcefVector::new(v.x, v.y, v.z)
    }
}

macro_rules! impl_vector_ops {
    ($ty:ty) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                (Vector3::from(self) + Vector3::from(rhs)).into()
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                (Vector3::from(self) - Vector3::from(rhs)).into()
            }
        }
    };
}

impl_vector_ops!(Enu);
impl_vector_ops!(EcefVector);

/// A position in either frame, for callers that only know the frame at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnyPosition {
    Geodetic(Lla),
    Cartesian(Ecef),
}

/// A vector tagged with the frame of the position it was evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnyVector {
    Geodetic(Enu),
    Cartesian(EcefVector),
}

impl From<Lla> for AnyPosition {
    fn from(p: Lla) -> Self {
        AnyPosition::Geodetic(p)
    }
}

impl From<Ecef> for AnyPosition {
    fn from(p: Ecef) -> Self {
        AnyPosition::Cartesian(p)
    }
}

// -----------------------------------------------------------------------------
// ELLIPSOID & DATUM
// -----------------------------------------------------------------------------

/// Reference ellipsoid given by its equatorial radius and flattening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// First eccentricity squared.
    #[inline]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Semi-minor axis in meters.
    #[inline]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Prime vertical radius of curvature, given the sine of the geodetic latitude.
    #[inline]
    fn prime_vertical(&self, sin_phi: f64) -> f64 {
        self.a / (1.0 - self.e2() * sin_phi * sin_phi).sqrt()
    }

    pub fn to_ecef(&self, p: Lla) -> Ecef {
        let (sin_phi, cos_phi) = p.lat.to_radians().sin_cos();
        let (sin_lam, cos_lam) = p.lon.to_radians().sin_cos();
        let n = self.prime_vertical(sin_phi);
        Ecef {
            x: (n + p.alt) * cos_phi * cos_lam,
            y: (n + p.alt) * cos_phi * sin_lam,
            z: (n * (1.0 - self.e2()) + p.alt) * sin_phi,
        }
    }

    /// Inverse of [`Ellipsoid::to_ecef`], iterated to machine precision.
    ///
    /// The height is computed as `p·cosφ + z·sinφ − a²/N`, which stays well
    /// conditioned at the poles.
    pub fn to_geodetic(&self, p: Ecef) -> Lla {
        let e2 = self.e2();
        let rho = p.x.hypot(p.y);
        let lon = p.y.atan2(p.x);

        let mut phi = p.z.atan2(rho * (1.0 - e2));
        for _ in 0..16 {
            let n = self.prime_vertical(phi.sin());
            let next = (p.z + e2 * n * phi.sin()).atan2(rho);
            let done = (next - phi).abs() < 1e-15;
            phi = next;
            if done {
                break;
            }
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let alt = rho * cos_phi + p.z * sin_phi - self.a * (1.0 - e2 * sin_phi * sin_phi).sqrt();
        Lla {
            lat: phi.to_degrees(),
            lon: lon.to_degrees(),
            alt,
        }
    }
}

/// A named geodetic reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    pub name: String,
    pub ellipsoid: Ellipsoid,
}

static WGS84_DATUM: Lazy<Datum> = Lazy::new(|| {
    tracing::debug!("initializing WGS84 reference datum");
    Datum {
        name: "WGS84".to_string(),
        ellipsoid: Ellipsoid::WGS84,
    }
});

impl Datum {
    /// The process-wide WGS84 datum. Built once on first access.
    pub fn wgs84() -> &'static Datum {
        &WGS84_DATUM
    }

    pub fn to_ecef(&self, p: Lla) -> Ecef {
        self.ellipsoid.to_ecef(p)
    }

    pub fn to_geodetic(&self, p: Ecef) -> Lla {
        self.ellipsoid.to_geodetic(p)
    }

    /// Columns are the east, north and up unit vectors in ECEF axes.
    fn enu_basis(lat: f64, lon: f64) -> Matrix3<f64> {
        let (sp, cp) = lat.to_radians().sin_cos();
        let (sl, cl) = lon.to_radians().sin_cos();
        Matrix3::from_columns(&[
            Vector3::new(-sl, cl, 0.0),
            Vector3::new(-sp * cl, -sp * sl, cp),
            Vector3::new(cp * cl, cp * sl, sp),
        ])
    }

    /// Rotates a local tangent vector at (`lat`, `lon`) onto the ECEF axes.
    pub fn enu_to_ecef(&self, lat: f64, lon: f64, v: Enu) -> EcefVector {
        (Self::enu_basis(lat, lon) * Vector3::from(v)).into()
    }

    /// Rotates an ECEF vector into the local tangent frame at (`lat`, `lon`).
    pub fn ecef_to_enu(&self, lat: f64, lon: f64, v: EcefVector) -> Enu {
        (Self::enu_basis(lat, lon).transpose() * Vector3::from(v)).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn equator_prime_meridian_maps_to_semi_major_axis() {
        let p = Ecef::from(Lla::new(0.0, 0.0, 0.0));
        assert!(close(p.x, 6_378_137.0, 1e-6));
        assert!(close(p.y, 0.0, 1e-6));
        assert!(close(p.z, 0.0, 1e-6));
    }

    #[test]
    fn north_pole_maps_to_semi_minor_axis() {
        let e = Ellipsoid::WGS84;
        let p = e.to_ecef(Lla::new(90.0, 0.0, 100.0));
        assert!(close(p.x, 0.0, 1e-6));
        assert!(close(p.z, e.b() + 100.0, 1e-6));

        let back = e.to_geodetic(p);
        assert!(close(back.lat, 90.0, 1e-12));
        assert!(close(back.alt, 100.0, 1e-6));
    }

    #[test]
    fn geodetic_round_trip_is_sub_millimetre() {
        let samples = [
            Lla::new(47.3769, 8.5417, 408.0),
            Lla::new(-33.8688, 151.2093, -30.0),
            Lla::new(89.9, -120.0, 8_000.0),
            Lla::new(-45.0, 179.999, 400_000.0),
        ];
        for p in samples {
            let back = Lla::from(Ecef::from(p));
            assert!(close(back.lat, p.lat, 1e-10), "{p} -> {back}");
            assert!(close(back.lon, p.lon, 1e-10), "{p} -> {back}");
            assert!(close(back.alt, p.alt, 1e-4), "{p} -> {back}");
        }
    }

    #[test]
    fn up_vector_points_radially_on_equator() {
        let d = Datum::wgs84();
        let v = d.enu_to_ecef(0.0, 90.0, Enu::new(0.0, 0.0, 1.0));
        assert!(close(v.x, 0.0, 1e-12));
        assert!(close(v.y, 1.0, 1e-12));
        assert!(close(v.z, 0.0, 1e-12));

        let east = d.enu_to_ecef(0.0, 0.0, Enu::new(1.0, 0.0, 0.0));
        assert!(close(east.y, 1.0, 1e-12));
    }

    #[test]
    fn tangent_rotation_is_orthonormal() {
        let d = Datum::wgs84();
        let v = Enu::new(3.0, -4.0, 12.0);
        let r = d.enu_to_ecef(52.5, 13.4, v);
        assert!(close(r.norm(), 13.0, 1e-12));
        let back = d.ecef_to_enu(52.5, 13.4, r);
        assert!(close(back.east, 3.0, 1e-12));
        assert!(close(back.north, -4.0, 1e-12));
        assert!(close(back.up, 12.0, 1e-12));
    }

    #[test]
    fn wgs84_datum_is_a_singleton() {
        assert!(std::ptr::eq(Datum::wgs84(), Datum::wgs84()));
        assert_eq!(Datum::wgs84().name, "WGS84");
    }
}
