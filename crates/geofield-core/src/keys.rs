// crates/geofield-core/src/keys.rs

//! # Model Keys
//!
//! Every loadable model is named by a variant of one of three closed
//! enumerations: [`GeoidKey`], [`GravityKey`] and [`MagneticKey`]. Each key
//! maps to exactly one dataset. Adding a model means adding a variant; the
//! exhaustive matches below then refuse to compile until its dataset name is
//! filled in.

use crate::engine::{GeoidModel, GravityModel, MagneticModel};
use crate::error::{GeoFieldError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// The three families of models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Geoid,
    Gravity,
    Magnetic,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Geoid, ModelKind::Gravity, ModelKind::Magnetic];

    /// Directory inside an unpacked dataset that holds the model files.
    pub fn subdir(self) -> &'static str {
        match self {
            ModelKind::Geoid => "geoids",
            ModelKind::Gravity => "gravity",
            ModelKind::Magnetic => "magnetic",
        }
    }

    /// Remote directory the archives for this kind are published under.
    pub fn distrib(self) -> &'static str {
        match self {
            ModelKind::Geoid => "geoids-distrib",
            ModelKind::Gravity => "gravity-distrib",
            ModelKind::Magnetic => "magnetic-distrib",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::Geoid => "geoid",
            ModelKind::Gravity => "gravity",
            ModelKind::Magnetic => "magnetic",
        })
    }
}

impl FromStr for ModelKind {
    type Err = GeoFieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geoid" | "geoids" => Ok(ModelKind::Geoid),
            "gravity" => Ok(ModelKind::Gravity),
            "magnetic" => Ok(ModelKind::Magnetic),
            other => Err(GeoFieldError::UnknownModel(other.to_string())),
        }
    }
}

/// The dataset behind a key: what to download and where it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    /// Unique dataset identifier, e.g. `geoids-egm96-5`.
    pub id: &'static str,
    pub kind: ModelKind,
    /// Model name as understood by the engine, e.g. `egm96-5`.
    pub name: &'static str,
}

impl DatasetRef {
    pub fn archive_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}.zip",
            base_url.trim_end_matches('/'),
            self.kind.distrib(),
            self.name
        )
    }
}

/// Behaviour shared by the three key enumerations.
///
/// `Model` ties a key to the model trait it resolves to, so a gravity key can
/// never be handed to an operation that expects a magnetic model.
pub trait ModelKey:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    type Model: ?Sized + Send + Sync;

    const KIND: ModelKind;
    /// The model used when a caller names none.
    const DEFAULT: Self;
    /// Every key, in declaration order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
    fn dataset_id(self) -> &'static str;

    /// Position of this key in [`ModelKey::ALL`].
    fn index(self) -> usize;

    fn dataset(self) -> DatasetRef {
        DatasetRef {
            id: self.dataset_id(),
            kind: Self::KIND,
            name: self.name(),
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s) || k.dataset_id().eq_ignore_ascii_case(s))
    }
}

macro_rules! key_boilerplate {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = GeoFieldError;

            fn from_str(s: &str) -> Result<Self> {
                <$ty as ModelKey>::from_name(s)
                    .ok_or_else(|| GeoFieldError::UnknownModel(s.to_string()))
            }
        }
    };
}

// -----------------------------------------------------------------------------
// GEOIDS
// -----------------------------------------------------------------------------

/// Gridded geoid models.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeoidKey {
    Egm2008_1,
    Egm2008_2_5,
    Egm2008_5,
    Egm96_5,
    Egm96_15,
    Egm84_15,
    Egm84_30,
}

impl ModelKey for GeoidKey {
    type Model = dyn GeoidModel;

    const KIND: ModelKind = ModelKind::Geoid;
    const DEFAULT: Self = GeoidKey::Egm96_5;
    const ALL: &'static [Self] = &[
        GeoidKey::Egm2008_1,
        GeoidKey::Egm2008_2_5,
        GeoidKey::Egm2008_5,
        GeoidKey::Egm96_5,
        GeoidKey::Egm96_15,
        GeoidKey::Egm84_15,
        GeoidKey::Egm84_30,
    ];

    fn name(self) -> &'static str {
        match self {
            GeoidKey::Egm2008_1 => "egm2008-1",
            GeoidKey::Egm2008_2_5 => "egm2008-2_5",
            GeoidKey::Egm2008_5 => "egm2008-5",
            GeoidKey::Egm96_5 => "egm96-5",
            GeoidKey::Egm96_15 => "egm96-15",
            GeoidKey::Egm84_15 => "egm84-15",
            GeoidKey::Egm84_30 => "egm84-30",
        }
    }

    fn dataset_id(self) -> &'static str {
        match self {
            GeoidKey::Egm2008_1 => "geoids-egm2008-1",
            GeoidKey::Egm2008_2_5 => "geoids-egm2008-2_5",
            GeoidKey::Egm2008_5 => "geoids-egm2008-5",
            GeoidKey::Egm96_5 => "geoids-egm96-5",
            GeoidKey::Egm96_15 => "geoids-egm96-15",
            GeoidKey::Egm84_15 => "geoids-egm84-15",
            GeoidKey::Egm84_30 => "geoids-egm84-30",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

key_boilerplate!(GeoidKey);

// -----------------------------------------------------------------------------
// GRAVITY
// -----------------------------------------------------------------------------

/// Spherical-harmonic gravity models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GravityKey {
    Grs80,
    Wgs84,
    Egm84,
    Egm96,
    Egm2008,
}

impl ModelKey for GravityKey {
    type Model = dyn GravityModel;

    const KIND: ModelKind = ModelKind::Gravity;
    const DEFAULT: Self = GravityKey::Egm96;
    const ALL: &'static [Self] = &[
        GravityKey::Grs80,
        GravityKey::Wgs84,
        GravityKey::Egm84,
        GravityKey::Egm96,
        GravityKey::Egm2008,
    ];

    fn name(self) -> &'static str {
        match self {
            GravityKey::Grs80 => "grs80",
            GravityKey::Wgs84 => "wgs84",
            GravityKey::Egm84 => "egm84",
            GravityKey::Egm96 => "egm96",
            GravityKey::Egm2008 => "egm2008",
        }
    }

    fn dataset_id(self) -> &'static str {
        match self {
            GravityKey::Grs80 => "gravity-grs80",
            GravityKey::Wgs84 => "gravity-wgs84",
            GravityKey::Egm84 => "gravity-egm84",
            GravityKey::Egm96 => "gravity-egm96",
            GravityKey::Egm2008 => "gravity-egm2008",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

key_boilerplate!(GravityKey);

// -----------------------------------------------------------------------------
// MAGNETIC
// -----------------------------------------------------------------------------

/// Time-dependent spherical-harmonic magnetic field models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MagneticKey {
    Emm2010,
    Emm2015,
    Emm2017,
    Igrf11,
    Igrf12,
    Igrf13,
    Wmm2010,
    Wmm2015,
    Wmm2015v2,
    Wmm2020,
}

impl ModelKey for MagneticKey {
    type Model = dyn MagneticModel;

    const KIND: ModelKind = ModelKind::Magnetic;
    const DEFAULT: Self = MagneticKey::Wmm2020;
    const ALL: &'static [Self] = &[
        MagneticKey::Emm2010,
        MagneticKey::Emm2015,
        MagneticKey::Emm2017,
        MagneticKey::Igrf11,
        MagneticKey::Igrf12,
        MagneticKey::Igrf13,
        MagneticKey::Wmm2010,
        MagneticKey::Wmm2015,
        MagneticKey::Wmm2015v2,
        MagneticKey::Wmm2020,
    ];

    fn name(self) -> &'static str {
        match self {
            MagneticKey::Emm2010 => "emm2010",
            MagneticKey::Emm2015 => "emm2015",
            MagneticKey::Emm2017 => "emm2017",
            MagneticKey::Igrf11 => "igrf11",
            MagneticKey::Igrf12 => "igrf12",
            MagneticKey::Igrf13 => "igrf13",
            MagneticKey::Wmm2010 => "wmm2010",
            MagneticKey::Wmm2015 => "wmm2015",
            MagneticKey::Wmm2015v2 => "wmm2015v2",
            MagneticKey::Wmm2020 => "wmm2020",
        }
    }

    fn dataset_id(self) -> &'static str {
        match self {
            MagneticKey::Emm2010 => "magnetic-emm2010",
            MagneticKey::Emm2015 => "magnetic-emm2015",
            MagneticKey::Emm2017 => "magnetic-emm2017",
            MagneticKey::Igrf11 => "magnetic-igrf11",
            MagneticKey::Igrf12 => "magnetic-igrf12",
            MagneticKey::Igrf13 => "magnetic-igrf13",
            MagneticKey::Wmm2010 => "magnetic-wmm2010",
            MagneticKey::Wmm2015 => "magnetic-wmm2015",
            MagneticKey::Wmm2015v2 => "magnetic-wmm2015v2",
            MagneticKey::Wmm2020 => "magnetic-wmm2020",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

key_boilerplate!(MagneticKey);

// -----------------------------------------------------------------------------
// ANY KEY (runtime selection, used by tooling)
// -----------------------------------------------------------------------------

/// A key of any kind, for callers that pick models by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnyKey {
    Geoid(GeoidKey),
    Gravity(GravityKey),
    Magnetic(MagneticKey),
}

impl AnyKey {
    /// Every key of every kind.
    pub fn all() -> impl Iterator<Item = AnyKey> {
        GeoidKey::ALL
            .iter()
            .copied()
            .map(AnyKey::Geoid)
            .chain(GravityKey::ALL.iter().copied().map(AnyKey::Gravity))
            .chain(MagneticKey::ALL.iter().copied().map(AnyKey::Magnetic))
    }

    pub fn defaults() -> [AnyKey; 3] {
        [
            AnyKey::Geoid(GeoidKey::DEFAULT),
            AnyKey::Gravity(GravityKey::DEFAULT),
            AnyKey::Magnetic(MagneticKey::DEFAULT),
        ]
    }

    pub fn kind(self) -> ModelKind {
        match self {
            AnyKey::Geoid(_) => ModelKind::Geoid,
            AnyKey::Gravity(_) => ModelKind::Gravity,
            AnyKey::Magnetic(_) => ModelKind::Magnetic,
        }
    }

    pub fn dataset(self) -> DatasetRef {
        match self {
            AnyKey::Geoid(k) => k.dataset(),
            AnyKey::Gravity(k) => k.dataset(),
            AnyKey::Magnetic(k) => k.dataset(),
        }
    }

    pub fn is_default(self) -> bool {
        Self::defaults().contains(&self)
    }
}

impl fmt::Display for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset().name)
    }
}

impl FromStr for AnyKey {
    type Err = GeoFieldError;

    fn from_str(s: &str) -> Result<Self> {
        GeoidKey::from_name(s)
            .map(AnyKey::Geoid)
            .or_else(|| GravityKey::from_name(s).map(AnyKey::Gravity))
            .or_else(|| MagneticKey::from_name(s).map(AnyKey::Magnetic))
            .ok_or_else(|| GeoFieldError::UnknownModel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_table<K: ModelKey>() {
        for (i, k) in K::ALL.iter().enumerate() {
            assert_eq!(k.index(), i, "{k:?} out of declaration order");
            assert!(k.dataset_id().starts_with(K::KIND.distrib().trim_end_matches("-distrib")));
        }
        let ids: HashSet<_> = K::ALL.iter().map(|k| k.dataset_id()).collect();
        assert_eq!(ids.len(), K::ALL.len(), "duplicate dataset ids");
        assert!(K::ALL.contains(&K::DEFAULT));
    }

    #[test]
    fn key_tables_are_consistent() {
        assert_table::<GeoidKey>();
        assert_table::<GravityKey>();
        assert_table::<MagneticKey>();
    }

    #[test]
    fn dataset_ids_are_unique_across_kinds() {
        let ids: HashSet<_> = AnyKey::all().map(|k| k.dataset().id).collect();
        assert_eq!(ids.len(), AnyKey::all().count());
    }

    #[test]
    fn keys_order_by_declaration() {
        assert!(GeoidKey::Egm2008_1 < GeoidKey::Egm84_30);
        assert!(GravityKey::Grs80 < GravityKey::Egm2008);
        assert!(MagneticKey::Emm2010 < MagneticKey::Wmm2020);
    }

    #[test]
    fn defaults() {
        assert_eq!(GeoidKey::DEFAULT, GeoidKey::Egm96_5);
        assert_eq!(GravityKey::DEFAULT, GravityKey::Egm96);
        assert_eq!(MagneticKey::DEFAULT, MagneticKey::Wmm2020);
        assert!(AnyKey::Gravity(GravityKey::Egm96).is_default());
        assert!(!AnyKey::Gravity(GravityKey::Egm2008).is_default());
    }

    #[test]
    fn parse_by_name_or_dataset_id() {
        assert_eq!("EGM96-5".parse::<GeoidKey>().unwrap(), GeoidKey::Egm96_5);
        assert_eq!("gravity-egm2008".parse::<GravityKey>().unwrap(), GravityKey::Egm2008);
        assert_eq!(
            "wmm2015v2".parse::<AnyKey>().unwrap(),
            AnyKey::Magnetic(MagneticKey::Wmm2015v2)
        );
        assert_eq!("egm96".parse::<AnyKey>().unwrap(), AnyKey::Gravity(GravityKey::Egm96));
        assert!(matches!(
            "egm96".parse::<MagneticKey>(),
            Err(GeoFieldError::UnknownModel(_))
        ));
    }

    #[test]
    fn archive_url_layout() {
        let d = GeoidKey::Egm96_5.dataset();
        assert_eq!(
            d.archive_url("https://example.org/geographiclib/"),
            "https://example.org/geographiclib/geoids-distrib/egm96-5.zip"
        );
        assert_eq!(MagneticKey::Wmm2020.dataset().kind.subdir(), "magnetic");
    }
}
