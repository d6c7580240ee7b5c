// crates/geofield-core/src/registry.rs

//! # Model Registry
//!
//! One [`ModelHandle`] per key, each a once-initialized slot. The first
//! caller to [`ModelRegistry::resolve`] a key locates its dataset and builds
//! the model; concurrent callers for the same key wait for that build and
//! then share its result. Keys never block each other. A failed build leaves
//! the slot empty so a later call can retry.

use crate::coord::Datum;
use crate::engine::{
    GeodesyEngine, GeoidModel, GeoidOptions, GravityModel, GravityOptions, MagneticModel,
};
use crate::error::{GeoFieldError, Result};
use crate::keys::{GeoidKey, GravityKey, MagneticKey, ModelKey};
use crate::store::{DatasetStore, DiskStore};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lazily populated slot for one key's model.
pub struct ModelHandle<K: ModelKey> {
    key: K,
    cell: OnceCell<Arc<K::Model>>,
}

impl<K: ModelKey> ModelHandle<K> {
    fn new(key: K) -> Self {
        Self {
            key,
            cell: OnceCell::new(),
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn dataset_id(&self) -> &'static str {
        self.key.dataset_id()
    }

    /// The model, if it has been built. Never blocks.
    pub fn get(&self) -> Option<&Arc<K::Model>> {
        self.cell.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<K: ModelKey> fmt::Debug for ModelHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("key", &self.key)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// The handles of one kind, indexed by [`ModelKey::index`].
pub struct ModelTable<K: ModelKey> {
    handles: Box<[ModelHandle<K>]>,
}

impl<K: ModelKey> ModelTable<K> {
    fn new() -> Self {
        Self {
            handles: K::ALL.iter().copied().map(ModelHandle::new).collect(),
        }
    }

    pub fn handle(&self, key: K) -> &ModelHandle<K> {
        &self.handles[key.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelHandle<K>> {
        self.handles.iter()
    }
}

/// Keys the registry can build models for.
///
/// Implemented for [`GeoidKey`], [`GravityKey`] and [`MagneticKey`]; each
/// impl selects its table and passes the kind's fixed construction
/// parameters to the engine.
pub trait Registered: ModelKey {
    #[doc(hidden)]
    fn table(registry: &ModelRegistry) -> &ModelTable<Self>;

    #[doc(hidden)]
    fn construct(self, engine: &dyn GeodesyEngine, dir: &Path) -> Result<Arc<Self::Model>>;
}

impl Registered for GeoidKey {
    fn table(registry: &ModelRegistry) -> &ModelTable<Self> {
        &registry.geoids
    }

    fn construct(self, engine: &dyn GeodesyEngine, dir: &Path) -> Result<Arc<dyn GeoidModel>> {
        engine.open_geoid(self.name(), dir, GeoidOptions::default())
    }
}

impl Registered for GravityKey {
    fn table(registry: &ModelRegistry) -> &ModelTable<Self> {
        &registry.gravity
    }

    fn construct(self, engine: &dyn GeodesyEngine, dir: &Path) -> Result<Arc<dyn GravityModel>> {
        engine.open_gravity(self.name(), dir, GravityOptions::default())
    }
}

impl Registered for MagneticKey {
    fn table(registry: &ModelRegistry) -> &ModelTable<Self> {
        &registry.magnetic
    }

    fn construct(self, engine: &dyn GeodesyEngine, dir: &Path) -> Result<Arc<dyn MagneticModel>> {
        engine.open_magnetic(self.name(), dir, Datum::wgs84())
    }
}

/// Cache of every model this process has built.
pub struct ModelRegistry {
    engine: Arc<dyn GeodesyEngine>,
    store: Arc<dyn DatasetStore>,
    geoids: ModelTable<GeoidKey>,
    gravity: ModelTable<GravityKey>,
    magnetic: ModelTable<MagneticKey>,
}

static ENGINE: OnceCell<Arc<dyn GeodesyEngine>> = OnceCell::new();
static GLOBAL: OnceCell<ModelRegistry> = OnceCell::new();

/// Sets the engine used by the process-wide registry. Can be called once.
///
/// Call it before anything touches the global registry. The check against an
/// existing registry is not atomic with the install: if [`install_global`]
/// runs concurrently, this can return `Ok` while the installed registry keeps
/// its own engine, and the engine passed here is never used.
pub fn install_engine(engine: Arc<dyn GeodesyEngine>) -> Result<()> {
    if GLOBAL.get().is_some() {
        return Err(GeoFieldError::RegistryAlreadyInitialized);
    }
    ENGINE
        .set(engine)
        .map_err(|_| GeoFieldError::EngineAlreadyInstalled)
}

/// Installs a fully configured registry as the process-wide one, e.g. to use
/// a custom [`DatasetStore`]. Fails if the global registry already exists.
pub fn install_global(registry: ModelRegistry) -> Result<()> {
    GLOBAL
        .set(registry)
        .map_err(|_| GeoFieldError::RegistryAlreadyInitialized)
}

impl ModelRegistry {
    pub fn new(engine: Arc<dyn GeodesyEngine>, store: Arc<dyn DatasetStore>) -> Self {
        Self {
            engine,
            store,
            geoids: ModelTable::new(),
            gravity: ModelTable::new(),
            magnetic: ModelTable::new(),
        }
    }

    /// The process-wide registry.
    ///
    /// Built on first access from the engine passed to [`install_engine`]
    /// and a [`DiskStore`] configured from the environment, unless a
    /// registry was installed with [`install_global`].
    pub fn global() -> Result<&'static ModelRegistry> {
        GLOBAL.get_or_try_init(|| {
            let engine = ENGINE.get().cloned().ok_or(GeoFieldError::EngineNotInstalled)?;
            Ok(ModelRegistry::new(engine, Arc::new(DiskStore::from_env())))
        })
    }

    /// Returns the shared model for `key`, building it on first use.
    pub fn resolve<K: Registered>(&self, key: K) -> Result<Arc<K::Model>> {
        K::table(self)
            .handle(key)
            .cell
            .get_or_try_init(|| self.instantiate(key))
            .cloned()
    }

    pub fn handle<K: Registered>(&self, key: K) -> &ModelHandle<K> {
        K::table(self).handle(key)
    }

    pub fn is_loaded<K: Registered>(&self, key: K) -> bool {
        self.handle(key).is_loaded()
    }

    /// Keys of kind `K` whose models have been built, in declaration order.
    pub fn loaded_keys<K: Registered>(&self) -> Vec<K> {
        K::table(self)
            .iter()
            .filter(|h| h.is_loaded())
            .map(|h| h.key())
            .collect()
    }

    /// Resolves every key, stopping at the first failure.
    pub fn preload<K: Registered>(&self, keys: impl IntoIterator<Item = K>) -> Result<()> {
        for key in keys {
            self.resolve(key)?;
        }
        Ok(())
    }

    fn instantiate<K: Registered>(&self, key: K) -> Result<Arc<K::Model>> {
        let started = Instant::now();
        let dataset = key.dataset();

        let root = self.store.locate(&dataset)?;
        let dir = root.join(dataset.kind.subdir());
        debug!(model = key.name(), path = %dir.display(), "constructing model");

        let model = key
            .construct(self.engine.as_ref(), &dir)
            .map_err(|e| {
                warn!(model = key.name(), error = %e, "model construction failed");
                match e {
                    e @ GeoFieldError::ModelConstruction { .. } => e,
                    other => GeoFieldError::construction(key.name(), other),
                }
            })?;

        info!(
            kind = %K::KIND,
            model = key.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model loaded"
        );
        Ok(model)
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("geoids", &self.loaded_keys::<GeoidKey>())
            .field("gravity", &self.loaded_keys::<GravityKey>())
            .field("magnetic", &self.loaded_keys::<MagneticKey>())
            .finish_non_exhaustive()
    }
}
