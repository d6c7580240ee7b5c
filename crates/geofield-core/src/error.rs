// crates/geofield-core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating datasets, building models or evaluating them.
#[derive(Debug, Error)]
pub enum GeoFieldError {
    /// The dataset could not be fetched or located. Never cached; a later
    /// resolve starts over.
    #[error("dataset `{dataset}` unavailable: {reason}")]
    DatasetUnavailable { dataset: String, reason: String },

    /// The dataset was present but the engine could not build a model from it.
    #[error("failed to construct model `{model}`: {reason}")]
    ModelConstruction { model: String, reason: String },

    /// Raised by an engine when a query falls outside the model's coverage.
    #[error("position ({lat}, {lon}) is outside the coverage of `{model}`")]
    OutOfDomain { model: String, lat: f64, lon: f64 },

    #[error("no geodesy engine installed; call `install_engine` first")]
    EngineNotInstalled,

    #[error("a geodesy engine is already installed")]
    EngineAlreadyInstalled,

    #[error("the global model registry is already initialized")]
    RegistryAlreadyInitialized,

    #[error("unknown model name: {0}")]
    UnknownModel(String),

    #[error("invalid archive for `{dataset}`: {reason}")]
    Archive { dataset: String, reason: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeoFieldError {
    pub fn unavailable(dataset: impl Into<String>, reason: impl ToString) -> Self {
        Self::DatasetUnavailable {
            dataset: dataset.into(),
            reason: reason.to_string(),
        }
    }

    pub fn construction(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelConstruction {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether repeating the failed call can succeed without outside action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DatasetUnavailable { .. } | Self::Io { .. })
    }
}

pub type Result<T, E = GeoFieldError> = std::result::Result<T, E>;
