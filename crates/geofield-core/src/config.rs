// crates/geofield-core/src/config.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://downloads.sourceforge.net/project/geographiclib";

pub const ENV_DATA_DIR: &str = "GEOFIELD_DATA_DIR";
pub const ENV_BASE_URL: &str = "GEOFIELD_BASE_URL";
pub const ENV_OFFLINE: &str = "GEOFIELD_OFFLINE";

/// Where datasets live and where missing ones are fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub base_url: String,
    /// Never touch the network; missing datasets are reported as unavailable.
    pub offline: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            base_url: DEFAULT_BASE_URL.to_string(),
            offline: false,
        }
    }
}

impl StoreConfig {
    /// `<platform cache dir>/geofield`, or `./.geofield` when the platform has none.
    pub fn default_data_dir() -> PathBuf {
        dirs::cache_dir()
            .map(|d| d.join("geofield"))
            .unwrap_or_else(|| PathBuf::from(".geofield"))
    }

    /// Reads `GEOFIELD_DATA_DIR`, `GEOFIELD_BASE_URL` and `GEOFIELD_OFFLINE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|s| !s.trim().is_empty()) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|s| !s.trim().is_empty()) {
            cfg.base_url = url.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_OFFLINE) {
            cfg.offline = parse_flag(&flag);
        }
        cfg
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = StoreConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert!(!cfg.offline);
        assert!(cfg.data_dir.ends_with("geofield") || cfg.data_dir.ends_with(".geofield"));
    }

    #[test]
    fn environment_overrides() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/srv/geofield"),
            (ENV_BASE_URL, " https://mirror.example/gl "),
            (ENV_OFFLINE, "TRUE"),
        ]));
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/geofield"));
        assert_eq!(cfg.base_url, "https://mirror.example/gl");
        assert!(cfg.offline);
    }

    #[test]
    fn blank_values_are_ignored() {
        let cfg = StoreConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "  "), (ENV_OFFLINE, "0")]));
        assert_eq!(cfg.data_dir, StoreConfig::default_data_dir());
        assert!(!cfg.offline);
    }
}
