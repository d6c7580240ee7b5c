//! geofield-cli
//! ============
//!
//! Command-line tool for managing the datasets behind `geofield-core`.
//!
//! This crate primarily provides a binary (`geofield`). The library target
//! exists so that docs.rs renders an overview page.
//!
//! Quick start
//! -----------
//!
//! ```text
//! cargo install geofield-cli
//! ```
//!
//! ```text
//! geofield --help
//! geofield list --kind gravity
//! geofield fetch --all-defaults
//! geofield fetch egm2008-1 igrf13
//! geofield path egm96-5
//! geofield --offline list
//! ```
//!
//! Datasets are stored under `GEOFIELD_DATA_DIR` (default: the platform cache
//! directory) and fetched from `GEOFIELD_BASE_URL`. For model evaluation use
//! the [`geofield-core`] crate directly.
//!
//! Links
//! -----
//! - Repository: <https://github.com/holg/geofield-rs>
//! - Core crate: <https://docs.rs/geofield-core>
//!
#![cfg_attr(docsrs, feature(doc_cfg))]
