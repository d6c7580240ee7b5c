//! geofield-rs
//! ===========
//!
//! Workspace facade over [`geofield_core`]. It hosts the demos under
//! `demos/` (`cargo run --example basic_usage`) and re-exports the core
//! crate so they can be written against a single import path.
//!
//! See the `geofield-core` docs for the registry and evaluation API, and
//! the `geofield` binary in `geofield-cli` for dataset management.
pub use geofield_core::*;
