//! inistore-registry library entry point.
//!
//! Hosts [`StoreRegistry`], which hands out one shared
//! [`ConfigStore`](inistore_core::ConfigStore) per INI file path and forwards
//! path-keyed calls to it.

pub mod registry;

pub use registry::StoreRegistry;
