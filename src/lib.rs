//! Prefabsrc - Library for registering prefabs by tag and id
//!
//! This library provides functionality to:
//! - Store an ordered registry of `(tag, id, reference)` prefab entries
//! - Look prefabs up by tag or id (first match wins)
//! - Populate the registry from a catalog of prefab assets, skipping ones
//!   already registered
//! - Persist the registry as JSON and configure projects with `prefabs.toml`

pub mod catalog;
pub mod cli;
pub mod config;
pub mod init;
pub mod models;
pub mod populate;
pub mod registry;
pub mod store;
pub mod telemetry;
