//! Configuration module for prefabsrc
//!
//! Provides types, discovery and parsing for `prefabs.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
