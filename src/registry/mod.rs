//! Prefab registry and lookup.
//!
//! This module provides:
//! - `PrefabRegistry`, the ordered `(tag, id, reference)` store
//! - `PrefabLookup`, the read-only interface game logic queries
//!
//! Lookups are linear scans returning the first match. Tag and id uniqueness
//! is not enforced by `add`; strict insertion and duplicate checks are opt-in.

mod prefab;
mod traits;

pub use prefab::{PrefabRegistry, RegistryError, RegistryWarning};
pub use traits::PrefabLookup;
