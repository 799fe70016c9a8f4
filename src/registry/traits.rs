//! Consumer-facing lookup trait.

use crate::models::AssetRef;

/// Read-only prefab lookup used by game logic.
///
/// A miss is `None`; callers treat it as "prefab unavailable".
///
/// # Example
///
/// ```
/// use prefabsrc::models::{AssetRef, Entry};
/// use prefabsrc::registry::{PrefabLookup, PrefabRegistry};
///
/// let mut registry = PrefabRegistry::new();
/// registry.add(Entry::new("Tree", 0, AssetRef::from_path("Tree.prefab")));
///
/// assert_eq!(registry.get_by_tag("Tree").map(|r| r.path.as_str()), Some("Tree.prefab"));
/// assert!(registry.get_by_id(7).is_none());
/// ```
pub trait PrefabLookup {
    /// Get the asset registered under `tag` (first match wins).
    fn get_by_tag(&self, tag: &str) -> Option<&AssetRef>;

    /// Get the asset registered under `id` (first match wins).
    fn get_by_id(&self, id: i64) -> Option<&AssetRef>;

    /// Check if any entry carries `tag`.
    fn has_tag(&self, tag: &str) -> bool {
        self.get_by_tag(tag).is_some()
    }

    /// Check if any entry carries `id`.
    fn has_id(&self, id: i64) -> bool {
        self.get_by_id(id).is_some()
    }
}
