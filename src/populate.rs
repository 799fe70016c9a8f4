//! Merging a catalog into a registry.
//!
//! For each candidate in catalog order, the populator skips it if an entry
//! already references the same asset (under the configured [`DedupKey`]),
//! otherwise it appends `{tag: name, id: len, reference}` where `len` is the
//! registry length just before the insertion. Entries are never removed or
//! updated, so re-running against an unchanged catalog is a no-op.
//!
//! Ids are positional, not a stable counter: after manual removals a later
//! run can hand out an id that an existing entry already carries. Strict mode
//! turns such collisions into errors instead.
//!
//! # Example
//!
//! ```
//! use prefabsrc::catalog::CatalogItem;
//! use prefabsrc::models::AssetRef;
//! use prefabsrc::populate::Populator;
//! use prefabsrc::registry::PrefabRegistry;
//!
//! let catalog = vec![
//!     CatalogItem::new("Tree", AssetRef::from_path("Tree.prefab")),
//!     CatalogItem::new("Rock", AssetRef::from_path("Rock.prefab")),
//! ];
//! let mut registry = PrefabRegistry::new();
//! let report = Populator::new(&catalog).run(&mut registry).unwrap();
//!
//! assert_eq!(report.added, vec![0, 1]);
//! assert_eq!(registry.find_by_tag("Rock").unwrap().id, 1);
//! ```

use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::models::{DedupKey, Entry};
use crate::registry::{PrefabRegistry, RegistryError};

/// Error during a populate run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PopulateError {
    /// The catalog could not be enumerated
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A new entry collided with an existing tag or id (strict mode)
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome of a populate run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Registry indices of the entries appended by this run
    pub added: Vec<usize>,
    /// Candidates skipped because they were already registered
    pub skipped: usize,
}

impl PopulateReport {
    /// Number of entries added.
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    /// Check whether the run changed the registry.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty()
    }
}

/// Populate run over a catalog.
pub struct Populator<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    dedup: DedupKey,
    strict: bool,
}

impl<'a, C: Catalog + ?Sized> Populator<'a, C> {
    /// Create a populator with path dedup and lenient insertion.
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog, dedup: DedupKey::Path, strict: false }
    }

    /// Set the rule used to recognise already-registered assets.
    pub fn with_dedup(mut self, dedup: DedupKey) -> Self {
        self.dedup = dedup;
        self
    }

    /// Set strict mode (reject new entries whose tag or id is taken).
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Merge the catalog into `registry`.
    ///
    /// In strict mode the registry is left untouched when any new entry
    /// would collide.
    pub fn run(&self, registry: &mut PrefabRegistry) -> Result<PopulateReport, PopulateError> {
        let candidates = self.catalog.candidates()?;

        let mut working = if self.strict { Some(registry.clone()) } else { None };
        let target = working.as_mut().unwrap_or(&mut *registry);

        let mut report = PopulateReport::default();
        for candidate in candidates {
            if target.contains_reference(&candidate.reference, self.dedup) {
                tracing::debug!(path = %candidate.reference, "already registered, skipping");
                report.skipped += 1;
                continue;
            }

            let index = target.len();
            let entry = Entry::new(candidate.name, index as i64, candidate.reference);
            tracing::debug!(tag = %entry.tag, id = entry.id, path = %entry.reference, "registering prefab");
            if self.strict {
                target.add_strict(entry)?;
            } else {
                target.add(entry);
            }
            report.added.push(index);
        }

        if let Some(working) = working {
            *registry = working;
        }

        tracing::info!(added = report.added.len(), skipped = report.skipped, "populate finished");
        Ok(report)
    }
}

/// Merge `catalog` into `registry` with path dedup and lenient insertion.
pub fn populate<C: Catalog + ?Sized>(
    registry: &mut PrefabRegistry,
    catalog: &C,
) -> Result<PopulateReport, PopulateError> {
    Populator::new(catalog).run(registry)
}
