//! End-to-end registry scenarios through the public library API.

use std::fs;

use prefabsrc::catalog::{CatalogItem, DirectoryCatalog};
use prefabsrc::models::{AssetRef, DedupKey, Entry};
use prefabsrc::populate::{populate, Populator};
use prefabsrc::registry::{PrefabLookup, PrefabRegistry};
use prefabsrc::store;
use tempfile::TempDir;

fn refs(names: &[(&str, &str)]) -> Vec<CatalogItem> {
    names.iter().map(|(name, path)| CatalogItem::new(*name, AssetRef::from_path(*path))).collect()
}

#[test]
fn test_tree_rock_bush_scenario() {
    let mut registry = PrefabRegistry::from_entries(vec![
        Entry::new("Tree", 0, AssetRef::from_path("refA")),
        Entry::new("Rock", 1, AssetRef::from_path("refB")),
    ]);
    let catalog = refs(&[("Tree", "refA"), ("Bush", "refC")]);

    populate(&mut registry, &catalog).unwrap();

    assert_eq!(
        registry.entries(),
        &[
            Entry::new("Tree", 0, AssetRef::from_path("refA")),
            Entry::new("Rock", 1, AssetRef::from_path("refB")),
            Entry::new("Bush", 2, AssetRef::from_path("refC")),
        ]
    );
    assert_eq!(registry.find_by_tag("Rock"), Some(&Entry::new("Rock", 1, AssetRef::from_path("refB"))));
    assert_eq!(registry.find_by_id(2), Some(&Entry::new("Bush", 2, AssetRef::from_path("refC"))));
    assert!(registry.find_by_tag("Missing").is_none());
}

#[test]
fn test_n_new_references_get_ids_in_catalog_order() {
    let catalog: Vec<_> = (0..10)
        .map(|i| CatalogItem::new(format!("prefab_{}", 9 - i), AssetRef::from_path(format!("p{}", i))))
        .collect();
    let mut registry = PrefabRegistry::new();

    let report = populate(&mut registry, &catalog).unwrap();

    assert_eq!(report.added, (0..10).collect::<Vec<_>>());
    for (i, entry) in registry.iter().enumerate() {
        assert_eq!(entry.id, i as i64);
        assert_eq!(entry.tag, catalog[i].name);
    }
}

#[test]
fn test_directory_populate_persist_reload() {
    let temp = TempDir::new().unwrap();
    let assets = temp.path().join("Assets");
    fs::create_dir_all(assets.join("nature")).unwrap();
    fs::write(assets.join("nature/Tree.prefab"), "tree").unwrap();
    fs::write(assets.join("Rock.prefab"), "rock").unwrap();

    let catalog = DirectoryCatalog::new(&assets);
    let mut registry = PrefabRegistry::new();
    Populator::new(&catalog).with_dedup(DedupKey::Content).run(&mut registry).unwrap();

    let path = temp.path().join("prefabs.json");
    store::save(&registry, &path).unwrap();
    let mut reloaded = store::load(&path).unwrap();
    assert_eq!(reloaded, registry);

    // Second run against the unchanged directory changes nothing
    let report = Populator::new(&catalog).with_dedup(DedupKey::Content).run(&mut reloaded).unwrap();
    assert!(report.is_unchanged());

    let tree = reloaded.get_by_tag("Tree").unwrap();
    assert_eq!(tree.path, "nature/Tree.prefab");
    assert_eq!(reloaded.get_by_id(0).unwrap().path, "Rock.prefab");
}

#[test]
fn test_lookup_through_trait_object() {
    let mut registry = PrefabRegistry::new();
    registry.add(Entry::new("Tree", 0, AssetRef::from_path("Tree.prefab")));

    let lookup: &dyn PrefabLookup = &registry;
    assert!(lookup.has_tag("Tree"));
    assert!(!lookup.has_id(-1));
}
