//! Prefab libraries listed in `defnames.bin`
//!
//! `defnames.bin` is a NUL-separated list of `<geo path>/<model>` entries.
//! A bare `<model>` entry belongs to the geo path of the entry before it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::node::{LibraryLink, SceneNode};
use crate::catalog::{GeoSetCatalog, ModelRef};
use crate::error::Result;
use crate::formats::modifiers::SceneModifiers;

/// One `.geo` file and the models `defnames.bin` lists for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoStoreDef {
    pub geopath: String,
    pub entries: Vec<String>,
    /// Set once the library's scene graph has been pulled in.
    pub loaded: bool,
}

/// What the caller has to do to make a prefab available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefabClaim {
    AlreadyLoaded,
    /// The library was just marked loaded; its geoset and subgraph must be read.
    Load { geopath: String },
}

#[derive(Debug, Default)]
pub struct PrefabStore {
    base_path: PathBuf,
    dir_to_geoset: HashMap<String, GeoStoreDef>,
    modelname_to_geostore: HashMap<String, String>,
}

fn strip_model_suffix(name: &str) -> &str {
    let leaf = name.rsplit('/').next().unwrap_or(name);
    leaf.split_once("__").map_or(leaf, |(base, _)| base)
}

impl PrefabStore {
    /// Read `defnames.bin` at `defnames_path`. Geosets are later resolved
    /// under `base_path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn prepare_geo_lookup<P: AsRef<Path>, Q: AsRef<Path>>(base_path: P, defnames_path: Q) -> Result<Self> {
        let bytes = fs::read(defnames_path.as_ref())?;
        let store = Self::from_defnames(base_path, &String::from_utf8_lossy(&bytes));
        tracing::info!(
            "Loaded {} prefab libraries ({} models) from {}",
            store.dir_to_geoset.len(),
            store.modelname_to_geostore.len(),
            defnames_path.as_ref().display()
        );
        Ok(store)
    }

    /// Build the lookup tables from the contents of `defnames.bin`.
    pub fn from_defnames<P: AsRef<Path>>(base_path: P, contents: &str) -> Self {
        let mut store = Self {
            base_path: base_path.as_ref().to_path_buf(),
            ..Self::default()
        };
        let contents = contents.replace("CHUNKS.geo", "Chunks.geo");
        let mut current: Option<String> = None;

        for entry in contents.split('\0').filter(|e| !e.is_empty()) {
            let model = match entry.rsplit_once('/') {
                Some((geo_path, model)) => {
                    let key = geo_path.to_lowercase();
                    let def = store.dir_to_geoset.entry(key.clone()).or_default();
                    def.geopath = geo_path.to_string();
                    current = Some(key);
                    model
                }
                None => entry,
            };
            let Some(key) = &current else {
                tracing::warn!("defnames entry {entry} has no geo file");
                continue;
            };
            if let Some(def) = store.dir_to_geoset.get_mut(key) {
                def.entries.push(model.to_string());
            }
            store.modelname_to_geostore.insert(model.to_string(), key.clone());
        }
        store
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Forget which libraries were loaded, keeping the lookup tables.
    pub fn scene_graph_was_reset(&mut self) {
        for def in self.dir_to_geoset.values_mut() {
            def.loaded = false;
        }
    }

    fn store_key_for(&self, full_name: &str) -> Option<&String> {
        let key = strip_model_suffix(full_name);
        let found = self.modelname_to_geostore.get(key);
        if found.is_none() {
            tracing::debug!(
                "Failed to get geo file for model {full_name} ({} known)",
                self.modelname_to_geostore.len()
            );
        }
        found
    }

    /// The library listing a model, ignoring directories and any `__` suffix.
    /// Model names are matched case-sensitively.
    #[must_use]
    pub fn file_entry_for(&self, full_name: &str) -> Option<&GeoStoreDef> {
        self.store_key_for(full_name)
            .and_then(|key| self.dir_to_geoset.get(key))
    }

    /// Load `geoset_name` and find the model `model_name` refers to.
    pub fn model_find(
        &self,
        geosets: &mut GeoSetCatalog,
        modifiers: &SceneModifiers,
        geoset_name: &str,
        model_name: &str,
    ) -> Option<ModelRef> {
        if geoset_name.is_empty() || model_name.is_empty() {
            tracing::warn!("Bad model/geometry set requested: model '{model_name}', geo file '{geoset_name}'");
            return None;
        }
        let id = match geosets.load(geoset_name, &self.base_path, modifiers) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Geoset load failed {geoset_name}: {e}");
                return None;
            }
        };
        let base_name = model_name.split_once("__").map_or(model_name, |(base, _)| base);
        let index = geosets.get(id)?.find_prefab_model(base_name)?;
        Some(ModelRef { geoset: id, index })
    }

    /// Find the model for a scene object path such as `object_library/city/door_01`.
    pub fn group_model_find(&self, geosets: &mut GeoSetCatalog, modifiers: &SceneModifiers, path: &str) -> Option<ModelRef> {
        let model_name = path.rsplit('/').next().unwrap_or(path);
        let def = self.file_entry_for(model_name)?;
        self.model_find(geosets, modifiers, &def.geopath, model_name)
    }

    /// Mark the library holding `name` as loaded.
    ///
    /// Returns `None` when no library lists the name.
    pub fn claim_named_prefab(&mut self, name: &str) -> Option<PrefabClaim> {
        let key = self.store_key_for(name)?.clone();
        self.claim(&key)
    }

    /// Mark the library a node belongs to as loaded, caching the lookup on
    /// the node. Nodes not listed anywhere are remembered as missing.
    pub fn claim_for_node(&mut self, node: &mut SceneNode) -> Option<PrefabClaim> {
        if !node.in_use {
            return None;
        }
        if node.library == LibraryLink::Unresolved {
            node.library = match self.store_key_for(&node.name) {
                Some(key) => LibraryLink::Store(key.clone()),
                None => LibraryLink::Missing,
            };
        }
        match &node.library {
            LibraryLink::Store(key) => {
                let key = key.clone();
                self.claim(&key)
            }
            LibraryLink::Unresolved | LibraryLink::Missing => None,
        }
    }

    fn claim(&mut self, key: &str) -> Option<PrefabClaim> {
        let def = self.dir_to_geoset.get_mut(key)?;
        if def.loaded {
            return Some(PrefabClaim::AlreadyLoaded);
        }
        def.loaded = true;
        Some(PrefabClaim::Load {
            geopath: def.geopath.clone(),
        })
    }

    pub fn libraries(&self) -> impl Iterator<Item = &GeoStoreDef> {
        self.dir_to_geoset.values()
    }
}
