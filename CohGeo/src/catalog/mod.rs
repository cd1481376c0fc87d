//! Geoset catalog
//!
//! Geosets are parsed header-first and memoised by resolved file path.
//! Every name a geoset was requested under is kept as an alias. Payloads are read on the first geometry request.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formats::geo::{GeoSet, GeoSetId, Model};
use crate::formats::modifiers::SceneModifiers;
use crate::geometry::MeshBuffers;
use crate::utils::path::{find_path_case_insensitive, relative_path};

/// A model inside a catalogued geoset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef {
    pub geoset: GeoSetId,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct GeoSetCatalog {
    geosets: Vec<GeoSet>,
    by_name: HashMap<String, GeoSetId>,
    by_path: HashMap<PathBuf, GeoSetId>,
}

impl GeoSetCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a geoset header, or return the cached id.
    ///
    /// `.anm` names are redirected to the matching `.geo`. The file is
    /// looked up case-insensitively under `base_path`, so differently cased
    /// names of one file share a single geoset.
    ///
    /// # Errors
    /// Returns [`Error::PathNotFound`] if the file does not exist, or a
    /// format error if its header is invalid.
    pub fn load(&mut self, name: &str, base_path: &Path, modifiers: &SceneModifiers) -> Result<GeoSetId> {
        if let Some(&id) = self.by_name.get(name) {
            tracing::debug!("geoset cache hit: {name}");
            return Ok(id);
        }

        let geo_name = name.replace(".anm", ".geo");
        let full_path = find_path_case_insensitive(base_path, &geo_name)?;
        if let Some(&id) = self.by_path.get(&full_path) {
            tracing::debug!("geoset {name} resolves to loaded {}", full_path.display());
            self.by_name.insert(name.to_string(), id);
            return Ok(id);
        }
        let geopath = relative_path(full_path.as_path(), base_path).unwrap_or_else(|| geo_name.clone());

        let id = GeoSetId(self.geosets.len());
        let mut geoset = GeoSet::read(&full_path, id, geopath)?;
        geoset.attach_modifiers(modifiers);
        tracing::info!(
            "Loaded geoset {} ({} models, {} textures)",
            geoset.geopath,
            geoset.models.len(),
            geoset.tex_names.len()
        );

        self.geosets.push(geoset);
        self.by_name.insert(name.to_string(), id);
        self.by_path.insert(full_path, id);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: GeoSetId) -> Option<&GeoSet> {
        self.geosets.get(id.0)
    }

    pub fn get_mut(&mut self, id: GeoSetId) -> Option<&mut GeoSet> {
        self.geosets.get_mut(id.0)
    }

    /// Look up a geoset by the name it was loaded under.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&GeoSet> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    #[must_use]
    pub fn model(&self, model: ModelRef) -> Option<&Model> {
        self.get(model.geoset).and_then(|g| g.models.get(model.index))
    }

    /// Decode one model's geometry, reading the geoset payload first if needed.
    ///
    /// # Errors
    /// Returns an error if the geoset is unknown, its payload cannot be read
    /// or the model's streams fail to decode.
    pub fn model_geometry(&mut self, model: ModelRef, decode_bones: bool) -> Result<MeshBuffers> {
        let geoset = self
            .geosets
            .get_mut(model.geoset.0)
            .ok_or_else(|| Error::GeoSetNotFound(format!("{:?}", model.geoset)))?;
        geoset.load_data()?;
        if geoset.is_undecodable(model.index) {
            let name = geoset
                .models
                .get(model.index)
                .map_or_else(|| model.index.to_string(), |m| m.name.clone());
            tracing::warn!("{}: skipping undecodable model {name}", geoset.geopath);
        }
        geoset.model_geometry(model.index, decode_bones)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeoSet> {
        self.geosets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.geosets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geosets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GeoFile, GeoModel};
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_geo(dir: &Path, rel: &str) {
        let bytes = GeoFile::new("doors")
            .texture("white")
            .model(GeoModel::new("door_01").bounds(Vec3::ZERO, Vec3::ONE))
            .encode();
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_load_is_memoised() {
        let dir = tempfile::tempdir().unwrap();
        write_geo(dir.path(), "object_library/City/doors.geo");

        let mut catalog = GeoSetCatalog::new();
        let modifiers = SceneModifiers::default();
        let first = catalog.load("object_library/city/doors.geo", dir.path(), &modifiers).unwrap();
        let second = catalog.load("object_library/city/doors.geo", dir.path(), &modifiers).unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        let geoset = catalog.get(first).unwrap();
        assert_eq!(geoset.geopath, "object_library/City/doors.geo");
        assert_eq!(geoset.models[0].name, "door_01");
    }

    #[test]
    fn test_same_file_under_two_spellings_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        write_geo(dir.path(), "object_library/City/doors.geo");

        let mut catalog = GeoSetCatalog::new();
        let modifiers = SceneModifiers::default();
        let lower = catalog.load("object_library/city/doors.geo", dir.path(), &modifiers).unwrap();
        let mixed = catalog.load("Object_Library/CITY/Doors.geo", dir.path(), &modifiers).unwrap();

        assert_eq!(lower, mixed);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find("Object_Library/CITY/Doors.geo").is_some());
    }

    #[test]
    fn test_anm_redirects_to_geo() {
        let dir = tempfile::tempdir().unwrap();
        write_geo(dir.path(), "player_library/doors.geo");

        let mut catalog = GeoSetCatalog::new();
        let id = catalog
            .load("player_library/doors.anm", dir.path(), &SceneModifiers::default())
            .unwrap();
        assert!(catalog.find("player_library/doors.anm").is_some());
        assert_eq!(catalog.model(ModelRef { geoset: id, index: 0 }).unwrap().name, "door_01");
    }

    #[test]
    fn test_missing_geoset() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = GeoSetCatalog::new();
        let err = catalog
            .load("object_library/none.geo", dir.path(), &SceneModifiers::default())
            .unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unknown_geoset_geometry() {
        let mut catalog = GeoSetCatalog::new();
        let err = catalog
            .model_geometry(ModelRef { geoset: GeoSetId(3), index: 0 }, false)
            .unwrap_err();
        assert!(matches!(err, Error::GeoSetNotFound(_)));
    }
}
