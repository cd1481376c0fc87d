//! Import session: the prefab directory, modifier tables and geoset catalog
//! shared by every map loaded from one game data root.

use std::path::{Path, PathBuf};

use crate::catalog::{GeoSetCatalog, ModelRef};
use crate::config::ImportConfig;
use crate::error::Result;
use crate::formats::modifiers::{SceneModifiers, read_tricks};
use crate::geometry::MeshBuffers;
use crate::scene::{LoadTarget, LoadingContext, PrefabStore, SceneGraph, split_map_path};
use crate::utils::path::find_path_case_insensitive;

#[derive(Debug)]
pub struct ImportSession {
    pub base_path: PathBuf,
    pub config: ImportConfig,
    pub prefabs: PrefabStore,
    pub modifiers: SceneModifiers,
    pub geosets: GeoSetCatalog,
}

impl ImportSession {
    /// Read `defnames.bin` and `tricks.bin` under `base_path`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or either file
    /// cannot be found or decoded.
    pub fn prepare<P: AsRef<Path>>(base_path: P, config: ImportConfig) -> Result<Self> {
        config.validate()?;
        let base_path = base_path.as_ref().to_path_buf();

        let defnames = find_path_case_insensitive(&base_path, &config.defnames_path)?;
        let prefabs = PrefabStore::prepare_geo_lookup(&base_path, &defnames)?;

        let tricks = find_path_case_insensitive(&base_path, &config.tricks_path)?;
        let modifiers = read_tricks(&tricks, config.tricks_crc, config.max_string_len)?;

        Ok(Self {
            base_path,
            config,
            prefabs,
            modifiers,
            geosets: GeoSetCatalog::new(),
        })
    }

    /// Forget which prefab libraries were pulled in, keeping decoded data.
    pub fn scene_graph_was_reset(&mut self) {
        self.prefabs.scene_graph_was_reset();
    }

    /// Load a map and every prefab library it references.
    ///
    /// `path` is either a path containing the geobin directory or a map
    /// path such as `maps/City_Zones/City_01_01/City_01_01.txt`.
    ///
    /// # Errors
    /// Returns an error if the map's own scene bin cannot be loaded.
    /// Missing prefabs, models and geosets are logged and skipped.
    pub fn load_whole_map(&mut self, path: &str) -> Result<SceneGraph> {
        let (base, map) = split_map_path(path, &self.config.geobin_dir, &self.base_path);
        self.scene_graph_was_reset();

        let mut graph = SceneGraph::new();
        let mut ctx = LoadingContext::new(base, 0);
        let mut target = LoadTarget {
            config: &self.config,
            prefabs: &mut self.prefabs,
            modifiers: &self.modifiers,
            geosets: &mut self.geosets,
            graph: &mut graph,
        };
        ctx.load_scene_graph(&mut target, &map)?;
        tracing::info!(
            "Loaded map {map}: {} nodes, {} roots, {} geosets",
            graph.nodes.len(),
            graph.root_refs().count(),
            self.geosets.len()
        );
        Ok(graph)
    }

    /// Decode one model's geometry.
    ///
    /// # Errors
    /// Returns an error if the geoset payload cannot be read or the model
    /// fails to decode.
    pub fn model_geometry(&mut self, model: ModelRef) -> Result<MeshBuffers> {
        self.geosets.model_geometry(model, self.config.decode_bone_data)
    }
}
