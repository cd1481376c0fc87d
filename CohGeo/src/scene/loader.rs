//! Build a [`SceneGraph`] from scene graph bins
//!
//! A map bin names its groups; groups it does not define come from prefab
//! libraries, whose own bins are loaded on demand one nesting level deeper.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::graph::{SceneGraph, child_transform, transform_from_ypr_and_translation};
use super::node::{ChildTransform, NodeId, NodeModel};
use super::postprocess::{apply_modifiers, postprocess_node};
use super::prefab::{PrefabClaim, PrefabStore};
use crate::catalog::GeoSetCatalog;
use crate::config::ImportConfig;
use crate::error::Result;
use crate::formats::modifiers::SceneModifiers;
use crate::formats::scene_graph::{SceneGraphData, SceneNodeData, SceneRootData, read_scene_graph};
use crate::utils::path::{find_path_case_insensitive, with_extension};

const OBJECT_LIBRARY: &str = "object_library/";

/// Everything a load writes into or reads from, borrowed from the session.
pub struct LoadTarget<'a> {
    pub config: &'a ImportConfig,
    pub prefabs: &'a mut PrefabStore,
    pub modifiers: &'a SceneModifiers,
    pub geosets: &'a mut GeoSetCatalog,
    pub graph: &'a mut SceneGraph,
}

/// Group renames local to one scene file.
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    pub basename: String,
    /// Lowercase original leaf to new name
    pub new_names: HashMap<String, String>,
}

/// True when `name` refers into a prefab library rather than the map.
#[must_use]
pub fn group_in_lib_sub(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower.contains('/') {
        !lower.starts_with("maps")
    } else {
        !lower.starts_with("grp")
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn file_stem(path: &str) -> &str {
    let leaf = path.rsplit('/').next().unwrap_or(path);
    leaf.rsplit_once('.').map_or(leaf, |(stem, _)| stem)
}

#[derive(Debug, Clone)]
pub struct LoadingContext {
    pub base_path: PathBuf,
    pub nesting_level: u32,
    pub renamer: Renamer,
}

impl LoadingContext {
    pub fn new<P: Into<PathBuf>>(base_path: P, nesting_level: u32) -> Self {
        Self {
            base_path: base_path.into(),
            nesting_level,
            renamer: Renamer::default(),
        }
    }

    /// Map a group name to the name it is known by in the graph.
    ///
    /// Map-local groups (`grp*`/`map*`) defined in this file get a name
    /// suffixed with the file's basename so they cannot collide with
    /// groups of the same name from other files.
    pub fn group_rename(&mut self, name: &str, is_def: bool) -> String {
        if group_in_lib_sub(name) {
            return name.to_string();
        }
        let leaf = name.rsplit('/').next().unwrap_or(name);
        if !starts_with_ignore_case(leaf, "grp") && !starts_with_ignore_case(leaf, "map") {
            return leaf.to_string();
        }
        let key = leaf.to_lowercase();
        if let Some(renamed) = self.renamer.new_names.get(&key) {
            return renamed.clone();
        }
        if !is_def {
            return leaf.to_string();
        }
        let renamed = format!("{leaf}_{}", self.renamer.basename);
        tracing::debug!("renamed {leaf} to {renamed}");
        self.renamer.new_names.insert(key, renamed.clone());
        renamed
    }

    /// Load `path` (relative to the geobin directory, any extension) into
    /// the target graph.
    ///
    /// # Errors
    /// Returns an error if the bin cannot be found, opened or decoded.
    pub fn load_scene_graph(&mut self, target: &mut LoadTarget<'_>, path: &str) -> Result<()> {
        let bin_path = with_extension(path, "bin");
        let relative = format!("{}/{bin_path}", target.config.geobin_dir);
        let full_path = find_path_case_insensitive(&self.base_path, &relative)?;
        let data = read_scene_graph(&full_path, target.config.scene_graph_crc, target.config.max_string_len)?;
        tracing::info!(
            "Loaded scene graph {} ({} defs, {} refs)",
            bin_path,
            data.defs.len(),
            data.refs.len()
        );
        self.renamer.basename = file_stem(&bin_path).to_string();
        self.serialize_in(target, &data, &bin_path);
        Ok(())
    }

    /// Add every definition, then every top-level reference.
    pub fn serialize_in(&mut self, target: &mut LoadTarget<'_>, data: &SceneGraphData, bin_path: &str) {
        for def in &data.defs {
            self.add_node(target, def, bin_path);
        }
        for root in &data.refs {
            self.add_root(target, root);
        }
    }

    /// Load the scene bin that accompanies a prefab library's geo file.
    pub fn load_subgraph(&self, target: &mut LoadTarget<'_>, geopath: &str) {
        let txt = match geopath.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{}.txt", file_stem(geopath)),
            None => format!("{}.txt", file_stem(geopath)),
        };
        let mut child = Self::new(self.base_path.clone(), self.nesting_level + 1);
        if let Err(e) = child.load_scene_graph(target, &txt) {
            tracing::warn!("Failed to load subgraph {txt}: {e}");
        }
    }

    fn load_library(&self, target: &mut LoadTarget<'_>, geopath: &str) {
        let base_path = target.prefabs.base_path().to_path_buf();
        if let Err(e) = target.geosets.load(geopath, &base_path, target.modifiers) {
            tracing::warn!("Failed to load prefab geoset {geopath}: {e}");
        }
        self.load_subgraph(target, geopath);
    }

    /// Make sure the library defining `name` is loaded.
    pub fn load_named_prefab(&self, target: &mut LoadTarget<'_>, name: &str) -> bool {
        match target.prefabs.claim_named_prefab(name) {
            None => false,
            Some(PrefabClaim::AlreadyLoaded) => true,
            Some(PrefabClaim::Load { geopath }) => {
                self.load_library(target, &geopath);
                target
                    .graph
                    .node_by_name(name)
                    .is_some_and(|id| self.load_prefab_for_node(target, id))
            }
        }
    }

    /// Make sure the library a node belongs to is loaded.
    pub fn load_prefab_for_node(&self, target: &mut LoadTarget<'_>, id: NodeId) -> bool {
        let Some(node) = target.graph.node_mut(id) else {
            return false;
        };
        match target.prefabs.claim_for_node(node) {
            None => false,
            Some(PrefabClaim::AlreadyLoaded) => true,
            Some(PrefabClaim::Load { geopath }) => {
                self.load_library(target, &geopath);
                true
            }
        }
    }

    /// Set a node's name and directory from its object path and register it.
    pub fn set_node_name_and_path(graph: &mut SceneGraph, id: NodeId, obj_path: &str) {
        let obj_path = obj_path.replace('\\', "/");
        let mut path = if starts_with_ignore_case(&obj_path, OBJECT_LIBRARY) {
            obj_path[OBJECT_LIBRARY.len()..].to_string()
        } else {
            obj_path
        };
        if group_in_lib_sub(&path) {
            path.insert_str(0, OBJECT_LIBRARY);
        }
        let (dir, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
        let (dir, name) = (dir.to_string(), name.to_string());

        graph.register_name(&name, id);
        if let Some(node) = graph.node_mut(id) {
            node.name = name;
            node.dir = dir;
        }
    }

    fn add_child_nodes(&mut self, target: &mut LoadTarget<'_>, id: NodeId, def: &SceneNodeData) {
        for group in &def.groups {
            let new_name = self.group_rename(&group.name, false);
            let mut child = target.graph.node_by_name(&new_name);
            if child.is_none() {
                if !self.load_named_prefab(target, &new_name) {
                    tracing::warn!("Cannot load named prefab {new_name}");
                }
                child = target.graph.node_by_name(&new_name);
            }
            let child = child.filter(|c| target.graph.node(*c).is_some_and(|n| n.in_use));

            let Some(node) = target.graph.node_mut(id) else {
                return;
            };
            match child {
                Some(child) => node.children.push(ChildTransform {
                    node: child,
                    transform: child_transform(group.pos, group.rot),
                }),
                None => tracing::warn!("Node {} can't find member {}", node.name, group.name),
            }
        }
    }

    /// Turn a definition into a scene node.
    ///
    /// Returns false when the definition is empty, or when it ends up with
    /// neither children nor a model.
    pub fn add_node(&mut self, target: &mut LoadTarget<'_>, def: &SceneNodeData, bin_path: &str) -> bool {
        if def.groups.is_empty() && def.obj.is_empty() {
            return false;
        }
        let obj_path = self.group_rename(&def.name, true);
        let id = match target.graph.node_by_name(&obj_path) {
            Some(id) => id,
            None => {
                let id = target.graph.new_def(self.nesting_level);
                if let Some(node) = target.graph.node_mut(id) {
                    node.src_bin = bin_path.to_string();
                    node.properties.clone_from(&def.properties);
                }
                id
            }
        };

        if !def.obj.is_empty() {
            self.attach_model(target, id, &def.obj);
        }
        Self::set_node_name_and_path(target.graph, id, &obj_path);
        self.add_child_nodes(target, id, def);

        let Some(node) = target.graph.node_mut(id) else {
            return false;
        };
        if node.children.is_empty() && node.model.is_none() {
            tracing::debug!("Dropping def {} after conversion: no children, no model", def.name);
            node.in_use = false;
            return false;
        }
        node.in_use = true;
        postprocess_node(node, def);

        let children = target.graph.child_extents(id);
        if let Some(node) = target.graph.node_mut(id) {
            if node.calculate_bounds(&children) {
                tracing::debug!("{}: children give a zero radius", node.name);
            }
            node.set_vis_bounds(&children);
        }
        true
    }

    fn attach_model(&self, target: &mut LoadTarget<'_>, id: NodeId, obj: &str) {
        let found = target.prefabs.group_model_find(target.geosets, target.modifiers, obj);
        let model = found.and_then(|model_ref| {
            target.geosets.model(model_ref).map(|m| NodeModel {
                model: model_ref,
                name: m.name.clone(),
                bbox: m.bbox,
            })
        });
        if model.is_none() {
            tracing::warn!("Cannot find root geometry in {obj}");
        }
        let mods = model
            .as_ref()
            .and_then(|m| target.modifiers.find_geometry_modifier(&m.name));

        let Some(node) = target.graph.node_mut(id) else {
            return;
        };
        if let Some(mods) = mods {
            apply_modifiers(node, mods);
        }
        node.model = model;
    }

    /// Place a definition at the top level of the map.
    pub fn add_root(&mut self, target: &mut LoadTarget<'_>, root: &SceneRootData) {
        let new_name = self.group_rename(&root.name, false);
        let mut found = target.graph.node_by_name(&new_name);
        if found.is_none() && self.load_named_prefab(target, &new_name) {
            found = target.graph.node_by_name(&new_name);
        }
        let found = found.filter(|id| target.graph.node(*id).is_some_and(|n| n.in_use));
        match found {
            Some(id) => {
                target
                    .graph
                    .new_ref(id, transform_from_ypr_and_translation(root.rot, root.pos));
            }
            None => tracing::warn!(
                "{}: Missing reference: {} => {new_name}",
                self.renamer.basename,
                root.name
            ),
        }
    }
}

/// Split a map path into the data root and the map path inside the geobin
/// directory, fixing the casing of well-known map directories.
///
/// Without a geobin component the whole path is taken as relative to
/// `fallback_base`.
#[must_use]
pub fn split_map_path(path: &str, geobin_dir: &str, fallback_base: &Path) -> (PathBuf, String) {
    let normalized = path.replace('\\', "/");
    let base = normalized
        .find(geobin_dir)
        .map_or_else(|| fallback_base.to_path_buf(), |idx| PathBuf::from(&normalized[..idx]));

    let mut fixed = normalized
        .replace("city_", "City_")
        .replace("hazard_", "Hazard_")
        .replace("/trial_", "/Trial_");
    if let Some(rest) = fixed.strip_prefix("trial_") {
        fixed = format!("Trial_{rest}");
    }
    let fixed = fixed.replace("zones_", "Zones_");

    let map = fixed.find("maps").map_or(fixed.as_str(), |idx| &fixed[idx..]);
    (base, map.to_string())
}
