//! Scene graph bins: definitions and placed references

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::records::{
    DefAmbient, DefBeacon, DefFog, DefLod, DefOmni, DefSound, GroupLoc, GroupProperty, ReplaceTex,
    TintColor,
};
use crate::error::Result;
use crate::formats::bin_store::{BinRecord, BinStore, unknown_chunk};

/// Checksum stamped into scene graph bins.
pub const SCENE_GRAPH_CRC: u32 = 0xD343_2007;

bitflags::bitflags! {
    /// Flags on a scene definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NodeFlags: i32 {
        const UNGROUPABLE = 1;
        const FADE_NODE = 2;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One `Def` (or `RootMod`) record: a named group with an optional model,
/// child placements and attached descriptors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneNodeData {
    pub name: String,
    pub kind: String,
    pub flags: NodeFlags,
    /// Model path, empty for pure containers.
    pub obj: String,
    pub groups: Vec<GroupLoc>,
    pub properties: Vec<GroupProperty>,
    pub tint_colors: Vec<TintColor>,
    pub ambients: Vec<DefAmbient>,
    pub omnis: Vec<DefOmni>,
    pub sounds: Vec<DefSound>,
    pub replace_textures: Vec<ReplaceTex>,
    pub beacons: Vec<DefBeacon>,
    pub fogs: Vec<DefFog>,
    pub lods: Vec<DefLod>,
}

impl BinRecord for SceneNodeData {
    const KIND: &'static str = "Def";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.kind = store.read()?;
        self.flags = NodeFlags::from_bits_retain(store.read()?);
        self.obj = store.read()?;
        Ok(())
    }

    fn read_child(&mut self, name: &str, store: &mut BinStore) -> Result<()> {
        match name {
            "Group" => self.groups.push(store.load_record()?),
            "Property" => self.properties.push(store.load_record()?),
            "TintColor" => self.tint_colors.push(store.load_record()?),
            "Ambient" => self.ambients.push(store.load_record()?),
            "Omni" => self.omnis.push(store.load_record()?),
            "Sound" => self.sounds.push(store.load_record()?),
            "ReplaceTex" => self.replace_textures.push(store.load_record()?),
            "Beacon" => self.beacons.push(store.load_record()?),
            "Fog" => self.fogs.push(store.load_record()?),
            "Lod" => self.lods.push(store.load_record()?),
            _ => return Err(unknown_chunk::<Self>(name)),
        }
        Ok(())
    }
}

/// A top-level placement of a definition (`Ref`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneRootData {
    pub name: String,
    pub pos: Vec3,
    pub rot: Vec3,
}

impl BinRecord for SceneRootData {
    const KIND: &'static str = "Ref";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.pos = store.read()?;
        self.rot = store.read()?;
        Ok(())
    }
}

/// The root record of a scene graph bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraphData {
    pub version: i32,
    pub scene_file: String,
    pub defs: Vec<SceneNodeData>,
    pub refs: Vec<SceneRootData>,
}

impl BinRecord for SceneGraphData {
    const KIND: &'static str = "SceneGraph";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.version = store.read()?;
        self.scene_file = store.read()?;
        Ok(())
    }

    fn read_child(&mut self, name: &str, store: &mut BinStore) -> Result<()> {
        match name {
            "Def" | "RootMod" => self.defs.push(store.load_record()?),
            "Ref" => self.refs.push(store.load_record()?),
            _ => return Err(unknown_chunk::<Self>(name)),
        }
        Ok(())
    }
}

/// Read a scene graph bin.
///
/// # Errors
/// Returns an error if the file cannot be opened, has the wrong checksum
/// or fails to decode.
pub fn read_scene_graph<P: AsRef<Path>>(path: P, expected_crc: u32, max_string_len: usize) -> Result<SceneGraphData> {
    let mut store = BinStore::open(path.as_ref(), expected_crc)?.with_max_string_len(max_string_len);
    let data = parse_scene_graph(&mut store)?;
    tracing::debug!(
        "{}: {} defs, {} refs",
        path.as_ref().display(),
        data.defs.len(),
        data.refs.len()
    );
    Ok(data)
}

/// Load the root record from an opened store.
///
/// # Errors
/// Returns an error if the record tree fails to decode.
pub fn parse_scene_graph(store: &mut BinStore) -> Result<SceneGraphData> {
    store.load_root()
}
