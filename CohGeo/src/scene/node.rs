//! Scene nodes and the descriptors attached to them

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::catalog::ModelRef;
use crate::formats::common::{Aabb, Color32};
use crate::formats::modifiers::GroupFlags;
use crate::formats::scene_graph::{GroupProperty, ReplaceTex};

/// Index of a node inside a [`SceneGraph`](super::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// A child placement: the child node and its local transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChildTransform {
    pub node: NodeId,
    pub transform: Mat4,
}

/// The model drawn by a node, with the metadata bounds need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeModel {
    pub model: ModelRef,
    pub name: String,
    pub bbox: Aabb,
}

/// Prefab library a node was found in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum LibraryLink {
    /// Not looked up yet
    #[default]
    Unresolved,
    /// Looked up and not listed; never retried
    Missing,
    /// Lowercase geo path of the library
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightProperties {
    pub color: Color32,
    pub range: f32,
    pub is_negative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundInfo {
    pub name: String,
    pub radius: f32,
    pub ramp_feet: f32,
    pub flags: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogInfo {
    pub radius: f32,
    pub near: f32,
    pub far: f32,
    pub color1: Color32,
    pub color2: Color32,
}

/// Editor marker such as a traffic or combat beacon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconInfo {
    pub name: String,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TintInfo {
    pub color1: Color32,
    pub color2: Color32,
}

/// Volume and visibility markers copied from a geometry modifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeFlags {
    pub tray: bool,
    pub region_marker: bool,
    pub volume_trigger: bool,
    pub water: bool,
    pub lava: bool,
    pub sewer: bool,
    pub door: bool,
    pub parent_fade: bool,
    pub key_light: bool,
}

impl VolumeFlags {
    #[must_use]
    pub fn from_group_flags(flags: GroupFlags) -> Self {
        Self {
            tray: flags.intersects(GroupFlags::VIS_TRAY | GroupFlags::VIS_OUTSIDE),
            region_marker: flags.contains(GroupFlags::REGION_MARKER),
            volume_trigger: flags.contains(GroupFlags::VOLUME_TRIGGER),
            water: flags.contains(GroupFlags::WATER_VOLUME),
            lava: flags.contains(GroupFlags::LAVA_VOLUME),
            sewer: flags.contains(GroupFlags::SEWER_WATER_VOLUME),
            door: flags.contains(GroupFlags::DOOR_VOLUME),
            parent_fade: flags.contains(GroupFlags::PARENT_FADE),
            key_light: flags.contains(GroupFlags::KEY_LIGHT),
        }
    }
}

/// A definition in the scene: optional model, child placements, bounds and
/// level-of-detail distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub dir: String,
    /// Bin the definition was read from.
    pub src_bin: String,
    /// 0 for the map itself, deeper for prefab libraries.
    pub nest_level: u32,
    pub in_use: bool,

    pub model: Option<NodeModel>,
    pub children: Vec<ChildTransform>,
    pub properties: Vec<GroupProperty>,
    #[serde(skip)]
    pub library: LibraryLink,

    pub bbox: Aabb,
    pub center: Vec3,
    pub radius: f32,
    pub vis_dist: f32,
    pub shadow_dist: f32,

    pub lod_near: f32,
    pub lod_far: f32,
    pub lod_near_fade: f32,
    pub lod_far_fade: f32,
    pub lod_scale: f32,
    /// LOD distances came from the model's geometry modifier.
    pub lod_from_trick: bool,
    pub is_lod_fade_node: bool,
    pub volumes: VolumeFlags,

    pub texture_replacers: Vec<ReplaceTex>,
    pub tint: Option<TintInfo>,
    pub ambient: Option<Color32>,
    pub fog: Option<FogInfo>,
    pub beacon: Option<BeaconInfo>,
    pub sound: Option<SoundInfo>,
    pub light: Option<LightProperties>,
}

impl SceneNode {
    #[must_use]
    pub fn new(id: NodeId, nest_level: u32) -> Self {
        Self {
            id,
            name: String::new(),
            dir: String::new(),
            src_bin: String::new(),
            nest_level,
            in_use: true,
            model: None,
            children: Vec::new(),
            properties: Vec::new(),
            library: LibraryLink::Unresolved,
            bbox: Aabb::EMPTY,
            center: Vec3::ZERO,
            radius: 0.0,
            vis_dist: 0.0,
            shadow_dist: 0.0,
            lod_near: 0.0,
            lod_far: 0.0,
            lod_near_fade: 0.0,
            lod_far_fade: 0.0,
            lod_scale: 0.0,
            lod_from_trick: false,
            is_lod_fade_node: false,
            volumes: VolumeFlags::default(),
            texture_replacers: Vec::new(),
            tint: None,
            ambient: None,
            fog: None,
            beacon: None,
            sound: None,
            light: None,
        }
    }

    /// Full library path of the node, `dir/name`.
    #[must_use]
    pub fn path(&self) -> String {
        if self.dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.dir, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_flags_tray() {
        assert!(VolumeFlags::from_group_flags(GroupFlags::VIS_OUTSIDE).tray);
        assert!(VolumeFlags::from_group_flags(GroupFlags::VIS_TRAY).tray);
        let flags = VolumeFlags::from_group_flags(GroupFlags::WATER_VOLUME | GroupFlags::KEY_LIGHT);
        assert!(flags.water && flags.key_light);
        assert!(!flags.tray && !flags.lava);
    }

    #[test]
    fn test_node_path() {
        let mut node = SceneNode::new(NodeId(0), 0);
        node.name = "box".to_string();
        assert_eq!(node.path(), "box");
        node.dir = "object_library/test".to_string();
        assert_eq!(node.path(), "object_library/test/box");
    }
}
