//! In-memory scene hierarchy rebuilt from scene graph bins

pub mod bounds;
pub mod graph;
pub mod loader;
pub mod node;
pub mod postprocess;
pub mod prefab;

pub use bounds::ChildExtent;
pub use graph::{
    NodeState, RootNode, SceneGraph, child_transform, transform_from_ypr_and_translation, ypr_rotation,
};
pub use loader::{LoadTarget, LoadingContext, Renamer, group_in_lib_sub, split_map_path};
pub use node::{
    BeaconInfo, ChildTransform, FogInfo, LibraryLink, LightProperties, NodeId, NodeModel, SceneNode,
    SoundInfo, TintInfo, VolumeFlags,
};
pub use prefab::{GeoStoreDef, PrefabClaim, PrefabStore};
