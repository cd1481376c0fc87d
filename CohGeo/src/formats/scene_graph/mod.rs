//! Scene graph bin records (`geobin/**/*.bin`)

pub mod document;
pub mod records;

pub use document::{
    NodeFlags, SCENE_GRAPH_CRC, SceneGraphData, SceneNodeData, SceneRootData, parse_scene_graph,
    read_scene_graph,
};
pub use records::{
    DefAmbient, DefBeacon, DefFog, DefLod, DefOmni, DefSound, GroupLoc, GroupProperty, ReplaceTex,
    TintColor,
};
