//! File format readers
//!
//! - `bin_store`: `CrypticS` nested-chunk container and record traits
//! - `scene_graph`: scene definition and reference records
//! - `modifiers`: geometry and texture modifiers from `tricks.bin`
//! - `geo`: `.geo` geometry sets and model metadata

pub mod bin_store;
pub mod common;
pub mod geo;
pub mod modifiers;
pub mod scene_graph;

pub use bin_store::{BinRecord, BinStore};
pub use common::{Aabb, Color32};
pub use geo::{GeoSet, GeoSetId, Model};
pub use modifiers::{SceneModifiers, read_tricks};
pub use scene_graph::{SceneGraphData, read_scene_graph};
