#![allow(non_snake_case)]
//! # cohgeo
//!
//! A pure-Rust decoder for City of Heroes client asset formats.
//!
//! ## Supported Formats
//!
//! - **Scene graph bins** - `CrypticS`/`Parse4` nested-chunk records under `geobin/`
//! - **tricks.bin** - Geometry and texture modifiers
//! - **defnames.bin** - Prefab library directory
//! - **GEO** - Geometry sets with delta-packed, zlib-compressed mesh streams
//!
//! ## Quick Start
//!
//! ### Loading a Map
//!
//! ```no_run
//! use cohgeo::prelude::*;
//!
//! let mut session = ImportSession::prepare("coh_data/", ImportConfig::default())?;
//! let mut graph = session.load_whole_map("maps/City_Zones/City_01_01/City_01_01.txt")?;
//!
//! for (name, id) in graph.calculate_usages() {
//!     let node = &graph.nodes[id.0];
//!     println!("{name}: radius {:.1}, visible to {:.1}", node.radius, node.vis_dist);
//! }
//! # Ok::<(), cohgeo::Error>(())
//! ```
//!
//! ### Decoding a Single Geo File
//!
//! ```no_run
//! use cohgeo::formats::geo::{GeoSet, GeoSetId};
//!
//! let mut geoset = GeoSet::read("doors.geo", GeoSetId(0), "doors.geo")?;
//! geoset.load_data()?;
//! let mesh = geoset.model_geometry(0, true)?;
//! println!("{} triangles", mesh.triangles.len());
//! # Ok::<(), cohgeo::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `cohgeo` command-line binary

pub mod catalog;
pub mod compression;
pub mod config;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod scene;
pub mod session;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::catalog::{GeoSetCatalog, ModelRef};
    pub use crate::config::ImportConfig;
    pub use crate::error::{Error, Result};
    pub use crate::formats::bin_store::{BinRecord, BinStore};
    pub use crate::formats::common::{Aabb, Color32};
    pub use crate::formats::geo::{GeoSet, GeoSetId, Model, ModelFlags, TextureBind};
    pub use crate::formats::modifiers::{GeometryModifiers, SceneModifiers, TextureModifiers, read_tricks};
    pub use crate::formats::scene_graph::{SceneGraphData, read_scene_graph};
    pub use crate::geometry::MeshBuffers;
    pub use crate::scene::{NodeId, NodeState, RootNode, SceneGraph, SceneNode};
    pub use crate::session::ImportSession;
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
