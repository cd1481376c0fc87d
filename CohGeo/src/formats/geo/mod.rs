//! `.geo` geometry sets
//!
//! # Example
//!
//! ```no_run
//! use cohgeo::formats::geo::{GeoSet, GeoSetId};
//!
//! let mut geoset = GeoSet::read("object_library/city/doors.geo", GeoSetId(0), "object_library/city/doors.geo")?;
//! geoset.load_data()?;
//! for (index, model) in geoset.models.iter().enumerate() {
//!     let mesh = geoset.model_geometry(index, true)?;
//!     println!("{}: {} vertices", model.name, mesh.vertex_count());
//! }
//! # Ok::<(), cohgeo::Error>(())
//! ```

pub mod geoset;
pub mod header;
pub mod model;
pub mod types;

pub use geoset::GeoSet;
pub use header::{GeoHeader, ModelRecord, parse_geo_header_bytes, read_geo_header};
pub use model::Model;
pub use types::{BlendMode, DeltaPack, GeoSetId, ModelFlags, PackBlock, TextureBind};
