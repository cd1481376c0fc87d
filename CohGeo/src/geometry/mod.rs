//! Delta-pack geometry decompression

pub mod buffers;
pub mod delta;
pub mod unpack;

pub use buffers::MeshBuffers;
pub use delta::{unpack_float_deltas, unpack_int_deltas};
pub use unpack::{BoneData, unpack_bone_data, unpack_pack};
