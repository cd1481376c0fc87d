//! Geometry and texture modifiers (`tricks.bin`)

pub mod flags;
pub mod geometry;
pub mod store;
pub mod texture;

pub use flags::{GroupFlags, TexOpt, TrickFlags};
pub use geometry::{GeometryModifiers, ModelModifiers, TextureAnim, TrickSource};
pub use store::{SceneModifiers, TRICKS_CRC, read_tricks};
pub use texture::TextureModifiers;
