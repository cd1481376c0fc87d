//! Geoset descriptor types: delta packs, texture binds, model flags

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Index of a geoset inside a [`GeoSetCatalog`](crate::catalog::GeoSetCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeoSetId(pub usize);

/// One attribute stream of a model inside the geoset payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPack {
    /// Zero when the stream is stored raw.
    pub compressed_size: u32,
    /// Zero when the model has no data of this kind.
    pub uncomp_size: u32,
    pub buffer_offset: u32,
}

impl DeltaPack {
    pub fn is_present(&self) -> bool {
        self.uncomp_size != 0
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed_size != 0
    }

    /// Number of bytes the stream occupies in the payload.
    pub fn stored_len(&self) -> usize {
        if self.is_compressed() {
            self.compressed_size as usize
        } else {
            self.uncomp_size as usize
        }
    }

    /// Byte range of the stream inside the payload, `None` for absent streams.
    pub fn window(&self) -> Option<Range<usize>> {
        if !self.is_present() {
            return None;
        }
        let start = self.buffer_offset as usize;
        Some(start..start + self.stored_len())
    }

    /// Borrow the stored bytes of this stream from the payload.
    ///
    /// # Errors
    /// Returns [`Error::PackOutOfBounds`] if the window does not fit the payload.
    pub fn slice<'a>(&self, payload: &'a [u8]) -> Result<Option<&'a [u8]>> {
        let Some(range) = self.window() else {
            return Ok(None);
        };
        payload
            .get(range.clone())
            .map(Some)
            .ok_or(Error::PackOutOfBounds {
                offset: range.start,
                end: range.end,
                payload_len: payload.len(),
            })
    }
}

/// The seven attribute streams of a model, in file order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackBlock {
    pub tris: DeltaPack,
    pub verts: DeltaPack,
    pub norms: DeltaPack,
    pub sts: DeltaPack,
    pub weights: DeltaPack,
    pub matidxs: DeltaPack,
    pub grid: DeltaPack,
}

impl PackBlock {
    pub const NAMES: [&'static str; 7] = ["tris", "verts", "norms", "sts", "weights", "matidxs", "grid"];

    pub fn from_array(packs: [DeltaPack; 7]) -> Self {
        let [tris, verts, norms, sts, weights, matidxs, grid] = packs;
        Self { tris, verts, norms, sts, weights, matidxs, grid }
    }

    pub fn as_array(&self) -> [DeltaPack; 7] {
        [self.tris, self.verts, self.norms, self.sts, self.weights, self.matidxs, self.grid]
    }

    /// Named streams, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, DeltaPack)> {
        Self::NAMES.into_iter().zip(self.as_array())
    }
}

/// A run of triangles drawn with one texture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureBind {
    pub tex_idx: u16,
    pub tri_count: u16,
}

bitflags::bitflags! {
    /// Per-model render flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ModelFlags: u32 {
        const ALPHASORT = 0x1;
        const FULLBRIGHT = 0x4;
        const NOLIGHTANGLE = 0x10;
        const DUALTEXTURE = 0x40;
        const LOD = 0x80;
        const TREE = 0x100;
        const DUALTEX_NORMAL = 0x200;
        const FORCEOPAQUE = 0x400;
        const BUMPMAP = 0x800;
        const WORLDFX = 0x1000;
        const CUBEMAP = 0x2000;
        /// Skinned like an entity; the model carries bone weights.
        const DRAW_AS_ENT = 0x4000;
        const STATICFX = 0x8000;
        const HIDE = 0x10000;
    }
}

impl Default for ModelFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Texture blending mode of a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Multiply,
    MultiplyReg,
    ColorBlendDual,
    AddGlow,
    AlphaDetail,
    BumpMapMultiply,
    BumpMapColorBlendDual,
    Invalid,
}

impl BlendMode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Multiply,
            1 => Self::MultiplyReg,
            2 => Self::ColorBlendDual,
            3 => Self::AddGlow,
            4 => Self::AlphaDetail,
            5 => Self::BumpMapMultiply,
            6 => Self::BumpMapColorBlendDual,
            _ => Self::Invalid,
        }
    }

    pub fn is_color_blend(self) -> bool {
        matches!(self, Self::ColorBlendDual | Self::BumpMapColorBlendDual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pack_window() {
        let raw = DeltaPack { compressed_size: 0, uncomp_size: 12, buffer_offset: 4 };
        assert_eq!(raw.window(), Some(4..16));

        let packed = DeltaPack { compressed_size: 5, uncomp_size: 12, buffer_offset: 4 };
        assert_eq!(packed.window(), Some(4..9));

        let absent = DeltaPack { compressed_size: 5, uncomp_size: 0, buffer_offset: 4 };
        assert_eq!(absent.window(), None);
        assert_eq!(absent.slice(&[]).unwrap(), None);
    }

    #[test]
    fn test_pack_slice_out_of_bounds() {
        let pack = DeltaPack { compressed_size: 0, uncomp_size: 8, buffer_offset: 4 };
        assert!(matches!(
            pack.slice(&[0u8; 10]),
            Err(Error::PackOutOfBounds { offset: 4, end: 12, payload_len: 10 })
        ));
        assert_eq!(pack.slice(&[1u8; 12]).unwrap(), Some(&[1u8; 8][..]));
    }

    #[test]
    fn test_blend_mode_from_u8() {
        assert_eq!(BlendMode::from_u8(3), BlendMode::AddGlow);
        assert_eq!(BlendMode::from_u8(200), BlendMode::Invalid);
        assert!(BlendMode::from_u8(6).is_color_blend());
    }
}
