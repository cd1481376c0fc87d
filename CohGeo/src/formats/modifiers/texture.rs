use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::flags::TexOpt;
use crate::error::Result;
use crate::formats::bin_store::{BinRecord, BinStore};

/// Per-texture options from `tricks.bin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureModifiers {
    pub name: String,
    pub src_file: String,
    pub gloss: f32,
    /// Surface material name (wood, metal, ...).
    pub surface: String,
    pub fade: Vec2,
    pub scale_st0: Vec2,
    pub scale_st1: Vec2,
    pub blend: String,
    pub bump_map: String,
    pub blend_type: u32,
    pub flags: TexOpt,
}

impl BinRecord for TextureModifiers {
    const KIND: &'static str = "Texture";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.src_file = store.read()?;
        self.gloss = store.read()?;
        self.surface = store.read()?;
        self.fade = store.read()?;
        self.scale_st0 = store.read()?;
        self.scale_st1 = store.read()?;
        self.blend = store.read()?;
        self.bump_map = store.read()?;
        self.blend_type = store.read()?;
        self.flags = TexOpt::from_bits_retain(store.read()?);
        Ok(())
    }
}

fn one_if_zero(v: &mut f32) {
    if *v == 0.0 {
        *v = 1.0;
    }
}

impl TextureModifiers {
    pub fn finish_loading(&mut self) {
        for v in [
            &mut self.scale_st0.x,
            &mut self.scale_st0.y,
            &mut self.scale_st1.x,
            &mut self.scale_st1.y,
        ] {
            one_if_zero(v);
        }
        if self.fade != Vec2::ZERO {
            self.flags |= TexOpt::FADE;
        }
        if !self.blend.is_empty() {
            self.flags |= TexOpt::DUAL;
        }

        let stem = Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.name = stem.trim_start_matches('/').to_string();
    }

    /// Key under which this modifier is indexed.
    pub fn lookup_key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finish_loading() {
        let mut tex = TextureModifiers {
            name: "/texture_library/CITY/Brick_01.tga".into(),
            scale_st0: Vec2::new(0.0, 2.0),
            blend: "detail".into(),
            ..Default::default()
        };
        tex.finish_loading();

        assert_eq!(tex.name, "Brick_01");
        assert_eq!(tex.lookup_key(), "brick_01");
        assert_eq!(tex.scale_st0, Vec2::new(1.0, 2.0));
        assert_eq!(tex.scale_st1, Vec2::ONE);
        assert_eq!(tex.flags, TexOpt::DUAL);
    }

    #[test]
    fn test_fade_sets_flag() {
        let mut tex = TextureModifiers { name: "a".into(), fade: Vec2::new(0.5, 0.0), ..Default::default() };
        tex.finish_loading();
        assert!(tex.flags.contains(TexOpt::FADE));
    }
}
