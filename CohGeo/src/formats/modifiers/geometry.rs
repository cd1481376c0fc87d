//! Geometry modifiers ("tricks") and the per-model state derived from them

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::flags::{GroupFlags, TrickFlags};
use crate::error::Result;
use crate::formats::bin_store::{BinRecord, BinStore, unknown_chunk};
use crate::formats::common::Color32;

/// Render state a model picks up from its trick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelModifiers {
    pub flags: TrickFlags,
    pub scroll_st0: Vec2,
    pub scroll_st1: Vec2,
    pub tex_scale: Vec2,
    pub tint_color0: Color32,
    pub tint_color1: Color32,
    pub sort_bias: f32,
    /// The geometry modifier this state was copied from, if any.
    pub source: Option<TrickSource>,
}

/// Back reference from a model's trick state to its geometry modifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickSource {
    pub name: String,
    pub obj_flags: u32,
}

/// A texture animation attached to a trick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureAnim {
    pub speed: f32,
    pub st_scale: f32,
    pub scroll_type: String,
    pub flags: i32,
}

impl BinRecord for TextureAnim {
    const KIND: &'static str = "StAnim";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.speed = store.read()?;
        self.st_scale = store.read()?;
        self.scroll_type = store.read()?;
        self.flags = store.read()?;
        Ok(())
    }
}

/// A named trick from `tricks.bin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryModifiers {
    pub name: String,
    pub src_name: String,
    pub node: ModelModifiers,
    pub gfx_flags: i32,
    pub obj_flags: u32,
    pub group_flags: GroupFlags,
    pub lod_near: f32,
    pub lod_far: f32,
    pub lod_near_fade: f32,
    pub lod_far_fade: f32,
    pub lod_scale: f32,
    pub st_anim: Vec<TextureAnim>,
    pub fog_dist: Vec2,
    pub shadow_dist: f32,
    pub alpha_ref: f32,
    pub obj_tex_bias: f32,
    pub night_glow: Vec2,
    pub sway: f32,
    pub sway_rotate: f32,
}

impl BinRecord for GeometryModifiers {
    const KIND: &'static str = "Trick";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.src_name = store.read()?;
        self.lod_far = store.read()?;
        self.lod_far_fade = store.read()?;
        self.lod_near = store.read()?;
        self.lod_near_fade = store.read()?;
        self.node.flags = TrickFlags::from_bits_retain(store.read()?);
        self.obj_flags = store.read()?;
        self.gfx_flags = store.read()?;
        self.group_flags = GroupFlags::from_bits_retain(store.read()?);
        self.sway = store.read()?;
        self.sway_rotate = store.read()?;
        self.alpha_ref = store.read()?;
        self.fog_dist = store.read()?;
        self.node.sort_bias = store.read()?;
        self.node.scroll_st0 = store.read()?;
        self.node.scroll_st1 = store.read()?;
        self.shadow_dist = store.read()?;
        self.night_glow = store.read()?;
        self.node.tint_color0 = store.read()?;
        self.node.tint_color1 = store.read()?;
        self.obj_tex_bias = store.read()?;
        Ok(())
    }

    fn read_child(&mut self, name: &str, store: &mut BinStore) -> Result<()> {
        match name {
            "StAnim" => self.st_anim.push(store.load_record()?),
            _ => return Err(unknown_chunk::<Self>(name)),
        }
        Ok(())
    }
}

impl GeometryModifiers {
    /// Normalise the raw record: default tints, scaled alpha reference and
    /// the trick flags implied by non-zero fields.
    pub fn finish_loading(&mut self) {
        if self.node.tint_color0.rgb_is_zero() {
            self.node.tint_color0 = Color32::WHITE;
        }
        if self.node.tint_color1.rgb_is_zero() {
            self.node.tint_color1 = Color32::WHITE;
        }
        self.alpha_ref /= 255.0;

        let implied = [
            (self.obj_tex_bias != 0.0, TrickFlags::TEX_BIAS),
            (self.alpha_ref != 0.0, TrickFlags::ALPHA_REF),
            (self.fog_dist != Vec2::ZERO, TrickFlags::FOG_HAS_START_AND_END),
            (self.shadow_dist != 0.0, TrickFlags::CAST_SHADOW),
            (self.night_glow != Vec2::ZERO, TrickFlags::NIGHT_GLOW),
            (self.node.scroll_st0 != Vec2::ZERO, TrickFlags::SCROLL_ST0),
            (self.node.scroll_st1 != Vec2::ZERO, TrickFlags::SCROLL_ST1),
        ];
        for (set, flag) in implied {
            if set {
                self.node.flags |= flag;
            }
        }

        if self.group_flags.contains(GroupFlags::VIS_TRAY) {
            self.obj_flags |= super::flags::OBJ_FLAG_TRAY;
        }
    }

    /// Copy of the model state with a back reference to this trick.
    pub fn model_modifiers(&self) -> ModelModifiers {
        ModelModifiers {
            source: Some(TrickSource { name: self.name.clone(), obj_flags: self.obj_flags }),
            ..self.node.clone()
        }
    }
}
