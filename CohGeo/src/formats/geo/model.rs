//! Model metadata

use serde::Serialize;

use super::header::ModelRecord;
use super::types::{BlendMode, GeoSetId, ModelFlags, PackBlock, TextureBind};
use crate::formats::common::Aabb;
use crate::formats::modifiers::{ModelModifiers, SceneModifiers, TrickFlags};

/// One sub-mesh of a geoset. Holds pack descriptors, not geometry.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub name: String,
    pub geoset: GeoSetId,
    pub id: i16,
    pub flags: ModelFlags,
    pub blend_mode: BlendMode,
    pub visibility_radius: f32,
    pub num_textures: u32,
    pub vertex_count: u32,
    pub tri_count: u32,
    pub scale: glam::Vec3,
    pub bbox: Aabb,
    pub boneinfo_offset: i32,
    pub alt_pivot_count: i32,
    pub packed: PackBlock,
    pub texture_binds: Vec<TextureBind>,
    pub trick: Option<ModelModifiers>,
}

impl Model {
    pub fn from_record(geoset: GeoSetId, record: ModelRecord) -> Self {
        Self {
            name: record.name,
            geoset,
            id: record.id,
            flags: ModelFlags::from_bits_retain(record.flags as u32),
            blend_mode: BlendMode::from_u8(record.blend_mode),
            visibility_radius: record.radius,
            num_textures: record.num_textures,
            vertex_count: record.vertex_count,
            tri_count: record.tri_count,
            scale: record.scale,
            bbox: Aabb::from_min_max(record.min, record.max),
            boneinfo_offset: record.boneinfo,
            alt_pivot_count: record.num_altpivots,
            packed: record.packs,
            texture_binds: record.texture_binds,
            trick: None,
        }
    }

    /// Skinned models carry per-vertex bone weights.
    pub fn has_bone_weights(&self) -> bool {
        self.flags.contains(ModelFlags::DRAW_AS_ENT)
    }

    pub fn has_normals(&self) -> bool {
        self.packed.norms.is_present()
    }

    pub fn needs_tangents(&self) -> bool {
        self.flags.contains(ModelFlags::DRAW_AS_ENT | ModelFlags::BUMPMAP)
    }

    pub fn trick_flags(&self) -> TrickFlags {
        self.trick.as_ref().map(|t| t.flags).unwrap_or_default()
    }

    /// Copy the matching trick, if any, onto this model and re-derive its flags.
    pub fn attach_modifiers(&mut self, modifiers: &SceneModifiers) {
        if let Some(trick) = modifiers.find_geometry_modifier(&self.name) {
            self.trick = Some(trick.model_modifiers());
        }
        self.derive_render_flags();
    }

    fn trick_mut(&mut self) -> &mut ModelModifiers {
        self.trick.get_or_insert_with(ModelModifiers::default)
    }

    /// Derive render flags from the model name, its trick and its blend mode.
    ///
    /// Running this again gives the same result.
    pub fn derive_render_flags(&mut self) {
        if self.name.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("GEO_")) {
            self.flags |= ModelFlags::DRAW_AS_ENT;
            if self.name.to_lowercase().contains("eyes") {
                self.trick_mut().flags |= TrickFlags::DOUBLE_SIDED;
            }
        }

        if let Some(obj_flags) = self
            .trick
            .as_ref()
            .and_then(|t| t.source.as_ref())
            .map(|s| s.obj_flags)
        {
            self.flags |= ModelFlags::from_bits_retain(obj_flags);
        }

        if self.blend_mode.is_color_blend() {
            self.trick_mut().flags |= TrickFlags::SET_COLOR;
        }
        if self.blend_mode == BlendMode::AddGlow {
            self.trick_mut().flags |= TrickFlags::SET_COLOR | TrickFlags::NIGHT_LIGHT;
        }

        if !self.has_normals() {
            self.flags |= ModelFlags::FULLBRIGHT;
        }
        if self.trick_flags().contains(TrickFlags::ADDITIVE) {
            self.flags |= ModelFlags::ALPHASORT;
        }
        if self.flags.contains(ModelFlags::FORCEOPAQUE) {
            self.flags.remove(ModelFlags::ALPHASORT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::geo::DeltaPack;
    use crate::formats::modifiers::TrickSource;
    use pretty_assertions::assert_eq;

    fn model(name: &str) -> Model {
        let mut record = ModelRecord { name: name.into(), ..Default::default() };
        record.packs.norms = DeltaPack { compressed_size: 0, uncomp_size: 12, buffer_offset: 0 };
        Model::from_record(GeoSetId(0), record)
    }

    #[test]
    fn test_geo_prefix_marks_skinned() {
        let mut m = model("geo_Body_Eyes");
        m.derive_render_flags();
        assert!(m.has_bone_weights());
        assert!(m.trick_flags().contains(TrickFlags::DOUBLE_SIDED));
        assert!(!m.flags.contains(ModelFlags::FULLBRIGHT));
    }

    #[test]
    fn test_no_normals_is_fullbright() {
        let mut m = model("wall");
        m.packed.norms = DeltaPack::default();
        m.derive_render_flags();
        assert_eq!(m.flags, ModelFlags::FULLBRIGHT);
        assert!(m.trick.is_none());
    }

    #[test]
    fn test_additive_sorts_unless_opaque() {
        let mut m = model("glass");
        m.trick = Some(ModelModifiers { flags: TrickFlags::ADDITIVE, ..Default::default() });
        m.derive_render_flags();
        assert!(m.flags.contains(ModelFlags::ALPHASORT));

        let mut opaque = model("glass");
        opaque.trick = Some(ModelModifiers {
            flags: TrickFlags::ADDITIVE,
            source: Some(TrickSource { name: "glass".into(), obj_flags: ModelFlags::FORCEOPAQUE.bits() }),
            ..Default::default()
        });
        opaque.derive_render_flags();
        assert!(opaque.flags.contains(ModelFlags::FORCEOPAQUE));
        assert!(!opaque.flags.contains(ModelFlags::ALPHASORT));
    }

    #[test]
    fn test_blend_modes_set_trick_color() {
        let mut m = model("sign");
        m.blend_mode = BlendMode::AddGlow;
        m.derive_render_flags();
        assert_eq!(m.trick_flags(), TrickFlags::SET_COLOR | TrickFlags::NIGHT_LIGHT);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let mut m = model("GEO_Cape");
        m.blend_mode = BlendMode::ColorBlendDual;
        m.derive_render_flags();
        let (flags, tricks) = (m.flags, m.trick_flags());
        m.derive_render_flags();
        assert_eq!((m.flags, m.trick_flags()), (flags, tricks));
    }

    #[test]
    fn test_needs_tangents() {
        let mut m = model("GEO_Arm");
        m.flags |= ModelFlags::BUMPMAP;
        m.derive_render_flags();
        assert!(m.needs_tangents());
    }
}
