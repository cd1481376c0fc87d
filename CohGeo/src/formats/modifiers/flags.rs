//! Bit sets carried by trick and texture modifiers

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Render tricks applied to a model.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TrickFlags: u32 {
        const ADDITIVE = 0x1;
        const SCROLL_ST0 = 0x2;
        const FRONT_FACE = 0x4;
        const CAMERA_FACE = 0x8;
        const DIST_ALPHA = 0x10;
        const COLOR_ONLY = 0x20;
        const DOUBLE_SIDED = 0x40;
        const NO_Z_TEST = 0x80;
        const REFLECT_TEX1 = 0x100;
        const SCROLL_ST1 = 0x200;
        const NIGHT_LIGHT = 0x400;
        const NO_Z_WRITE = 0x800;
        const WIREFRAME = 0x1000;
        const NO_DRAW = 0x2000;
        const ST_ANIMATE = 0x4000;
        const PARTICLE_SYS = 0x8000;
        const NO_COLL = 0x10000;
        const SET_COLOR = 0x20000;
        const VERTEX_ALPHA = 0x40000;
        const NO_FOG = 0x80000;
        const FOG_HAS_START_AND_END = 0x100000;
        const EDITOR_VISIBLE = 0x200000;
        const CAST_SHADOW = 0x400000;
        const LIGHT_FACE = 0x800000;
        const REFLECT_TEX0 = 0x1000000;
        const ALPHA_REF = 0x2000000;
        const SIMPLE_ALPHA_SORT = 0x4000000;
        const TEX_BIAS = 0x8000000;
        const NIGHT_GLOW = 0x10000000;
        const SELECT_ONLY = 0x20000000;
        const STS_SCALE = 0x40000000;
        const NOT_SELECTABLE = 0x80000000;
    }
}

impl Default for TrickFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags::bitflags! {
    /// Visibility and volume markers of a scene group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GroupFlags: u32 {
        const VIS_OUTSIDE = 0x1;
        const VIS_BLOCKER = 0x2;
        const VIS_ANGLE_BLOCKER = 0x4;
        const VIS_TRAY = 0x8;
        const VIS_SHELL = 0x10;
        const VIS_WINDOW = 0x20;
        const VIS_DOOR_FRAME = 0x40;
        const REGION_MARKER = 0x80;
        const VOLUME_TRIGGER = 0x100;
        const WATER_VOLUME = 0x200;
        const LAVA_VOLUME = 0x400;
        const DOOR_VOLUME = 0x800;
        const PARENT_FADE = 0x1000;
        const KEY_LIGHT = 0x2000;
        const SEWER_WATER_VOLUME = 0x4000;
        const RED_WATER_VOLUME = 0x8000;
        const MATERIAL_VOLUME = 0x10000;
    }
}

impl Default for GroupFlags {
    fn default() -> Self {
        Self::empty()
    }
}

bitflags::bitflags! {
    /// Texture options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TexOpt: u32 {
        const FADE = 0x0001;
        const DUAL = 0x0010;
        const REPLACEABLE = 0x0800;
        const BUMPMAP = 0x1000;
    }
}

impl Default for TexOpt {
    fn default() -> Self {
        Self::empty()
    }
}

/// Object flag set on trays.
pub const OBJ_FLAG_TRAY: u32 = 0x400;
