//! Leaf records nested under a scene definition

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formats::bin_store::{BinRecord, BinStore};

/// Placement of a child group inside its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLoc {
    pub name: String,
    pub pos: Vec3,
    /// Pitch, yaw, roll in radians.
    pub rot: Vec3,
}

impl BinRecord for GroupLoc {
    const KIND: &'static str = "Group";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.pos = store.read()?;
        self.rot = store.read()?;
        Ok(())
    }
}

/// A free-form property. A `kind` of 1 means `value` holds a radius.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProperty {
    pub name: String,
    pub value: String,
    pub kind: i32,
}

impl BinRecord for GroupProperty {
    const KIND: &'static str = "Property";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.value = store.read()?;
        self.kind = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TintColor {
    pub color1: u32,
    pub color2: u32,
}

impl BinRecord for TintColor {
    const KIND: &'static str = "TintColor";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.color1 = store.read()?;
        self.color2 = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceTex {
    pub tex_index: i32,
    pub replace_with: String,
}

impl BinRecord for ReplaceTex {
    const KIND: &'static str = "ReplaceTex";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.tex_index = store.read()?;
        self.replace_with = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefSound {
    pub name: String,
    pub volume: f32,
    pub radius: f32,
    pub ramp_feet: f32,
    pub flags: u32,
}

impl BinRecord for DefSound {
    const KIND: &'static str = "Sound";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.volume = store.read()?;
        self.radius = store.read()?;
        self.ramp_feet = store.read()?;
        self.flags = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefLod {
    pub far: f32,
    pub far_fade: f32,
    pub near: f32,
    pub near_fade: f32,
    pub scale: f32,
}

impl BinRecord for DefLod {
    const KIND: &'static str = "Lod";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.far = store.read()?;
        self.far_fade = store.read()?;
        self.near = store.read()?;
        self.near_fade = store.read()?;
        self.scale = store.read()?;
        Ok(())
    }
}

/// An omni light.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefOmni {
    /// Packed red, blue, green, alpha (low byte first).
    pub color: u32,
    pub size: f32,
    pub is_negative: i32,
}

impl BinRecord for DefOmni {
    const KIND: &'static str = "Omni";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.color = store.read()?;
        self.size = store.read()?;
        self.is_negative = store.read()?;
        Ok(())
    }
}

/// An editor beacon (traffic, combat and similar markers).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefBeacon {
    pub name: String,
    pub amplitude: f32,
}

impl BinRecord for DefBeacon {
    const KIND: &'static str = "Beacon";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.name = store.read()?;
        self.amplitude = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefFog {
    pub radius: f32,
    pub near: f32,
    pub far: f32,
    pub color1: u32,
    pub color2: u32,
}

impl BinRecord for DefFog {
    const KIND: &'static str = "Fog";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.radius = store.read()?;
        self.near = store.read()?;
        self.far = store.read()?;
        self.color1 = store.read()?;
        self.color2 = store.read()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefAmbient {
    pub color: u32,
}

impl BinRecord for DefAmbient {
    const KIND: &'static str = "Ambient";

    fn read_fields(&mut self, store: &mut BinStore) -> Result<()> {
        self.color = store.read()?;
        Ok(())
    }
}
