//! Small value types shared by the bin and geo formats

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a light color word.
    ///
    /// The scene bins store these low byte first as red, blue, green, alpha.
    #[must_use]
    pub fn from_packed_rbga(v: u32) -> Self {
        let [r, b, g, a] = v.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Unpack a tint, fog or ambient color word (red in the low byte).
    #[must_use]
    pub fn from_packed_rgba(v: u32) -> Self {
        let [r, g, b, a] = v.to_le_bytes();
        Self { r, g, b, a }
    }

    /// True when the color channels (ignoring alpha) are all zero.
    #[must_use]
    pub fn rgb_is_zero(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Axis-aligned bounding box.
///
/// `Aabb::EMPTY` has inverted extents so the first union sets both corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn union_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        self.union_point(other.min);
        self.union_point(other.max);
    }

    /// Center of the box; the origin for an empty box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Extent of the box; zero for an empty box.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    #[must_use]
    pub fn half_diagonal(&self) -> f32 {
        self.size().length() * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_packed_light_color_byte_order() {
        let c = Color32::from_packed_rbga(0x4433_2211);
        assert_eq!(c, Color32::new(0x11, 0x33, 0x22, 0x44));
    }

    #[test]
    fn test_empty_box() {
        let b = Aabb::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.center(), Vec3::ZERO);
        assert_eq!(b.half_diagonal(), 0.0);
    }

    #[test]
    fn test_union() {
        let mut b = Aabb::EMPTY;
        b.union_point(Vec3::new(6.0, 1.0, 1.0));
        b.union_point(Vec3::new(-4.0, -1.0, -1.0));
        assert_eq!(b.center(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(b.size(), Vec3::new(10.0, 2.0, 2.0));
    }
}
