//! Bounding sphere and visibility distance of scene nodes
//!
//! Both are computed bottom-up: a node's children must already be final
//! when their parent is added, so each child is summarised as a
//! [`ChildExtent`] taken from the graph.

use glam::{Mat4, Vec3};

use super::node::SceneNode;
use crate::formats::common::Aabb;

/// The parts of a placed child that feed its parent's bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildExtent {
    pub transform: Mat4,
    pub center: Vec3,
    pub radius: f32,
    pub shadow_dist: f32,
    pub vis_dist: f32,
    pub lod_scale: f32,
}

impl ChildExtent {
    /// Child center in the parent's space.
    #[must_use]
    pub fn placed_center(&self) -> Vec3 {
        self.transform.transform_point3(self.center)
    }
}

impl SceneNode {
    /// Compute `bbox`, `center` and `radius` from the model box and the
    /// children's spheres.
    ///
    /// Returns true when the node has children but still ends up with a
    /// zero radius.
    pub fn calculate_bounds(&mut self, children: &[ChildExtent]) -> bool {
        let mut bbox = Aabb::EMPTY;
        let mut geometry_radius = 0.0f32;

        if let Some(model) = &self.model {
            bbox.union(&model.bbox);
            geometry_radius = bbox.half_diagonal();
        }

        for child in children {
            let placed = child.placed_center();
            let extent = Vec3::splat(child.radius);
            bbox.union_point(placed + extent);
            bbox.union_point(placed - extent);
        }

        self.bbox = bbox;
        self.center = bbox.center();
        self.radius = bbox.half_diagonal();

        let maxrad = children
            .iter()
            .map(|child| (child.placed_center() - self.center).length() + child.radius)
            .fold(0.0f32, f32::max);
        if maxrad != 0.0 {
            self.radius = maxrad;
        }
        self.radius = self.radius.max(geometry_radius);

        self.radius == 0.0 && !children.is_empty()
    }

    /// Compute `vis_dist`, defaulting the far LOD distance for models and
    /// the shadow distance from the children.
    pub fn set_vis_bounds(&mut self, children: &[ChildExtent]) {
        let mut maxrad = 0.0f32;
        let mut maxvis = 0.0f32;

        if self.lod_scale == 0.0 {
            self.lod_scale = 1.0;
        }

        if let Some(model) = &self.model {
            maxrad = model.bbox.half_diagonal() + self.shadow_dist;
            if self.lod_far == 0.0 {
                self.lod_far = (maxrad + 10.0) * 10.0;
                self.lod_far_fade = self.lod_far * 0.25;
            }
            maxvis = self.lod_far + self.lod_far_fade;
        }

        for child in children {
            let dist = (child.placed_center() - self.center).length();
            maxrad = maxrad.max(dist + child.radius + child.shadow_dist);
            maxvis = maxvis.max(dist + child.vis_dist * child.lod_scale);
        }

        if self.shadow_dist == 0.0 {
            self.shadow_dist = maxrad - self.radius;
        }
        self.vis_dist = maxvis;
    }
}
