//! Scene graph arena

use std::collections::{BTreeMap, HashMap};

use glam::{Mat4, Quat, Vec3};
use serde::Serialize;

use super::bounds::ChildExtent;
use super::node::{NodeId, SceneNode};

/// A top-level placement of a node in the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootNode {
    pub node: NodeId,
    pub transform: Mat4,
    pub index: usize,
}

/// How a node is referenced from the rest of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeState {
    /// Not referenced as anyone's child
    RootNode,
    /// Referenced as a child from many places
    UsedAsPrefab,
    /// Referenced as a child from a single place
    InternalNode,
}

/// Rotation from pitch (about -X), yaw (about +Y) and roll (about +Z),
/// applied as yaw * pitch * roll.
#[must_use]
pub fn ypr_rotation(rot: Vec3) -> Quat {
    let pitch = Quat::from_axis_angle(Vec3::NEG_X, rot.x);
    let yaw = Quat::from_axis_angle(Vec3::Y, rot.y);
    let roll = Quat::from_axis_angle(Vec3::Z, rot.z);
    yaw * pitch * roll
}

/// Local transform of a child group: `T(pos) * R(rot)`.
#[must_use]
pub fn child_transform(pos: Vec3, rot: Vec3) -> Mat4 {
    Mat4::from_rotation_translation(ypr_rotation(rot), pos)
}

/// World transform of a top-level placement.
#[must_use]
pub fn transform_from_ypr_and_translation(rot: Vec3, pos: Vec3) -> Mat4 {
    child_transform(pos, rot)
}

#[derive(Debug, Default, Serialize)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub refs: Vec<Option<RootNode>>,
    #[serde(skip)]
    name_to_node: HashMap<String, NodeId>,
    #[serde(skip)]
    use_counts: HashMap<NodeId, u32>,
}

fn leaf_key(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_lowercase()
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty, in-use definition.
    pub fn new_def(&mut self, nest_level: u32) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(id, nest_level));
        id
    }

    /// Add a top-level placement, reusing the first free slot.
    pub fn new_ref(&mut self, node: NodeId, transform: Mat4) -> usize {
        let index = self
            .refs
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.refs.len());
        if index == self.refs.len() {
            self.refs.push(None);
        }
        self.refs[index] = Some(RootNode { node, transform, index });
        index
    }

    /// Clear a top-level placement slot.
    pub fn remove_ref(&mut self, index: usize) -> Option<RootNode> {
        self.refs.get_mut(index).and_then(Option::take)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Find a node by the leaf of its path, ignoring case.
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_to_node.get(&leaf_key(name)).copied()
    }

    /// Register a node under its leaf name. The first registration wins.
    pub fn register_name(&mut self, name: &str, id: NodeId) {
        self.name_to_node.entry(leaf_key(name)).or_insert(id);
    }

    pub fn root_refs(&self) -> impl Iterator<Item = &RootNode> {
        self.refs.iter().flatten()
    }

    /// Summaries of a node's children for bounds computation.
    #[must_use]
    pub fn child_extents(&self, id: NodeId) -> Vec<ChildExtent> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|child| {
                self.node(child.node).map(|c| ChildExtent {
                    transform: child.transform,
                    center: c.center,
                    radius: c.radius,
                    shadow_dist: c.shadow_dist,
                    vis_dist: c.vis_dist,
                    lod_scale: c.lod_scale,
                })
            })
            .collect()
    }

    /// Count child references and return the top-level nodes by name.
    ///
    /// Nodes from nested prefab libraries are never top-level. When two
    /// top-level nodes share a name only the first is returned.
    pub fn calculate_usages(&mut self) -> BTreeMap<String, NodeId> {
        self.use_counts.clear();
        for node in self.nodes.iter().filter(|n| n.in_use) {
            for child in &node.children {
                *self.use_counts.entry(child.node).or_insert(0) += 1;
            }
            if node.nest_level != 0 {
                self.use_counts.entry(node.id).or_insert(0);
            }
        }

        let mut top_level = BTreeMap::new();
        for node in self.nodes.iter().filter(|n| n.in_use) {
            if self.use_counts.contains_key(&node.id) {
                continue;
            }
            if top_level.contains_key(&node.name) {
                tracing::debug!("Not returning duplicate node {}", node.name);
                continue;
            }
            top_level.insert(node.name.clone(), node.id);
        }
        top_level
    }

    /// Classify a node using the counts from the last [`calculate_usages`](Self::calculate_usages).
    #[must_use]
    pub fn node_state(&self, id: NodeId) -> NodeState {
        match self.use_counts.get(&id) {
            None => NodeState::RootNode,
            Some(1) => NodeState::InternalNode,
            Some(_) => NodeState::UsedAsPrefab,
        }
    }
}
