//! Copy per-definition descriptors onto a scene node
//!
//! Each descriptor list honours its first element only.

use super::node::{BeaconInfo, FogInfo, LightProperties, SceneNode, SoundInfo, TintInfo, VolumeFlags};
use crate::formats::common::Color32;
use crate::formats::modifiers::GeometryModifiers;
use crate::formats::scene_graph::{NodeFlags, SceneNodeData};

fn first<'a, T>(node: &SceneNode, what: &str, items: &'a [T]) -> Option<&'a T> {
    if items.len() > 1 {
        tracing::warn!("{}: {} {what} entries, only the first is used", node.name, items.len());
    }
    items.first()
}

/// Copy LOD distances, shadow distance and volume markers from a geometry
/// modifier. Zero LOD values leave the node's own values alone.
pub fn apply_modifiers(node: &mut SceneNode, mods: &GeometryModifiers) {
    let lods = [
        (mods.lod_near, &mut node.lod_near),
        (mods.lod_far, &mut node.lod_far),
        (mods.lod_near_fade, &mut node.lod_near_fade),
        (mods.lod_far_fade, &mut node.lod_far_fade),
        (mods.lod_scale, &mut node.lod_scale),
    ];
    let mut any_lod = false;
    for (value, target) in lods {
        if value != 0.0 {
            *target = value;
            any_lod = true;
        }
    }
    if any_lod {
        node.lod_from_trick = true;
    }
    node.shadow_dist = mods.shadow_dist;
    node.volumes = VolumeFlags::from_group_flags(mods.group_flags);
}

/// Run the descriptor steps in order: flags, LOD, texture replacers, tint,
/// ambient, fog, beacon, sound, light.
pub fn postprocess_node(node: &mut SceneNode, def: &SceneNodeData) {
    if def.flags.contains(NodeFlags::FADE_NODE) {
        node.is_lod_fade_node = true;
    }

    if let Some(lod) = first(node, "Lod", &def.lods) {
        node.lod_scale = lod.scale;
        if !node.lod_from_trick {
            node.lod_far = lod.far;
            node.lod_far_fade = lod.far_fade;
            node.lod_near = lod.near;
            node.lod_near_fade = lod.near_fade;
        }
    }

    for replacer in &def.replace_textures {
        tracing::debug!(
            "{}: texture {} replaced with {}",
            node.name,
            replacer.tex_index,
            replacer.replace_with
        );
    }
    node.texture_replacers.clone_from(&def.replace_textures);

    node.tint = first(node, "TintColor", &def.tint_colors).map(|tint| TintInfo {
        color1: Color32::from_packed_rgba(tint.color1),
        color2: Color32::from_packed_rgba(tint.color2),
    });

    node.ambient = first(node, "Ambient", &def.ambients).map(|ambient| Color32::from_packed_rgba(ambient.color));

    node.fog = first(node, "Fog", &def.fogs).map(|fog| FogInfo {
        radius: fog.radius,
        near: fog.near,
        far: fog.far,
        color1: Color32::from_packed_rgba(fog.color1),
        color2: Color32::from_packed_rgba(fog.color2),
    });

    node.beacon = first(node, "Beacon", &def.beacons).map(|beacon| BeaconInfo {
        name: beacon.name.clone(),
        radius: beacon.amplitude,
    });

    node.sound = first(node, "Sound", &def.sounds).map(|sound| SoundInfo {
        name: sound.name.clone(),
        radius: sound.radius,
        ramp_feet: sound.ramp_feet,
        flags: sound.flags as u16,
    });

    node.light = first(node, "Omni", &def.omnis).map(|omni| LightProperties {
        color: Color32::from_packed_rbga(omni.color),
        range: omni.size,
        is_negative: omni.is_negative != 0,
    });
}
