//! tricks.bin CLI commands

use std::path::Path;

use anyhow::Context;

use crate::formats::bin_store::MAX_STRING_LEN;
use crate::formats::modifiers::{TRICKS_CRC, read_tricks};

fn matches(name: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| name.to_ascii_lowercase().contains(&f.to_ascii_lowercase()))
}

/// List geometry and texture modifiers of a tricks bin.
pub fn inspect(path: &Path, filter: Option<&str>) -> anyhow::Result<()> {
    println!("Inspecting tricks: {}", path.display());
    println!();

    let modifiers = read_tricks(path, TRICKS_CRC, MAX_STRING_LEN)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let geometry: Vec<_> = modifiers
        .geometry
        .iter()
        .filter(|m| matches(&m.name, filter))
        .collect();
    println!("Geometry modifiers ({}):", geometry.len());
    for m in geometry {
        println!("  {}", m.name);
        if !m.node.flags.is_empty() {
            println!("      flags: {:?}", m.node.flags);
        }
        if !m.group_flags.is_empty() {
            println!("      group: {:?}", m.group_flags);
        }
        if m.lod_far != 0.0 || m.lod_scale != 0.0 {
            println!(
                "      lod: near {:.1} far {:.1} scale {:.2}",
                m.lod_near, m.lod_far, m.lod_scale
            );
        }
    }
    println!();

    let textures: Vec<_> = modifiers
        .textures
        .iter()
        .filter(|t| matches(&t.name, filter))
        .collect();
    println!("Texture modifiers ({}):", textures.len());
    for t in textures {
        let blend = if t.blend.is_empty() { "-" } else { t.blend.as_str() };
        println!("  {:40} blend {:30} {:?}", t.name, blend, t.flags);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive() {
        assert!(matches("Omni_Light", Some("omni")));
        assert!(matches("anything", None));
        assert!(!matches("Tree_01", Some("omni")));
    }
}
