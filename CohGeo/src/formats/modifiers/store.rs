//! The `tricks.bin` modifier tables and their lookups

use std::collections::HashMap;
use std::path::Path;

use super::geometry::GeometryModifiers;
use super::texture::TextureModifiers;
use crate::error::Result;
use crate::formats::bin_store::{BinRecord, BinStore, unknown_chunk};

/// Checksum stamped into `tricks.bin` files.
pub const TRICKS_CRC: u32 = 0xB46B_669E;

/// All geometry and texture modifiers of a game build.
#[derive(Debug, Clone, Default)]
pub struct SceneModifiers {
    pub geometry: Vec<GeometryModifiers>,
    pub textures: Vec<TextureModifiers>,
    geometry_by_name: HashMap<String, usize>,
    texture_by_name: HashMap<String, usize>,
}

impl BinRecord for SceneModifiers {
    const KIND: &'static str = "SceneModifiers";

    fn read_fields(&mut self, _store: &mut BinStore) -> Result<()> {
        Ok(())
    }

    fn read_child(&mut self, name: &str, store: &mut BinStore) -> Result<()> {
        match name {
            "Trick" => self.geometry.push(store.load_record()?),
            "Texture" => self.textures.push(store.load_record()?),
            _ => return Err(unknown_chunk::<Self>(name)),
        }
        Ok(())
    }
}

/// Load and post-process a `tricks.bin` file.
///
/// # Errors
/// Returns an error if the file is missing, has a different checksum or
/// fails to decode.
pub fn read_tricks<P: AsRef<Path>>(path: P, expected_crc: u32, max_string_len: usize) -> Result<SceneModifiers> {
    let mut store = BinStore::open(path.as_ref(), expected_crc)?.with_max_string_len(max_string_len);
    let mut modifiers: SceneModifiers = store.load_root()?;
    tracing::info!(
        "Loaded {} geometry modifiers and {} texture modifiers from {}",
        modifiers.geometry.len(),
        modifiers.textures.len(),
        path.as_ref().display()
    );
    modifiers.finish_loading();
    Ok(modifiers)
}

impl SceneModifiers {
    /// Normalise every modifier and rebuild the name indexes.
    ///
    /// Duplicate names keep the first modifier.
    pub fn finish_loading(&mut self) {
        self.texture_by_name.clear();
        self.geometry_by_name.clear();

        for (idx, tex) in self.textures.iter_mut().enumerate() {
            let original = tex.name.clone();
            tex.finish_loading();
            let key = tex.lookup_key();
            if self.texture_by_name.contains_key(&key) {
                tracing::warn!("Duplicate texture modifier: {original}");
                continue;
            }
            self.texture_by_name.insert(key, idx);
        }

        for (idx, trick) in self.geometry.iter_mut().enumerate() {
            trick.finish_loading();
            if trick.name.is_empty() {
                tracing::warn!("Geometry modifier without a name");
            }
            let key = trick.name.to_lowercase();
            if self.geometry_by_name.contains_key(&key) {
                tracing::warn!("Duplicate geometry modifier: {}", trick.name);
                continue;
            }
            self.geometry_by_name.insert(key, idx);
        }
    }

    /// Find the trick for a model. The part of the model name after the
    /// first `__` names the trick.
    pub fn find_geometry_modifier(&self, model_name: &str) -> Option<&GeometryModifiers> {
        let (_, trick_name) = model_name.split_once("__")?;
        let found = self
            .geometry_by_name
            .get(&trick_name.to_lowercase())
            .map(|&idx| &self.geometry[idx]);
        if found.is_none() {
            tracing::debug!("No geometry modifier for {model_name}: {}", trick_name.to_lowercase());
        }
        found
    }

    pub fn texture_modifier(&self, name: &str) -> Option<&TextureModifiers> {
        self.texture_by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.textures[idx])
    }

    /// Find the closest modifier for a texture path: the file itself, then
    /// each enclosing directory below `texture_library`.
    pub fn texture_modifier_for_path(&self, texpath: &str) -> Option<&TextureModifiers> {
        let parts: Vec<&str> = texpath.split('/').collect();
        let below_library = parts
            .iter()
            .position(|&p| p == "texture_library")
            .map_or(&[][..], |idx| &parts[idx + 1..]);

        below_library
            .iter()
            .rev()
            .find_map(|part| self.texture_modifier(part))
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty() && self.textures.is_empty()
    }
}
