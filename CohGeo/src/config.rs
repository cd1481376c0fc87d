//! Import configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formats::bin_store::MAX_STRING_LEN;
use crate::formats::modifiers::TRICKS_CRC;
use crate::formats::scene_graph::SCENE_GRAPH_CRC;

/// Settings for an import session.
///
/// Paths are relative to the game data root passed to
/// [`ImportSession::prepare`](crate::session::ImportSession::prepare).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Checksum required on scene graph bins (0 accepts any)
    pub scene_graph_crc: u32,
    /// Checksum required on `tricks.bin` (0 accepts any)
    pub tricks_crc: u32,
    pub defnames_path: String,
    pub tricks_path: String,
    /// Directory holding the scene graph bins
    pub geobin_dir: String,
    /// Longest string accepted in a record field
    pub max_string_len: usize,
    /// Decode bone weights and indices for entity models
    pub decode_bone_data: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            scene_graph_crc: SCENE_GRAPH_CRC,
            tricks_crc: TRICKS_CRC,
            defnames_path: "bin/defnames.bin".to_string(),
            tricks_path: "bin/tricks.bin".to_string(),
            geobin_dir: "geobin".to_string(),
            max_string_len: MAX_STRING_LEN,
            decode_bone_data: true,
        }
    }
}

impl ImportConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON or
    /// fails [`validate`](Self::validate).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for empty paths or a zero string limit.
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("defnames_path", &self.defnames_path),
            ("tricks_path", &self.tricks_path),
            ("geobin_dir", &self.geobin_dir),
        ];
        for (field, value) in paths {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        if self.max_string_len == 0 {
            return Err(Error::InvalidConfig("max_string_len must be greater than 0".to_string()));
        }
        Ok(())
    }
}
