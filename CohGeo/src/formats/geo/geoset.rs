//! A loaded `.geo` file

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::header::{GeoHeader, read_geo_header};
use super::model::Model;
use super::types::GeoSetId;
use crate::error::{Error, Result};
use crate::formats::modifiers::SceneModifiers;
use crate::geometry::MeshBuffers;

/// One `.geo` file: its models and, once loaded, the geometry payload they point into.
#[derive(Debug, Clone, Serialize)]
pub struct GeoSet {
    pub id: GeoSetId,
    /// Path relative to the game data root, with forward slashes.
    pub geopath: String,
    pub full_path: PathBuf,
    pub name: String,
    pub tex_names: Vec<String>,
    pub models: Vec<Model>,
    pub geo_data_size: u32,
    data_offset: u64,
    #[serde(skip)]
    payload: Option<Vec<u8>>,
    /// Models whose pack windows fall outside the payload.
    #[serde(skip)]
    undecodable: Vec<bool>,
}

impl GeoSet {
    pub fn from_header(id: GeoSetId, geopath: String, full_path: PathBuf, header: GeoHeader) -> Self {
        let mut models: Vec<Model> = header
            .models
            .into_iter()
            .map(|record| Model::from_record(id, record))
            .collect();
        for model in &mut models {
            model.derive_render_flags();
        }
        Self {
            id,
            geopath,
            full_path,
            name: header.name,
            tex_names: header.tex_names,
            models,
            geo_data_size: header.geo_data_size,
            data_offset: header.data_offset,
            payload: None,
            undecodable: Vec::new(),
        }
    }

    /// Read the header of a `.geo` file. The payload is loaded separately.
    ///
    /// # Errors
    /// Returns an error if the header cannot be read or parsed.
    pub fn read<P: AsRef<Path>>(path: P, id: GeoSetId, geopath: impl Into<String>) -> Result<Self> {
        let header = read_geo_header(path.as_ref())?;
        Ok(Self::from_header(id, geopath.into(), path.as_ref().to_path_buf(), header))
    }

    /// Attach geometry modifiers to every model by name.
    pub fn attach_modifiers(&mut self, modifiers: &SceneModifiers) {
        for model in &mut self.models {
            model.attach_modifiers(modifiers);
        }
    }

    pub fn is_data_loaded(&self) -> bool {
        self.payload.is_some()
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Load the geometry payload. Does nothing if it is already loaded.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is shorter than the
    /// declared payload.
    pub fn load_data(&mut self) -> Result<()> {
        if self.is_data_loaded() {
            return Ok(());
        }
        let mut file = File::open(&self.full_path)?;
        let file_len = file.metadata()?.len();
        let wanted = self.data_offset + u64::from(self.geo_data_size);
        if wanted > file_len {
            return Err(Error::Truncated {
                wanted: wanted as usize,
                available: file_len as usize,
            });
        }
        file.seek(SeekFrom::Start(self.data_offset))?;
        let mut payload = vec![0u8; self.geo_data_size as usize];
        file.read_exact(&mut payload)?;
        self.set_payload(payload);
        Ok(())
    }

    fn set_payload(&mut self, payload: Vec<u8>) {
        self.undecodable = self
            .models
            .iter()
            .map(|model| {
                let bad = model
                    .packed
                    .iter()
                    .find(|(_, pack)| pack.slice(&payload).is_err());
                if let Some((stream, pack)) = bad {
                    tracing::warn!(
                        "{}: model {} has {} window {:?} outside the {}-byte payload",
                        self.geopath,
                        model.name,
                        stream,
                        pack.window(),
                        payload.len()
                    );
                }
                bad.is_some()
            })
            .collect();
        self.payload = Some(payload);
    }

    /// True if the model's pack windows were found outside the payload.
    pub fn is_undecodable(&self, index: usize) -> bool {
        self.undecodable.get(index).copied().unwrap_or(false)
    }

    /// Decode the geometry of one model.
    ///
    /// # Errors
    /// Returns an error if the payload is not loaded, the index is out of
    /// range or the model's streams fail to decode.
    pub fn model_geometry(&self, index: usize, decode_bones: bool) -> Result<MeshBuffers> {
        let payload = self
            .payload
            .as_deref()
            .ok_or_else(|| Error::GeoDataNotLoaded(self.geopath.clone()))?;
        let model = self
            .models
            .get(index)
            .ok_or_else(|| Error::ModelNotFound(format!("{}#{index}", self.geopath)))?;
        MeshBuffers::decode(model, payload, decode_bones)
    }

    pub fn model_index(&self, name: &str) -> Option<usize> {
        self.models.iter().position(|m| m.name == name)
    }

    /// Find the model a prefab name refers to.
    ///
    /// A model matches when its name starts with `base_name` (ignoring case)
    /// and continues with nothing or with `__`. The last match wins.
    pub fn find_prefab_model(&self, base_name: &str) -> Option<usize> {
        let wanted = base_name.to_lowercase();
        self.models.iter().rposition(|m| {
            let name = m.name.to_lowercase();
            name.strip_prefix(&wanted)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("__"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::geo::ModelFlags;
    use crate::test_support::{GeoFile, GeoModel, MATIDXS, NORMS, STS, TRIS, VERTS, WEIGHTS};
    use glam::{IVec3, Vec2, Vec3};
    use pretty_assertions::assert_eq;

    // one triangle (0, 1, 2): selectors [1, 0, 1]
    const TRIS_RAW: [u8; 4] = [0x11, 0x00, 126, 128];
    // three vertices (1, 0, 0), (1, 1, 0), (1, 1, 1): one +1 step per entry
    const VERTS_RAW: [u8; 7] = [0x01, 0x01, 0x01, 0x00, 128, 128, 128];

    fn write_geo(dir: &Path, file: &GeoFile) -> PathBuf {
        let path = dir.join("set.geo");
        std::fs::write(&path, file.encode()).unwrap();
        path
    }

    fn triangle_file() -> GeoFile {
        GeoFile::new("tri_set").texture("white").model(
            GeoModel::new("tri")
                .vertices(3)
                .triangles(1)
                .bind(0, 1)
                .stream(TRIS, &TRIS_RAW, false)
                .stream(VERTS, &VERTS_RAW, true),
        )
    }

    #[test]
    fn test_load_and_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &triangle_file());
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();

        assert!(matches!(geoset.model_geometry(0, true), Err(Error::GeoDataNotLoaded(_))));
        geoset.load_data().unwrap();
        geoset.load_data().unwrap();
        assert!(!geoset.is_undecodable(0));

        let mesh = geoset.model_geometry(0, true).unwrap();
        assert_eq!(mesh.triangles, vec![IVec3::new(0, 1, 2)]);
        assert_eq!(
            mesh.positions,
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)]
        );
        assert!(mesh.normals.is_none());
        assert_eq!(mesh.submesh_triangles(&geoset.models[0].texture_binds).unwrap().len(), 1);
        assert!(geoset.models[0].flags.contains(ModelFlags::FULLBRIGHT));
    }

    // (0, 0, 1) for every vertex: one +1 step on z of the first entry
    const NORMS_RAW: [u8; 5] = [0x10, 0x00, 0x00, 0x00, 128];
    // (0.5, 0), (0.5, 0.5), (0.5, 0.5) at scale 1/2
    const STS_RAW: [u8; 5] = [0x41, 0x00, 0x01, 128, 128];
    const WEIGHTS_RAW: [u8; 3] = [255, 0, 51];
    const MATIDXS_RAW: [u8; 6] = [0, 1, 2, 3, 4, 5];

    fn full_model(name: &str) -> GeoModel {
        GeoModel::new(name)
            .vertices(3)
            .triangles(1)
            .bind(0, 1)
            .stream(TRIS, &TRIS_RAW, false)
            .stream(VERTS, &VERTS_RAW, true)
            .stream(NORMS, &NORMS_RAW, true)
            .stream(STS, &STS_RAW, true)
            .stream(WEIGHTS, &WEIGHTS_RAW, false)
            .stream(MATIDXS, &MATIDXS_RAW, true)
    }

    #[test]
    fn test_decode_all_streams() {
        let file = GeoFile::new("body_set")
            .texture("skin")
            .model(full_model("GEO_Body"))
            .model(full_model("body"));
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &file);
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();
        geoset.load_data().unwrap();

        assert!(geoset.models[0].has_bone_weights());
        assert!(!geoset.models[1].has_bone_weights());
        assert!(!geoset.models[0].flags.contains(ModelFlags::FULLBRIGHT));

        let mesh = geoset.model_geometry(0, true).unwrap();
        assert_eq!(mesh.triangles, vec![IVec3::new(0, 1, 2)]);
        assert_eq!(mesh.positions[2], Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.normals, Some(vec![Vec3::Z; 3]));
        assert_eq!(
            mesh.uvs,
            Some(vec![Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.5), Vec2::new(0.5, 0.5)])
        );
        assert_eq!(mesh.bone_indices, Some(vec![[0, 1], [2, 3], [4, 5]]));
        let weights = mesh.bone_weights.unwrap();
        assert_eq!(weights[0], Vec2::new(1.0, 0.0));
        assert_eq!(weights[1], Vec2::new(0.0, 1.0));
        assert!((weights[2].x - 0.2).abs() < 1e-6);
        assert!((weights[2].y - 0.8).abs() < 1e-6);

        let unskinned_request = geoset.model_geometry(0, false).unwrap();
        assert!(unskinned_request.bone_weights.is_none());
        assert!(unskinned_request.bone_indices.is_none());
        assert_eq!(unskinned_request.uvs, mesh.uvs);

        let static_mesh = geoset.model_geometry(1, true).unwrap();
        assert!(static_mesh.bone_weights.is_none());
        assert!(static_mesh.bone_indices.is_none());
        assert_eq!(static_mesh.normals, mesh.normals);
    }

    #[test]
    fn test_skinning_from_record_flags() {
        let file = GeoFile::new("lib").model(
            full_model("cape").flags(ModelFlags::DRAW_AS_ENT.bits()),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &file);
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();
        geoset.load_data().unwrap();

        let mesh = geoset.model_geometry(0, true).unwrap();
        assert_eq!(mesh.bone_indices.map(|i| i.len()), Some(3));
    }

    #[test]
    fn test_missing_streams_decode_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &triangle_file());
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();
        geoset.load_data().unwrap();

        let mesh = geoset.model_geometry(0, true).unwrap();
        assert!(mesh.normals.is_none());
        assert!(mesh.uvs.is_none());
        assert!(mesh.bone_weights.is_none());
    }

    #[test]
    fn test_declared_payload_past_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &triangle_file());
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();
        geoset.geo_data_size = u32::MAX;

        assert!(matches!(geoset.load_data(), Err(Error::Truncated { .. })));
        assert!(!geoset.is_data_loaded());
    }

    #[test]
    fn test_out_of_range_window_marks_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &triangle_file());
        let mut geoset = GeoSet::read(&path, GeoSetId(0), "set.geo").unwrap();
        geoset.models[0].packed.tris.buffer_offset = 10_000;
        geoset.load_data().unwrap();

        assert!(geoset.is_undecodable(0));
        assert!(matches!(geoset.model_geometry(0, true), Err(Error::PackOutOfBounds { .. })));
    }

    #[test]
    fn test_find_prefab_model_last_match_wins() {
        let file = GeoFile::new("lib")
            .model(GeoModel::new("Door"))
            .model(GeoModel::new("door__Glow"))
            .model(GeoModel::new("doorframe"));
        let dir = tempfile::tempdir().unwrap();
        let path = write_geo(dir.path(), &file);
        let geoset = GeoSet::read(&path, GeoSetId(3), "lib.geo").unwrap();

        assert_eq!(geoset.find_prefab_model("DOOR"), Some(1));
        assert_eq!(geoset.find_prefab_model("doorframe"), Some(2));
        assert_eq!(geoset.find_prefab_model("window"), None);
        assert_eq!(geoset.models[1].geoset, GeoSetId(3));
    }
}
