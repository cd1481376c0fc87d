//! Decoded mesh attribute arrays

use glam::{IVec3, Vec2, Vec3};
use serde::Serialize;

use super::unpack::{unpack_bone_data, unpack_triangles, unpack_vec2s, unpack_vec3s};
use crate::error::{Error, Result};
use crate::formats::geo::{Model, TextureBind};

/// Vertex and index arrays of one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    pub triangles: Vec<IVec3>,
    /// `(w, 1 - w)` per vertex, for skinned models only.
    pub bone_weights: Option<Vec<Vec2>>,
    pub bone_indices: Option<Vec<[u16; 2]>>,
    pub needs_tangents: bool,
}

impl MeshBuffers {
    /// Decode every stream of `model` from its geoset payload.
    ///
    /// Bone data is decoded only for skinned models and when `decode_bones` is set.
    ///
    /// # Errors
    /// Returns an error if a stream lies outside the payload, fails to
    /// inflate or is shorter than the model's counts require.
    pub fn decode(model: &Model, payload: &[u8], decode_bones: bool) -> Result<Self> {
        let packs = &model.packed;
        let vertex_count = model.vertex_count as usize;

        let triangles = unpack_triangles(&packs.tris, payload, model.tri_count as usize)?.unwrap_or_default();
        let positions = unpack_vec3s(&packs.verts, payload, vertex_count)?.unwrap_or_default();
        let normals = unpack_vec3s(&packs.norms, payload, vertex_count)?;
        let uvs = unpack_vec2s(&packs.sts, payload, vertex_count)?;

        let bones = if decode_bones && model.has_bone_weights() {
            unpack_bone_data(&packs.weights, &packs.matidxs, payload, vertex_count)?
        } else {
            None
        };
        let (bone_weights, bone_indices) = match bones {
            Some(b) => (Some(b.weights), Some(b.indices)),
            None => (None, None),
        };

        Ok(Self {
            positions,
            normals,
            uvs,
            triangles,
            bone_weights,
            bone_indices,
            needs_tangents: model.needs_tangents(),
        })
    }

    /// Split the triangle list into one contiguous run per texture bind.
    ///
    /// # Errors
    /// Returns [`Error::TextureBindMismatch`] unless the bind counts add up
    /// to the triangle count exactly.
    pub fn submesh_triangles(&self, binds: &[TextureBind]) -> Result<Vec<&[IVec3]>> {
        let bound: usize = binds.iter().map(|b| usize::from(b.tri_count)).sum();
        if bound != self.triangles.len() {
            return Err(Error::TextureBindMismatch { bound, total: self.triangles.len() });
        }

        let mut start = 0;
        Ok(binds
            .iter()
            .map(|bind| {
                let end = start + usize::from(bind.tri_count);
                let run = &self.triangles[start..end];
                start = end;
                run
            })
            .collect())
    }

    /// Flat `u32` index lists per texture bind.
    ///
    /// # Errors
    /// Same as [`submesh_triangles`](Self::submesh_triangles).
    pub fn submesh_indices(&self, binds: &[TextureBind]) -> Result<Vec<Vec<u32>>> {
        Ok(self
            .submesh_triangles(binds)?
            .into_iter()
            .map(|run| run.iter().flat_map(|t| t.to_array().map(|i| i as u32)).collect())
            .collect())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffers_with(tris: usize) -> MeshBuffers {
        MeshBuffers {
            triangles: (0..tris as i32).map(|i| IVec3::new(i, i + 1, i + 2)).collect(),
            ..Default::default()
        }
    }

    fn bind(tex_idx: u16, tri_count: u16) -> TextureBind {
        TextureBind { tex_idx, tri_count }
    }

    #[test]
    fn test_binds_tile_triangle_list() {
        let mesh = buffers_with(5);
        let runs = mesh.submesh_triangles(&[bind(0, 2), bind(1, 0), bind(2, 3)]).unwrap();
        assert_eq!(runs.iter().map(|r| r.len()).collect::<Vec<_>>(), vec![2, 0, 3]);
        assert_eq!(runs[2][0], IVec3::new(2, 3, 4));
    }

    #[test]
    fn test_bind_mismatch() {
        let mesh = buffers_with(5);
        assert!(matches!(
            mesh.submesh_triangles(&[bind(0, 2), bind(1, 2)]),
            Err(Error::TextureBindMismatch { bound: 4, total: 5 })
        ));
    }

    #[test]
    fn test_submesh_indices() {
        let mesh = buffers_with(2);
        let indices = mesh.submesh_indices(&[bind(0, 1), bind(0, 1)]).unwrap();
        assert_eq!(indices, vec![vec![0, 1, 2], vec![1, 2, 3]]);
    }
}
