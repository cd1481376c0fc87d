//! Pack windows to typed attribute arrays

use std::borrow::Cow;

use glam::{IVec3, Vec2, Vec3};

use super::delta::{unpack_float_deltas, unpack_int_deltas};
use crate::compression::inflate_exact;
use crate::error::{Error, Result};
use crate::formats::geo::DeltaPack;

/// The uncompressed bytes of a pack.
///
/// Absent packs give `None`, raw packs are borrowed from the payload and
/// compressed packs are inflated to exactly `uncomp_size` bytes.
///
/// # Errors
/// Returns an error if the window falls outside the payload or inflation
/// does not produce the declared size.
pub fn unpack_pack<'a>(pack: &DeltaPack, payload: &'a [u8]) -> Result<Option<Cow<'a, [u8]>>> {
    let Some(stored) = pack.slice(payload)? else {
        return Ok(None);
    };
    if !pack.is_compressed() {
        return Ok(Some(Cow::Borrowed(stored)));
    }
    Ok(Some(Cow::Owned(inflate_exact(stored, pack.uncomp_size as usize)?)))
}

pub fn unpack_vec3s(pack: &DeltaPack, payload: &[u8], count: usize) -> Result<Option<Vec<Vec3>>> {
    let Some(raw) = unpack_pack(pack, payload)? else {
        return Ok(None);
    };
    let values = unpack_float_deltas::<3>(&raw, count)?;
    Ok(Some(values.into_iter().map(Vec3::from_array).collect()))
}

pub fn unpack_vec2s(pack: &DeltaPack, payload: &[u8], count: usize) -> Result<Option<Vec<Vec2>>> {
    let Some(raw) = unpack_pack(pack, payload)? else {
        return Ok(None);
    };
    let values = unpack_float_deltas::<2>(&raw, count)?;
    Ok(Some(values.into_iter().map(Vec2::from_array).collect()))
}

pub fn unpack_triangles(pack: &DeltaPack, payload: &[u8], count: usize) -> Result<Option<Vec<IVec3>>> {
    let Some(raw) = unpack_pack(pack, payload)? else {
        return Ok(None);
    };
    let values = unpack_int_deltas::<3>(&raw, count)?;
    Ok(Some(values.into_iter().map(IVec3::from_array).collect()))
}

/// Per-vertex skinning data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneData {
    /// `(w, 1 - w)` per vertex.
    pub weights: Vec<Vec2>,
    pub indices: Vec<[u16; 2]>,
}

/// Decode bone weights and matrix indices. Both streams are plain bytes:
/// one weight byte and two index bytes per vertex.
///
/// Returns `None` unless both streams are present.
///
/// # Errors
/// Returns [`Error::Truncated`] if either stream is shorter than `count` vertices.
pub fn unpack_bone_data(
    weights: &DeltaPack,
    matidxs: &DeltaPack,
    payload: &[u8],
    count: usize,
) -> Result<Option<BoneData>> {
    let (Some(weight_bytes), Some(index_bytes)) =
        (unpack_pack(weights, payload)?, unpack_pack(matidxs, payload)?)
    else {
        return Ok(None);
    };
    if weight_bytes.len() < count {
        return Err(Error::Truncated { wanted: count, available: weight_bytes.len() });
    }
    if index_bytes.len() < count * 2 {
        return Err(Error::Truncated { wanted: count * 2, available: index_bytes.len() });
    }

    let weights = weight_bytes[..count]
        .iter()
        .map(|&w| {
            let w = f32::from(w) / 255.0;
            Vec2::new(w, 1.0 - w)
        })
        .collect();
    let indices = index_bytes[..count * 2]
        .chunks_exact(2)
        .map(|pair| [u16::from(pair[0]), u16::from(pair[1])])
        .collect();
    Ok(Some(BoneData { weights, indices }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::zlib;
    use pretty_assertions::assert_eq;

    fn raw_pack(offset: u32, len: u32) -> DeltaPack {
        DeltaPack { compressed_size: 0, uncomp_size: len, buffer_offset: offset }
    }

    #[test]
    fn test_absent_pack_short_circuits() {
        let pack = DeltaPack { compressed_size: 4, uncomp_size: 0, buffer_offset: 999 };
        assert!(unpack_pack(&pack, &[]).unwrap().is_none());
    }

    #[test]
    fn test_raw_pack_is_borrowed() {
        let payload = [9u8, 1, 2, 3, 9];
        let out = unpack_pack(&raw_pack(1, 3), &payload).unwrap().unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&*out, &[1, 2, 3]);
    }

    #[test]
    fn test_compressed_pack_is_inflated() {
        let raw = [5u8; 40];
        let mut payload = vec![0u8; 2];
        let compressed = zlib(&raw);
        payload.extend_from_slice(&compressed);
        let pack = DeltaPack {
            compressed_size: compressed.len() as u32,
            uncomp_size: 40,
            buffer_offset: 2,
        };
        assert_eq!(&*unpack_pack(&pack, &payload).unwrap().unwrap(), &raw[..]);

        let wrong = DeltaPack { uncomp_size: 41, ..pack };
        assert!(matches!(
            unpack_pack(&wrong, &payload),
            Err(Error::DecompressionSizeMismatch { expected: 41, actual: 40 })
        ));
    }

    #[test]
    fn test_triangles() {
        // one triangle, selectors [0, 1, 1]
        let raw = [0x14, 0x00, 128, 129];
        let tris = unpack_triangles(&raw_pack(0, 4), &raw, 1).unwrap().unwrap();
        assert_eq!(tris, vec![IVec3::new(1, 2, 3)]);
    }

    #[test]
    fn test_bone_data() {
        let mut payload = vec![0u8, 255];
        payload.extend_from_slice(&[1, 2, 3, 4]);
        let bones = unpack_bone_data(&raw_pack(0, 2), &raw_pack(2, 4), &payload, 2)
            .unwrap()
            .unwrap();
        assert_eq!(bones.weights, vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)]);
        assert_eq!(bones.indices, vec![[1, 2], [3, 4]]);

        assert!(matches!(
            unpack_bone_data(&raw_pack(0, 2), &raw_pack(2, 4), &payload, 3),
            Err(Error::Truncated { wanted: 3, available: 2 })
        ));
        assert!(unpack_bone_data(&raw_pack(0, 2), &DeltaPack::default(), &payload, 2)
            .unwrap()
            .is_none());
    }
}
