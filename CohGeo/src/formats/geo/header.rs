//! `.geo` header parsing
//!
//! A `.geo` file starts with two little-endian i32 values: the compressed
//! header length plus four, and the inflated header length. The zlib header
//! follows, and the geometry payload begins at `first_value + 8`.
//!
//! The inflated header holds, in order:
//!
//! - four section sizes (payload, texture names, bone names, texture binds)
//! - the texture-name table
//! - the bone-name blob, which also carries the model names
//! - the texture-bind blob
//! - a 140-byte geoset header followed by one 216-byte record per model

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use glam::Vec3;

use super::types::{DeltaPack, PackBlock, TextureBind};
use crate::compression::inflate_exact;
use crate::error::{Error, Result};

const GEOSET_NAME_LEN: usize = 128;
/// Size of one model record in the inflated header.
pub const MODEL_RECORD_SIZE: usize = 216;

/// Section sizes at the start of the inflated header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSizes {
    pub geo_data_size: i32,
    pub texname_blocksize: u32,
    pub bone_names_size: i32,
    pub tex_binds_size: i32,
}

/// One model as stored in the header, before conversion to a [`Model`](super::Model).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRecord {
    pub flags: i32,
    pub radius: f32,
    pub vbo: i32,
    pub num_textures: u32,
    pub id: i16,
    pub blend_mode: u8,
    pub load_state: u8,
    pub boneinfo: i32,
    pub trick: i32,
    pub vertex_count: u32,
    pub tri_count: u32,
    pub texture_bind_offset: i32,
    pub unpacked: i32,
    pub grid_pos: Vec3,
    pub grid_size: f32,
    pub grid_invsize: f32,
    pub grid_tag: f32,
    pub grid_numbits: i32,
    pub ctris: i32,
    pub triangle_tags: i32,
    pub bone_name_offset: i32,
    pub num_altpivots: i32,
    pub extra: i32,
    pub scale: Vec3,
    pub min: Vec3,
    pub max: Vec3,
    pub geoset_list_idx: i32,
    pub packs: PackBlock,
    /// Resolved from the bone-name blob.
    pub name: String,
    /// Resolved from the texture-bind blob.
    pub texture_binds: Vec<TextureBind>,
}

/// Parsed `.geo` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoHeader {
    pub name: String,
    pub tex_names: Vec<String>,
    pub geo_data_size: u32,
    /// File offset of the geometry payload.
    pub data_offset: u64,
    pub unknown: i32,
    pub subs_idx: i32,
    pub models: Vec<ModelRecord>,
}

impl GeoHeader {
    pub fn has_alt_pivots(&self) -> bool {
        self.models.iter().any(|m| m.num_altpivots > 0)
    }
}

/// Read the header of a `.geo` file without touching the payload.
///
/// # Errors
/// Returns an error if the file cannot be read or the header is malformed.
pub fn read_geo_header<P: AsRef<Path>>(path: P) -> Result<GeoHeader> {
    let mut file = File::open(path.as_ref())?;
    let leading = file.read_i32::<LittleEndian>()?;
    let header_size = file.read_i32::<LittleEndian>()?;
    let compressed_len = compressed_len(leading)?;

    let file_len = file.metadata()?.len();
    if compressed_len as u64 > file_len.saturating_sub(8) {
        return Err(Error::InvalidGeoHeader(format!(
            "compressed header of {compressed_len} bytes in a {file_len}-byte file"
        )));
    }
    let mut compressed = vec![0u8; compressed_len];
    file.read_exact(&mut compressed)?;
    decode_header(leading, header_size, &compressed)
}

/// Parse a `.geo` header from the leading bytes of the file.
///
/// # Errors
/// Returns an error if the bytes are truncated or the header is malformed.
pub fn parse_geo_header_bytes(data: &[u8]) -> Result<GeoHeader> {
    let mut cursor = Cursor::new(data);
    let leading = cursor.read_i32::<LittleEndian>()?;
    let header_size = cursor.read_i32::<LittleEndian>()?;
    let compressed_len = compressed_len(leading)?;

    let compressed = data.get(8..8 + compressed_len).ok_or(Error::Truncated {
        wanted: compressed_len.saturating_add(8),
        available: data.len(),
    })?;
    decode_header(leading, header_size, compressed)
}

fn compressed_len(leading: i32) -> Result<usize> {
    leading
        .checked_sub(4)
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| Error::InvalidGeoHeader(format!("compressed header length {leading}")))
}

fn decode_header(leading: i32, header_size: i32, compressed: &[u8]) -> Result<GeoHeader> {
    let header_size = usize::try_from(header_size)
        .map_err(|_| Error::InvalidGeoHeader(format!("header size {header_size}")))?;
    let inflated = inflate_exact(compressed, header_size)?;

    let mut header = parse_inflated(&inflated).map_err(|e| match e {
        Error::Io(io) => Error::InvalidGeoHeader(format!("truncated header: {io}")),
        other => other,
    })?;
    header.data_offset = u64::from(leading.unsigned_abs()) + 8;

    if header.has_alt_pivots() {
        tracing::warn!("{}: alternate model pivots were not converted", header.name);
    }
    Ok(header)
}

fn parse_inflated(data: &[u8]) -> Result<GeoHeader> {
    let mut cursor = Cursor::new(data);
    let sizes = SectionSizes {
        geo_data_size: cursor.read_i32::<LittleEndian>()?,
        texname_blocksize: cursor.read_u32::<LittleEndian>()?,
        bone_names_size: cursor.read_i32::<LittleEndian>()?,
        tex_binds_size: cursor.read_i32::<LittleEndian>()?,
    };
    let geo_data_size = u32::try_from(sizes.geo_data_size)
        .map_err(|_| Error::InvalidGeoHeader(format!("geometry size {}", sizes.geo_data_size)))?;

    let texname_start = cursor.position();
    let tex_names = read_texture_names(&mut cursor)?;
    cursor.seek(SeekFrom::Start(texname_start + u64::from(sizes.texname_blocksize)))?;

    let bone_names = read_blob(&mut cursor, sizes.bone_names_size, "bone names")?;
    let tex_binds = read_blob(&mut cursor, sizes.tex_binds_size, "texture binds")?;

    let mut name_buf = [0u8; GEOSET_NAME_LEN];
    cursor.read_exact(&mut name_buf)?;
    let name = c_string_at(&name_buf, 0)?;
    let unknown = cursor.read_i32::<LittleEndian>()?;
    let subs_idx = cursor.read_i32::<LittleEndian>()?;
    let num_subs = cursor.read_i32::<LittleEndian>()?;
    let num_subs = checked_count(&cursor, num_subs, MODEL_RECORD_SIZE, "model records")?;

    let mut models = Vec::with_capacity(num_subs);
    for _ in 0..num_subs {
        let mut record = read_model_record(&mut cursor)?;
        if !tex_binds.is_empty() {
            record.texture_binds =
                read_texture_binds(&tex_binds, record.texture_bind_offset, record.num_textures)?;
        }
        record.name = c_string_at(&bone_names, offset_of(record.bone_name_offset)?)?;
        models.push(record);
    }

    Ok(GeoHeader {
        name,
        tex_names,
        geo_data_size,
        data_offset: 0,
        unknown,
        subs_idx,
        models,
    })
}

fn read_texture_names(cursor: &mut Cursor<&[u8]>) -> Result<Vec<String>> {
    let count = cursor.read_i32::<LittleEndian>()?;
    let count = checked_count(cursor, count, 4, "texture names")?;
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(cursor.read_i32::<LittleEndian>()?);
    }

    let strings_start = cursor.position() as usize;
    let strings = cursor.get_ref().get(strings_start..).unwrap_or_default();
    offsets
        .into_iter()
        .map(|off| c_string_at(strings, offset_of(off)?))
        .collect()
}

/// Check that `count` items of `item_size` bytes fit in what is left of the header.
fn checked_count(cursor: &Cursor<&[u8]>, count: i32, item_size: usize, what: &str) -> Result<usize> {
    let remaining = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
    usize::try_from(count)
        .ok()
        .filter(|&n| n.checked_mul(item_size).is_some_and(|bytes| bytes <= remaining))
        .ok_or_else(|| {
            Error::InvalidGeoHeader(format!("{count} {what} with {remaining} header bytes left"))
        })
}

fn read_blob(cursor: &mut Cursor<&[u8]>, size: i32, what: &str) -> Result<Vec<u8>> {
    let size = checked_count(cursor, size, 1, what)?;
    let mut blob = vec![0u8; size];
    cursor.read_exact(&mut blob)?;
    Ok(blob)
}

fn read_vec3(cursor: &mut Cursor<&[u8]>) -> Result<Vec3> {
    Ok(Vec3::new(
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
        cursor.read_f32::<LittleEndian>()?,
    ))
}

fn read_model_record(cursor: &mut Cursor<&[u8]>) -> Result<ModelRecord> {
    let mut record = ModelRecord {
        flags: cursor.read_i32::<LittleEndian>()?,
        radius: cursor.read_f32::<LittleEndian>()?,
        vbo: cursor.read_i32::<LittleEndian>()?,
        num_textures: cursor.read_u32::<LittleEndian>()?,
        id: cursor.read_i16::<LittleEndian>()?,
        blend_mode: cursor.read_u8()?,
        load_state: cursor.read_u8()?,
        boneinfo: cursor.read_i32::<LittleEndian>()?,
        trick: cursor.read_i32::<LittleEndian>()?,
        vertex_count: cursor.read_u32::<LittleEndian>()?,
        tri_count: cursor.read_u32::<LittleEndian>()?,
        texture_bind_offset: cursor.read_i32::<LittleEndian>()?,
        unpacked: cursor.read_i32::<LittleEndian>()?,
        grid_pos: read_vec3(cursor)?,
        grid_size: cursor.read_f32::<LittleEndian>()?,
        grid_invsize: cursor.read_f32::<LittleEndian>()?,
        grid_tag: cursor.read_f32::<LittleEndian>()?,
        grid_numbits: cursor.read_i32::<LittleEndian>()?,
        ctris: cursor.read_i32::<LittleEndian>()?,
        triangle_tags: cursor.read_i32::<LittleEndian>()?,
        bone_name_offset: cursor.read_i32::<LittleEndian>()?,
        num_altpivots: cursor.read_i32::<LittleEndian>()?,
        extra: cursor.read_i32::<LittleEndian>()?,
        scale: read_vec3(cursor)?,
        min: read_vec3(cursor)?,
        max: read_vec3(cursor)?,
        geoset_list_idx: cursor.read_i32::<LittleEndian>()?,
        ..ModelRecord::default()
    };

    let mut packs = [DeltaPack::default(); 7];
    for pack in &mut packs {
        // Sizes are stored signed; a negative value never names real data.
        pack.compressed_size = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
        pack.uncomp_size = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
        pack.buffer_offset = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    }
    record.packs = PackBlock::from_array(packs);
    Ok(record)
}

fn read_texture_binds(blob: &[u8], offset: i32, count: u32) -> Result<Vec<TextureBind>> {
    let mut cursor = Cursor::new(blob);
    cursor.seek(SeekFrom::Start(offset_of(offset)? as u64))?;
    (0..count)
        .map(|_| {
            Ok(TextureBind {
                tex_idx: cursor.read_u16::<LittleEndian>()?,
                tri_count: cursor.read_u16::<LittleEndian>()?,
            })
        })
        .collect()
}

fn offset_of(offset: i32) -> Result<usize> {
    usize::try_from(offset).map_err(|_| Error::InvalidGeoHeader(format!("negative offset {offset}")))
}

/// Read a NUL-terminated string starting at `offset`. A missing terminator ends at the blob end.
fn c_string_at(blob: &[u8], offset: usize) -> Result<String> {
    let tail = blob.get(offset..).ok_or_else(|| {
        Error::InvalidGeoHeader(format!("string offset {offset} outside a {}-byte block", blob.len()))
    })?;
    Ok(tail
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect())
}
