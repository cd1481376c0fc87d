//! Byte fixture writers for unit tests

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use glam::{Vec2, Vec3};

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn put_pstr(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u16).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

fn patch_u32(out: &mut [u8], at: usize, value: u32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn adjust(value: usize, delta: i64) -> u32 {
    (value as i64 + delta) as u32
}

#[derive(Debug, Clone)]
enum Field {
    Bytes(Vec<u8>),
    Str(String),
}

#[derive(Debug, Clone)]
enum Tail {
    Terminator,
    Bytes(Vec<u8>),
}

/// A record chunk: fixed fields, named children and optional trailing bytes.
///
/// Strings are padded against the absolute position in the file being
/// written, the same way the reader aligns them.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    fields: Vec<Field>,
    children: Vec<(String, Chunk, i64)>,
    tail: Vec<Tail>,
    fixed_size_delta: i64,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    fn bytes(mut self, bytes: &[u8]) -> Self {
        self.fields.push(Field::Bytes(bytes.to_vec()));
        self
    }

    pub fn i32(self, v: i32) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(self, v: u32) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn f32(self, v: f32) -> Self {
        self.bytes(&v.to_le_bytes())
    }

    pub fn vec2(self, v: Vec2) -> Self {
        self.f32(v.x).f32(v.y)
    }

    pub fn vec3(self, v: Vec3) -> Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    pub fn rgb(self, r: u8, g: u8, b: u8) -> Self {
        self.bytes(&[r, g, b, 0])
    }

    pub fn string(mut self, s: &str) -> Self {
        self.fields.push(Field::Str(s.to_string()));
        self
    }

    pub fn child(self, name: &str, chunk: Chunk) -> Self {
        self.child_with_size_delta(name, chunk, 0)
    }

    /// Add a child whose declared size is off by `delta` bytes.
    pub fn child_with_size_delta(mut self, name: &str, chunk: Chunk, delta: i64) -> Self {
        self.children.push((name.to_string(), chunk, delta));
        self
    }

    /// Append a zero-size chunk header after the children.
    pub fn terminator(mut self) -> Self {
        self.tail.push(Tail::Terminator);
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.tail.push(Tail::Bytes(bytes.to_vec()));
        self
    }

    /// Declare a fixed-field size off by `delta` bytes.
    pub fn with_fixed_size_delta(mut self, delta: i64) -> Self {
        self.fixed_size_delta = delta;
        self
    }

    pub fn write_into(&self, out: &mut Vec<u8>) {
        let size_at = out.len();
        out.extend_from_slice(&[0; 4]);
        let fields_start = out.len();
        for field in &self.fields {
            match field {
                Field::Bytes(b) => out.extend_from_slice(b),
                Field::Str(s) => put_pstr(out, s),
            }
        }
        let fixed = adjust(out.len() - fields_start, self.fixed_size_delta);
        patch_u32(out, size_at, fixed);

        for (name, chunk, delta) in &self.children {
            put_pstr(out, name);
            let child_size_at = out.len();
            out.extend_from_slice(&[0; 4]);
            let child_start = out.len();
            chunk.write_into(out);
            let size = adjust(out.len() - child_start, *delta);
            patch_u32(out, child_size_at, size);
        }

        for tail in &self.tail {
            match tail {
                Tail::Terminator => {
                    put_pstr(out, "");
                    out.extend_from_slice(&[0; 4]);
                }
                Tail::Bytes(b) => out.extend_from_slice(b),
            }
        }
    }
}

/// A complete bin file: header, `Files1` table and the root record.
pub fn bin_file(crc: u32, files: &[(&str, u32)], root: &Chunk) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"CrypticS");
    out.extend_from_slice(&crc.to_le_bytes());
    put_pstr(&mut out, "Parse4");
    put_pstr(&mut out, "Files1");

    let size_at = out.len();
    out.extend_from_slice(&[0; 4]);
    let table_start = out.len();
    out.extend_from_slice(&(files.len() as i32).to_le_bytes());
    for (name, timestamp) in files {
        put_pstr(&mut out, name);
        out.extend_from_slice(&timestamp.to_le_bytes());
    }
    let table_len = (out.len() - table_start) as u32;
    patch_u32(&mut out, size_at, table_len);

    root.write_into(&mut out);
    out
}

// ==================== .geo writer ====================

pub const TRIS: usize = 0;
pub const VERTS: usize = 1;
pub const NORMS: usize = 2;
pub const STS: usize = 3;
pub const WEIGHTS: usize = 4;
pub const MATIDXS: usize = 5;

#[derive(Debug, Clone)]
struct Stream {
    uncompressed_len: usize,
    stored: Vec<u8>,
    compressed: bool,
}

/// One model of a [`GeoFile`].
#[derive(Debug, Clone)]
pub struct GeoModel {
    name: String,
    flags: u32,
    blend_mode: u8,
    vertex_count: u32,
    tri_count: u32,
    binds: Vec<(u16, u16)>,
    alt_pivots: i32,
    min: Vec3,
    max: Vec3,
    streams: [Option<Stream>; 7],
}

impl GeoModel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: 0,
            blend_mode: 0,
            vertex_count: 0,
            tri_count: 0,
            binds: Vec::new(),
            alt_pivots: 0,
            min: Vec3::ZERO,
            max: Vec3::ZERO,
            streams: Default::default(),
        }
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn blend(mut self, mode: u8) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn vertices(mut self, count: u32) -> Self {
        self.vertex_count = count;
        self
    }

    pub fn triangles(mut self, count: u32) -> Self {
        self.tri_count = count;
        self
    }

    pub fn bind(mut self, tex_idx: u16, tri_count: u16) -> Self {
        self.binds.push((tex_idx, tri_count));
        self
    }

    pub fn alt_pivots(mut self, count: i32) -> Self {
        self.alt_pivots = count;
        self
    }

    pub fn bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Store `raw` as stream `slot`, zlib-compressed when `compress` is set.
    pub fn stream(mut self, slot: usize, raw: &[u8], compress: bool) -> Self {
        let stored = if compress { zlib(raw) } else { raw.to_vec() };
        self.streams[slot] = Some(Stream { uncompressed_len: raw.len(), stored, compressed: compress });
        self
    }
}

/// A `.geo` file: a geoset name, its texture names and models.
#[derive(Debug, Clone)]
pub struct GeoFile {
    name: String,
    textures: Vec<String>,
    models: Vec<GeoModel>,
}

impl GeoFile {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), textures: Vec::new(), models: Vec::new() }
    }

    pub fn texture(mut self, name: &str) -> Self {
        self.textures.push(name.to_string());
        self
    }

    pub fn model(mut self, model: GeoModel) -> Self {
        self.models.push(model);
        self
    }

    fn payload_and_packs(&self) -> (Vec<u8>, Vec<[(u32, u32, u32); 7]>) {
        let mut payload = Vec::new();
        let mut all_packs = Vec::new();
        for model in &self.models {
            let mut packs = [(0u32, 0u32, 0u32); 7];
            for (slot, stream) in model.streams.iter().enumerate() {
                if let Some(s) = stream {
                    let compressed = if s.compressed { s.stored.len() as u32 } else { 0 };
                    packs[slot] = (compressed, s.uncompressed_len as u32, payload.len() as u32);
                    payload.extend_from_slice(&s.stored);
                }
            }
            all_packs.push(packs);
        }
        (payload, all_packs)
    }

    fn inflated_header(&self, payload_len: usize, packs: &[[(u32, u32, u32); 7]]) -> Vec<u8> {
        let mut names = Vec::new();
        let mut name_offsets = Vec::new();
        for tex in &self.textures {
            name_offsets.push(names.len() as i32);
            names.extend_from_slice(tex.as_bytes());
            names.push(0);
        }
        let texname_blocksize = 4 + 4 * self.textures.len() + names.len();

        let mut bone_names = Vec::new();
        let mut binds = Vec::new();
        let mut model_offsets = Vec::new();
        for model in &self.models {
            let name_off = bone_names.len() as i32;
            bone_names.extend_from_slice(model.name.as_bytes());
            bone_names.push(0);
            let bind_off = binds.len() as i32;
            for (tex, tris) in &model.binds {
                binds.extend_from_slice(&tex.to_le_bytes());
                binds.extend_from_slice(&tris.to_le_bytes());
            }
            model_offsets.push((name_off, bind_off));
        }

        let mut out = Vec::new();
        let i32s = |out: &mut Vec<u8>, v: i32| out.extend_from_slice(&v.to_le_bytes());
        let f32s = |out: &mut Vec<u8>, v: f32| out.extend_from_slice(&v.to_le_bytes());

        i32s(&mut out, payload_len as i32);
        i32s(&mut out, texname_blocksize as i32);
        i32s(&mut out, bone_names.len() as i32);
        i32s(&mut out, binds.len() as i32);

        i32s(&mut out, self.textures.len() as i32);
        for off in &name_offsets {
            i32s(&mut out, *off);
        }
        out.extend_from_slice(&names);
        out.extend_from_slice(&bone_names);
        out.extend_from_slice(&binds);

        let mut name_buf = [0u8; 128];
        name_buf[..self.name.len()].copy_from_slice(self.name.as_bytes());
        out.extend_from_slice(&name_buf);
        i32s(&mut out, 0);
        i32s(&mut out, 0);
        i32s(&mut out, self.models.len() as i32);

        for ((model, (name_off, bind_off)), model_packs) in
            self.models.iter().zip(&model_offsets).zip(packs)
        {
            let start = out.len();
            i32s(&mut out, model.flags as i32);
            f32s(&mut out, 1.0);
            i32s(&mut out, 0);
            out.extend_from_slice(&(model.binds.len() as u32).to_le_bytes());
            out.extend_from_slice(&0i16.to_le_bytes());
            out.push(model.blend_mode);
            out.push(0);
            i32s(&mut out, 0);
            i32s(&mut out, 0);
            out.extend_from_slice(&model.vertex_count.to_le_bytes());
            out.extend_from_slice(&model.tri_count.to_le_bytes());
            i32s(&mut out, *bind_off);
            i32s(&mut out, 0);
            for _ in 0..3 {
                f32s(&mut out, 0.0);
            }
            for _ in 0..3 {
                f32s(&mut out, 0.0);
            }
            i32s(&mut out, 0);
            i32s(&mut out, 0);
            i32s(&mut out, 0);
            i32s(&mut out, *name_off);
            i32s(&mut out, model.alt_pivots);
            i32s(&mut out, 0);
            for v in [Vec3::ONE, model.min, model.max] {
                f32s(&mut out, v.x);
                f32s(&mut out, v.y);
                f32s(&mut out, v.z);
            }
            i32s(&mut out, 0);
            for (compressed, uncompressed, offset) in model_packs {
                out.extend_from_slice(&compressed.to_le_bytes());
                out.extend_from_slice(&uncompressed.to_le_bytes());
                out.extend_from_slice(&offset.to_le_bytes());
            }
            assert_eq!(out.len() - start, 216);
        }
        out
    }

    fn compressed_header(&self) -> (Vec<u8>, usize, Vec<u8>) {
        let (payload, packs) = self.payload_and_packs();
        let header = self.inflated_header(payload.len(), &packs);
        (zlib(&header), header.len(), payload)
    }

    /// File offset of the geometry payload.
    pub fn data_offset(&self) -> u64 {
        let (compressed, _, _) = self.compressed_header();
        compressed.len() as u64 + 4 + 8
    }

    pub fn encode(&self) -> Vec<u8> {
        let (compressed, header_len, payload) = self.compressed_header();
        let mut out = Vec::new();
        out.extend_from_slice(&(compressed.len() as i32 + 4).to_le_bytes());
        out.extend_from_slice(&(header_len as i32).to_le_bytes());
        out.extend_from_slice(&compressed);
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&payload);
        out
    }
}
