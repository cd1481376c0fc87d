//! Record and primitive decoding traits

use glam::{Vec2, Vec3};

use super::reader::BinStore;
use crate::error::{Error, Result};
use crate::formats::common::Color32;

/// A value that can be read from a bin record's fixed fields.
pub trait BinRead: Sized {
    fn read_from(store: &mut BinStore) -> Result<Self>;
}

impl BinRead for u8 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_u8()
    }
}

impl BinRead for u16 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_u16()
    }
}

impl BinRead for u32 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_u32()
    }
}

impl BinRead for i32 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_i32()
    }
}

impl BinRead for f32 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_f32()
    }
}

impl BinRead for Vec2 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        Ok(Vec2::new(store.read_f32()?, store.read_f32()?))
    }
}

impl BinRead for Vec3 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        Ok(Vec3::new(store.read_f32()?, store.read_f32()?, store.read_f32()?))
    }
}

/// Packed RGB: three channel bytes and one discarded pad byte. Alpha is zero.
impl BinRead for Color32 {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        let r = store.read_u8()?;
        let g = store.read_u8()?;
        let b = store.read_u8()?;
        store.read_u8()?;
        Ok(Color32::new(r, g, b, 0))
    }
}

impl BinRead for String {
    fn read_from(store: &mut BinStore) -> Result<Self> {
        store.read_field_string()
    }
}

/// A structured record stored as a chunk.
///
/// Loading goes through [`BinStore::load_record`]: the fixed-field size is
/// read, [`read_fields`](Self::read_fields) runs, the size is checked, and
/// then every child chunk is handed to [`read_child`](Self::read_child) by
/// name until the chunk is exhausted.
pub trait BinRecord: Default {
    /// Record name used in diagnostics.
    const KIND: &'static str;

    /// Read the fixed fields, in file order.
    fn read_fields(&mut self, store: &mut BinStore) -> Result<()>;

    /// Load one named child chunk. Records without children reject everything.
    fn read_child(&mut self, name: &str, store: &mut BinStore) -> Result<()> {
        let _ = store;
        Err(unknown_chunk::<Self>(name))
    }
}

/// Build the error for a child name a record does not accept.
pub fn unknown_chunk<T: BinRecord>(name: &str) -> Error {
    Error::UnknownChunk { record: T::KIND, name: name.to_string() }
}
