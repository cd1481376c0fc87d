//! `CrypticS` bin container reading
//!
//! A bin file is a small header (magic, checksum, `Parse4` tag), a `Files1`
//! directory naming the sources it was built from, and then one root record.
//! Records nest as named chunks; every chunk declares its byte size and the
//! reader keeps a stack of remaining budgets so that a record reading too
//! much or too little is caught where it happens.

use std::fs;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::record::{BinRead, BinRecord};
use crate::error::{Error, Result};

pub const CRYPTIC_MAGIC: &[u8; 8] = b"CrypticS";
pub const PARSE_VERSION_TAG: &str = "Parse4";
pub const FILES_TAG: &str = "Files1";

const MAX_VERSION_LEN: usize = 4096;
const MAX_FILES_TAG_LEN: usize = 20;
const MAX_FILE_NAME_LEN: usize = 260;
/// Longest string accepted inside a record.
pub const MAX_STRING_LEN: usize = 12000;

/// A source file listed in the `Files1` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub timestamp: u32,
}

/// Header of a nested chunk, as returned by [`BinStore::begin_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub name: String,
    pub size: u32,
}

/// Cursor over a bin file with nested chunk budgets.
#[derive(Debug)]
pub struct BinStore {
    data: Vec<u8>,
    pos: usize,
    /// Bytes consumed since the last `prepare_record`.
    bytes_read: u64,
    /// Size of the fixed-field block (then of the child area) of the current record.
    bytes_to_read: u32,
    budgets: Vec<u32>,
    entries: Vec<FileEntry>,
    max_string_len: usize,
}

impl BinStore {
    /// Read a whole bin file and validate its header and file table.
    ///
    /// A non-zero `expected_crc` must match the checksum stored in the file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the header is invalid.
    pub fn open<P: AsRef<Path>>(path: P, expected_crc: u32) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(data, expected_crc)
    }

    /// Validate an in-memory bin image.
    ///
    /// # Errors
    /// Returns an error if the magic, version tag, checksum or file table is invalid.
    pub fn from_bytes(data: Vec<u8>, expected_crc: u32) -> Result<Self> {
        let mut store = Self {
            data,
            pos: 0,
            bytes_read: 0,
            bytes_to_read: 0,
            budgets: Vec::new(),
            entries: Vec::new(),
            max_string_len: MAX_STRING_LEN,
        };
        store.check_version_and_crc(expected_crc)?;
        store.read_file_table()?;
        Ok(store)
    }

    /// Override the longest string accepted in record fields.
    #[must_use]
    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    fn check_version_and_crc(&mut self, expected_crc: u32) -> Result<()> {
        let mut magic = [0u8; 8];
        magic.copy_from_slice(self.take(8)?);
        if &magic != CRYPTIC_MAGIC {
            return Err(Error::InvalidBinMagic(magic));
        }

        let crc = self.read_u32()?;
        let version = self.read_string(MAX_VERSION_LEN)?;
        if !version.starts_with(PARSE_VERSION_TAG) {
            return Err(Error::UnsupportedBinVersion(version));
        }
        if expected_crc != 0 && crc != expected_crc {
            return Err(Error::ChecksumMismatch { expected: expected_crc, found: crc });
        }
        Ok(())
    }

    fn read_file_table(&mut self) -> Result<()> {
        let tag = self.read_string(MAX_FILES_TAG_LEN)?;
        let declared = self.read_u32()?;
        if !tag.starts_with(FILES_TAG) || declared == 0 {
            return Err(Error::InvalidFileTable(format!(
                "tag {tag:?} with size {declared}"
            )));
        }

        let table_start = self.pos;
        let count = self.read_i32()?;
        for _ in 0..count.max(0) {
            let name = self.read_string(MAX_FILE_NAME_LEN)?;
            let timestamp = self.read_u32()?;
            self.entries.push(FileEntry { name, timestamp });
        }
        let table_end = self.pos;

        if declared as usize != table_end - table_start {
            return Err(Error::InvalidFileTable(format!(
                "declared {declared} bytes, entries span {}",
                table_end - table_start
            )));
        }
        self.budgets.push((self.data.len() - table_end) as u32);
        Ok(())
    }

    // ==================== Primitive reads ====================

    fn ensure_readable(&self, wanted: usize) -> Result<()> {
        if let Some(&top) = self.budgets.last() {
            if (top as usize) < wanted {
                return Err(Error::Truncated { wanted, available: top as usize });
            }
        }
        let available = self.data.len() - self.pos;
        if available < wanted {
            return Err(Error::Truncated { wanted, available });
        }
        Ok(())
    }

    fn debit(&mut self, count: usize) {
        self.bytes_read += count as u64;
        if let Some(top) = self.budgets.last_mut() {
            *top -= count as u32;
        }
    }

    /// Consume `count` bytes, charging them to the innermost chunk.
    fn take(&mut self, count: usize) -> Result<&[u8]> {
        self.ensure_readable(count)?;
        let start = self.pos;
        self.pos += count;
        self.debit(count);
        Ok(&self.data[start..start + count])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.take(2)?.read_u16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.take(4)?.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.take(4)?.read_i32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.take(4)?.read_f32::<LittleEndian>()?)
    }

    /// Read any [`BinRead`] value.
    pub fn read<T: BinRead>(&mut self) -> Result<T> {
        T::read_from(self)
    }

    /// Read a `u16`-length-prefixed string and skip to the next 4-byte boundary.
    ///
    /// # Errors
    /// Returns [`Error::StringTooLong`] if the declared length exceeds `max_len`,
    /// or [`Error::Truncated`] if the bytes are not available.
    pub fn read_string(&mut self, max_len: usize) -> Result<String> {
        let len = self.read_u16()? as usize;
        if len > max_len {
            return Err(Error::StringTooLong { len, max: max_len });
        }
        let text: String = self.take(len)?.iter().map(|&b| char::from(b)).collect();
        self.align()?;
        Ok(text)
    }

    /// Read a record string field using the configured maximum length.
    pub fn read_field_string(&mut self) -> Result<String> {
        self.read_string(self.max_string_len)
    }

    /// Skip padding up to the next 4-byte boundary of the file.
    fn align(&mut self) -> Result<()> {
        let pad = (4 - self.pos % 4) % 4;
        if pad != 0 {
            self.take(pad)?;
        }
        Ok(())
    }

    // ==================== Record framing ====================

    /// Start a record: read the size of its fixed-field block.
    pub fn prepare_record(&mut self) -> Result<()> {
        self.bytes_to_read = self.read_u32()?;
        self.bytes_read = 0;
        Ok(())
    }

    /// Finish a record's fixed fields; what is left of the chunk holds its children.
    ///
    /// # Errors
    /// Returns [`Error::RecordSizeMismatch`] if the fields did not consume exactly
    /// the size read by [`prepare_record`](Self::prepare_record).
    pub fn prepare_nested(&mut self) -> Result<()> {
        if u64::from(self.bytes_to_read) != self.bytes_read {
            return Err(Error::RecordSizeMismatch {
                declared: self.bytes_to_read,
                read: self.bytes_read,
            });
        }
        self.bytes_to_read = self.remaining_budget();
        Ok(())
    }

    /// Open the next child chunk of the current record.
    ///
    /// Returns `None` when the current chunk is exhausted or the next header
    /// carries the zero-size terminator.
    ///
    /// # Errors
    /// Returns an error if the header is truncated or the child claims more
    /// bytes than its parent has left.
    pub fn begin_chunk(&mut self) -> Result<Option<ChunkHeader>> {
        if self.end_encountered() {
            return Ok(None);
        }
        let name = self.read_field_string()?;
        let size = self.read_u32()?;
        if size == 0 {
            return Ok(None);
        }

        if let Some(parent) = self.budgets.last_mut() {
            if *parent < size {
                return Err(Error::Truncated { wanted: size as usize, available: *parent as usize });
            }
            *parent -= size;
        }
        self.bytes_to_read = size;
        self.budgets.push(size);
        Ok(Some(ChunkHeader { name, size }))
    }

    /// Close the innermost chunk.
    ///
    /// # Errors
    /// Returns [`Error::ChunkNotExhausted`] if the chunk still had unread bytes.
    pub fn end_chunk(&mut self, kind: &'static str) -> Result<()> {
        match self.budgets.pop() {
            Some(0) | None => Ok(()),
            Some(remaining) => Err(Error::ChunkNotExhausted { record: kind, remaining }),
        }
    }

    /// True when the innermost chunk has been fully consumed.
    pub fn end_encountered(&self) -> bool {
        self.budgets.last().is_none_or(|&b| b == 0)
    }

    pub fn remaining_budget(&self) -> u32 {
        self.budgets.last().copied().unwrap_or(0)
    }

    /// Number of open chunks, counting the whole-file budget.
    pub fn depth(&self) -> usize {
        self.budgets.len()
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    // ==================== Record loading ====================

    /// Load one record from the current chunk and check the chunk is used up.
    ///
    /// # Errors
    /// Returns an error on truncation, size mismatch, an unknown child chunk
    /// or unread trailing bytes.
    pub fn load_record<T: BinRecord>(&mut self) -> Result<T> {
        let record = self.load_record_body::<T>()?;
        if !self.end_encountered() {
            return Err(Error::ChunkNotExhausted {
                record: T::KIND,
                remaining: self.remaining_budget(),
            });
        }
        Ok(record)
    }

    /// Load the root record of the file.
    ///
    /// Trailing bytes after the root record are reported but tolerated.
    pub fn load_root<T: BinRecord>(&mut self) -> Result<T> {
        let record = self.load_record_body::<T>()?;
        if !self.end_encountered() {
            tracing::warn!(
                "{} root record left {} bytes unread",
                T::KIND,
                self.remaining_budget()
            );
        }
        Ok(record)
    }

    fn load_record_body<T: BinRecord>(&mut self) -> Result<T> {
        let mut record = T::default();
        self.prepare_record()?;
        record.read_fields(self)?;
        self.prepare_nested()?;

        while let Some(chunk) = self.begin_chunk()? {
            record.read_child(&chunk.name, self)?;
            self.end_chunk(T::KIND)?;
        }
        Ok(record)
    }
}
