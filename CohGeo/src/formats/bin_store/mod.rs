//! `CrypticS`/`Parse4` nested-chunk bin format

pub mod reader;
pub mod record;

pub use reader::{BinStore, ChunkHeader, FileEntry, MAX_STRING_LEN};
pub use record::{BinRead, BinRecord, unknown_chunk};
