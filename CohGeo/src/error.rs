//! Error types for `cohgeo`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `cohgeo` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while reading a config file or writing a summary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Bin Container Errors ====================
    /// The file does not start with the `CrypticS` magic.
    #[error("invalid bin magic: expected CrypticS, found {0:?}")]
    InvalidBinMagic([u8; 8]),

    /// The version tag after the checksum is not `Parse4`.
    #[error("unsupported bin version tag: {0:?}")]
    UnsupportedBinVersion(String),

    /// The file checksum does not match the one required for this kind of bin.
    #[error("checksum mismatch: expected {expected:#010x}, found {found:#010x}")]
    ChecksumMismatch {
        /// The checksum required by the caller.
        expected: u32,
        /// The checksum stored in the file.
        found: u32,
    },

    /// The `Files1` directory block is malformed.
    #[error("invalid Files1 table: {0}")]
    InvalidFileTable(String),

    /// A read would run past the current chunk budget or the end of the stream.
    #[error("truncated read: wanted {wanted} bytes, {available} available")]
    Truncated {
        /// Number of bytes requested.
        wanted: usize,
        /// Number of bytes the budget or stream still had.
        available: usize,
    },

    /// A length-prefixed string is longer than the caller allows.
    #[error("string of {len} bytes exceeds maximum of {max}")]
    StringTooLong {
        /// The declared length.
        len: usize,
        /// The maximum accepted length.
        max: usize,
    },

    /// A record contains a child chunk its schema does not know about.
    #[error("unknown chunk '{name}' inside {record}")]
    UnknownChunk {
        /// The record type being loaded.
        record: &'static str,
        /// The unexpected child chunk name.
        name: String,
    },

    /// A chunk was closed before its declared size was consumed.
    #[error("{record} chunk closed with {remaining} bytes left unread")]
    ChunkNotExhausted {
        /// The record type being loaded.
        record: &'static str,
        /// Bytes still left in the chunk budget.
        remaining: u32,
    },

    /// A record's fixed fields did not add up to the declared size.
    #[error("record fixed fields size mismatch: declared {declared}, read {read}")]
    RecordSizeMismatch {
        /// The declared fixed-field size.
        declared: u32,
        /// The number of bytes actually consumed.
        read: u64,
    },

    // ==================== Geo Format Errors ====================
    /// The `.geo` header is invalid or corrupted.
    #[error("invalid geo header: {0}")]
    InvalidGeoHeader(String),

    /// Inflating produced a different number of bytes than declared.
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressionSizeMismatch {
        /// The declared size.
        expected: usize,
        /// The number of bytes produced.
        actual: usize,
    },

    /// Zlib decompression failed.
    #[error("zlib decompression failed: {0}")]
    ZlibDecompressionFailed(String),

    /// A delta pack window lies outside the geoset payload.
    #[error("pack window {offset}..{end} outside payload of {payload_len} bytes")]
    PackOutOfBounds {
        /// Start of the window.
        offset: usize,
        /// End of the window (exclusive).
        end: usize,
        /// Length of the loaded payload.
        payload_len: usize,
    },

    /// Texture binds do not cover the model's triangle list exactly.
    #[error("texture binds cover {bound} triangles but model has {total}")]
    TextureBindMismatch {
        /// Sum of the bind triangle counts.
        bound: usize,
        /// The model triangle count.
        total: usize,
    },

    /// Geometry was requested before the geoset payload was loaded.
    #[error("geoset data not loaded: {0}")]
    GeoDataNotLoaded(String),

    // ==================== Resource Errors ====================
    /// A path segment could not be found, even ignoring case.
    #[error("cannot find '{segment}' under {}", under.display())]
    PathNotFound {
        /// The segment that did not match.
        segment: String,
        /// The directory that was searched.
        under: PathBuf,
    },

    /// The requested geoset is not known to the catalog.
    #[error("geoset not found: {0}")]
    GeoSetNotFound(String),

    /// The requested model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// No prefab library lists the requested name.
    #[error("prefab not found: {0}")]
    PrefabNotFound(String),

    // ==================== Config Errors ====================
    /// Invalid import configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for `cohgeo` operations.
pub type Result<T> = std::result::Result<T, Error>;
