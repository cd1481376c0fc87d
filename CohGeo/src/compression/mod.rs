//! Compression utilities

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{Error, Result};

/// Largest expansion ratio a deflate stream can reach.
const MAX_DEFLATE_RATIO: usize = 1032;

/// Inflate zlib data that must expand to exactly `expected_size` bytes.
///
/// # Errors
/// Returns an error if the stream is corrupt or its inflated length differs
/// from `expected_size`.
pub fn inflate_exact(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let decoder = ZlibDecoder::new(compressed);
    // The declared size comes from the file; never reserve more than the stream can expand to.
    let reserve = expected_size.min(compressed.len().saturating_mul(MAX_DEFLATE_RATIO));
    let mut decompressed = Vec::with_capacity(reserve);

    // One extra byte is enough to detect an over-long stream.
    decoder
        .take(expected_size as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::ZlibDecompressionFailed(e.to_string()))?;

    if decompressed.len() != expected_size {
        return Err(Error::DecompressionSizeMismatch {
            expected: expected_size,
            actual: decompressed.len(),
        });
    }
    Ok(decompressed)
}
