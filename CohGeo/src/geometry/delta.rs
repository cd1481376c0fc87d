//! Delta-coded attribute streams
//!
//! A stream holds `N` entries of `K` components. It starts with a selector
//! field of two bits per component (low bits first, component index varying
//! fastest), then one scale byte, then the variable-width deltas:
//!
//! | selector | delta |
//! |---|---|
//! | `00` | 0 |
//! | `01` | `u8 - 127` |
//! | `10` | `u16 - 32767` |
//! | `11` | 32-bit literal |

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Bytes taken by the selector field of `components * entries` values.
pub fn selector_len(components: usize, entries: usize) -> usize {
    (components * 2 * entries).div_ceil(8)
}

/// One decoded delta, tagged with the selector that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delta {
    Zero,
    Small(i32),
    /// The raw 32 bits of a literal.
    Literal(u32),
}

impl Delta {
    fn as_int(self) -> i32 {
        match self {
            Self::Zero => 0,
            Self::Small(v) => v,
            Self::Literal(bits) => bits as i32,
        }
    }
}

struct DeltaStream<'a> {
    selectors: &'a [u8],
    data: &'a [u8],
    bit: usize,
    pos: usize,
}

impl<'a> DeltaStream<'a> {
    /// Split `raw` into selectors, scale byte and data.
    fn new(raw: &'a [u8], components: usize, entries: usize) -> Result<(Self, u8)> {
        let sel_len = selector_len(components, entries);
        if raw.len() < sel_len + 1 {
            return Err(Error::Truncated { wanted: sel_len + 1, available: raw.len() });
        }
        let (selectors, rest) = raw.split_at(sel_len);
        let stream = Self { selectors, data: &rest[1..], bit: 0, pos: 0 };
        Ok((stream, rest[0]))
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.data.len() - self.pos;
        if available < count {
            return Err(Error::Truncated { wanted: count, available });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn next(&mut self) -> Result<Delta> {
        let selector = (self.selectors[self.bit >> 3] >> (self.bit & 7)) & 3;
        self.bit += 2;
        Ok(match selector {
            0 => Delta::Zero,
            1 => Delta::Small(i32::from(self.take(1)?[0]) - 127),
            2 => Delta::Small(i32::from(LittleEndian::read_u16(self.take(2)?)) - 32767),
            _ => Delta::Literal(LittleEndian::read_u32(self.take(4)?)),
        })
    }
}

/// Decode `entries` float vectors of `K` components.
///
/// Deltas are scaled by `1 / (1 << e)`; literals are raw `f32` bits and are
/// added unscaled. Each output is the running sum of its component.
///
/// # Errors
/// Returns [`Error::Truncated`] if the stream ends early.
pub fn unpack_float_deltas<const K: usize>(raw: &[u8], entries: usize) -> Result<Vec<[f32; K]>> {
    let (mut stream, exponent) = DeltaStream::new(raw, K, entries)?;
    // Shift counts wrap at 32, as in the tool that wrote these files.
    let scale = 1.0 / (1i32.wrapping_shl(u32::from(exponent)) as f32);

    let mut acc = [0f32; K];
    let mut out = Vec::with_capacity(entries);
    for _ in 0..entries {
        for component in &mut acc {
            *component += match stream.next()? {
                Delta::Literal(bits) => f32::from_bits(bits),
                delta => delta.as_int() as f32 * scale,
            };
        }
        out.push(acc);
    }
    Ok(out)
}

/// Decode `entries` integer vectors of `K` components.
///
/// The scale byte is ignored and every step adds `delta + 1`.
///
/// # Errors
/// Returns [`Error::Truncated`] if the stream ends early.
pub fn unpack_int_deltas<const K: usize>(raw: &[u8], entries: usize) -> Result<Vec<[i32; K]>> {
    let (mut stream, _) = DeltaStream::new(raw, K, entries)?;

    let mut acc = [0i32; K];
    let mut out = Vec::with_capacity(entries);
    for _ in 0..entries {
        for component in &mut acc {
            *component = component.wrapping_add(stream.next()?.as_int()).wrapping_add(1);
        }
        out.push(acc);
    }
    Ok(out)
}
