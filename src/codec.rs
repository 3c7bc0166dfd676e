//! Order-preserving key encoding.
//!
//! Every encoder here maps a native value to bytes such that comparing two
//! encodings with plain unsigned byte-wise comparison gives the same answer
//! as comparing the original values. The indexes only ever see these bytes.
//!
//! ```text
//! i64:  -5           0            3
//!       7F..FF FB    80..00 00    80..00 03     (sign bit flipped, big-endian)
//!
//! f64:  -1.5         -0.0         0.0          1.5          NaN
//!       40 07 FF..   7F FF FF..   80 00 00..   BF F8 00..   FF F8 00..
//! ```
//!
//! ## Float edge cases
//! - `-0.0` and `0.0` are distinct keys, `-0.0` first (same as `f64::total_cmp`).
//!   Callers that want SQL equality between them must normalize first.
//! - `-Infinity` / `+Infinity` sit at the two ends of the finite range.
//! - Every NaN is canonicalized to the positive quiet NaN, so all NaNs share
//!   one key that sorts after `+Infinity`.

use crate::error::{Error, Result};

/// Width of an encoded integer or float key.
pub const NUMERIC_KEY_WIDTH: usize = 8;

const SIGN_BIT: u64 = 0x8000_0000_0000_0000;
const HIGH_SIGN_FLIP: u32 = 0x8000_0000;

/// Encode a signed integer.
///
/// The value is split into high/low 32-bit halves; the high half has its sign
/// bit flipped so negatives sort below non-negatives, then both halves are
/// written big-endian.
pub fn pack_int(n: i64) -> [u8; NUMERIC_KEY_WIDTH] {
    let bits = n as u64;
    let high = ((bits >> 32) as u32) ^ HIGH_SIGN_FLIP;
    let low = bits as u32;

    let mut out = [0u8; NUMERIC_KEY_WIDTH];
    out[..4].copy_from_slice(&high.to_be_bytes());
    out[4..].copy_from_slice(&low.to_be_bytes());
    out
}

/// Inverse of [`pack_int`].
pub fn unpack_int(bytes: [u8; NUMERIC_KEY_WIDTH]) -> i64 {
    let high = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) ^ HIGH_SIGN_FLIP;
    let low = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    (((high as u64) << 32) | low as u64) as i64
}

/// Encode a double.
///
/// Negative values have all bits inverted (reversing their magnitude order),
/// non-negative values only get the sign bit set.
pub fn pack_float(f: f64) -> [u8; NUMERIC_KEY_WIDTH] {
    let f = if f.is_nan() { f64::NAN } else { f };
    let bits = f.to_bits();
    let ordered = if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT
    };
    ordered.to_be_bytes()
}

/// Inverse of [`pack_float`]. A NaN comes back as the canonical quiet NaN.
pub fn unpack_float(bytes: [u8; NUMERIC_KEY_WIDTH]) -> f64 {
    let ordered = u64::from_be_bytes(bytes);
    // Sign bit clear after encoding means the original was negative.
    let bits = if ordered & SIGN_BIT == 0 {
        !ordered
    } else {
        ordered ^ SIGN_BIT
    };
    f64::from_bits(bits)
}

/// Encode a string key, optionally truncated to `max_length` bytes.
///
/// Raw bytes already order correctly; collation is the caller's concern.
/// Truncation is byte-based and may cut a multi-byte character in half,
/// which is harmless since keys are never decoded back to text here.
pub fn pack_string(s: &str, max_length: Option<usize>) -> Vec<u8> {
    let bytes = s.as_bytes();
    match max_length {
        Some(max) if bytes.len() > max => bytes[..max].to_vec(),
        _ => bytes.to_vec(),
    }
}

/// Validating variant of [`unpack_int`] for keys of unknown provenance.
pub fn try_unpack_int(key: &[u8]) -> Result<i64> {
    numeric_key(key).map(unpack_int)
}

/// Validating variant of [`unpack_float`] for keys of unknown provenance.
pub fn try_unpack_float(key: &[u8]) -> Result<f64> {
    numeric_key(key).map(unpack_float)
}

fn numeric_key(key: &[u8]) -> Result<[u8; NUMERIC_KEY_WIDTH]> {
    key.try_into().map_err(|_| Error::InvalidKeyLength {
        expected: NUMERIC_KEY_WIDTH,
        actual: key.len(),
    })
}
