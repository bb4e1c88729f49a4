//! One-bit-per-pixel bitmap codec.
//!
//! Pixels are packed eight to a byte, least-significant bit first: pixel
//! `i` lives in bit `i % 8` of byte `i / 8`. The final byte is zero-padded
//! when the pixel count is not a multiple of eight.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::FetchError;

/// Expand packed bytes into `8 * bytes.len()` booleans, ascending bit order.
pub fn unpack_bits(bytes: &[u8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit in 0..8 {
            out.push(byte & (1 << bit) != 0);
        }
    }
    out
}

/// Pack booleans into `ceil(len / 8)` bytes.
pub fn pack_bits(pixels: &[bool]) -> Vec<u8> {
    pixels
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|(_, set)| **set)
                .fold(0u8, |acc, (bit, _)| acc | (1 << bit))
        })
        .collect()
}

/// Decode a base64 string into its unpacked pixel sequence.
///
/// The result is not truncated; callers cut it down to `res_x * res_y`.
pub fn decode_bitmap(encoded: &str) -> Result<Vec<bool>, FetchError> {
    let bytes = STANDARD.decode(encoded)?;
    Ok(unpack_bits(&bytes))
}

/// Pack and base64-encode a pixel sequence.
pub fn encode_bitmap(pixels: &[bool]) -> String {
    STANDARD.encode(pack_bits(pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(n: usize) -> Vec<bool> {
        // Irregular enough that a shifted or reversed bit order shows up.
        (0..n).map(|i| (i * 7 + i / 3) % 5 < 2).collect()
    }

    #[test]
    fn unpack_is_lsb_first() {
        assert_eq!(
            unpack_bits(&[0b0000_0001]),
            vec![true, false, false, false, false, false, false, false]
        );
        assert_eq!(
            unpack_bits(&[0b1000_0010]),
            vec![false, true, false, false, false, false, false, true]
        );
    }

    #[test]
    fn pack_pads_final_byte_with_zeros() {
        assert_eq!(pack_bits(&[true, true, true]), vec![0b0000_0111]);
        assert_eq!(pack_bits(&[]), Vec::<u8>::new());
        assert_eq!(pack_bits(&[false; 9]), vec![0, 0]);
    }

    #[test]
    fn decode_reproduces_packed_prefix() {
        for n in [0, 1, 7, 8, 9, 16, 23, 64, 100] {
            let pixels = pattern(n);
            let decoded = decode_bitmap(&encode_bitmap(&pixels)).expect("valid base64");
            assert_eq!(decoded.len(), n.div_ceil(8) * 8, "n = {n}");
            assert_eq!(&decoded[..n], pixels.as_slice(), "n = {n}");
            assert!(decoded[n..].iter().all(|bit| !bit), "padding set for n = {n}");
        }
    }

    #[test]
    fn decode_known_payload() {
        // 0x01 0xFF
        let decoded = decode_bitmap("Af8=").expect("valid base64");
        assert_eq!(decoded.len(), 16);
        assert!(decoded[0]);
        assert!(!decoded[1..8].iter().any(|b| *b));
        assert!(decoded[8..].iter().all(|b| *b));
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let err = decode_bitmap("not base64!").expect_err("should fail");
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
