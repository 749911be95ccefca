//! On-disk container for compressed images.
//!
//! Bundles everything a decoder needs into one self-contained stream:
//! the image geometry, the serialized prefix tree, and the encoded
//! payload.
//!
//! **Container format (V1):**
//! - Magic bytes: `HUFPIX` (6 bytes)
//! - Version: u16 little-endian, currently 1 (2 bytes)
//! - Width: u32 little-endian, nonzero (4 bytes)
//! - Height: u32 little-endian, nonzero (4 bytes)
//! - Channels: nonzero (1 byte)
//! - Reserved: written as zero, ignored on read (1 byte)
//! - Tree length: u32 little-endian (4 bytes), then the serialized tree
//! - Payload length: u32 little-endian (4 bytes), then the payload
//!
//! The symbol count is `width * height * channels`, so the payload
//! needs no terminator and trailing bytes past the payload section are
//! ignored.

use crate::code::CodeTable;
use crate::frequency::get_frequency;
use crate::payload;
use crate::tree::HuffmanTree;
use crate::{HufError, HufResult};

/// Magic bytes for the hufpix container format.
pub(crate) const MAGIC: [u8; 6] = *b"HUFPIX";
/// Container format version.
pub(crate) const VERSION: u16 = 1;

/// Fixed header size: magic(6) + version(2) + width(4) + height(4)
/// + channels(1) + reserved(1) = 18.
const HEADER_SIZE: usize = 18;

/// Image dimensions carried through the container.
///
/// A flat byte buffer with no pixel structure travels as
/// `len x 1 x 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl Geometry {
    /// Describe a flat buffer of `len` bytes.
    pub fn flat(len: u32) -> Self {
        Geometry {
            width: len,
            height: 1,
            channels: 1,
        }
    }

    /// Total number of byte elements, `width * height * channels`.
    ///
    /// Fails with `CapacityExceeded` if the product overflows `usize`.
    pub fn element_count(&self) -> HufResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.channels as usize))
            .ok_or(HufError::CapacityExceeded)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compress a pixel buffer into a self-contained stream.
///
/// Builds the frequency table, tree, and code table for `pixels`, then
/// writes header, tree, and payload into exactly-sized sections.
///
/// Fails with `EmptyInput` for an empty buffer and `InvalidContainer`
/// when `geometry` does not describe `pixels.len()` elements.
pub fn compress(pixels: &[u8], geometry: Geometry) -> HufResult<Vec<u8>> {
    if pixels.is_empty() {
        return Err(HufError::EmptyInput);
    }
    if geometry.element_count()? != pixels.len() {
        return Err(HufError::InvalidContainer);
    }

    let freq = get_frequency(pixels);
    let tree = HuffmanTree::from_frequencies(&freq)?;
    let table = CodeTable::from_tree(&tree)?;

    let mut tree_buf = vec![0u8; tree.serialized_len()];
    let tree_len = tree.serialize(&mut tree_buf)?;

    let mut payload_buf = vec![0u8; payload::encoded_len(&freq, &table)];
    let payload_len = payload::encode(pixels, &table, &mut payload_buf)?;

    // Section lengths travel as u32.
    if tree_len > u32::MAX as usize || payload_len > u32::MAX as usize {
        return Err(HufError::CapacityExceeded);
    }

    let mut output = Vec::with_capacity(HEADER_SIZE + 4 + tree_len + 4 + payload_len);
    write_header(&mut output, geometry);
    output.extend_from_slice(&(tree_len as u32).to_le_bytes());
    output.extend_from_slice(&tree_buf[..tree_len]);
    output.extend_from_slice(&(payload_len as u32).to_le_bytes());
    output.extend_from_slice(&payload_buf[..payload_len]);
    Ok(output)
}

/// Decompress a stream produced by [`compress`].
///
/// Validates the header, rebuilds the tree, and decodes exactly
/// `width * height * channels` symbols. Returns the pixels and the
/// geometry recorded in the header.
///
/// Fails with `Truncated` when any section ends early or the payload
/// is too short for the declared geometry, `InvalidContainer` on a bad
/// magic or zero geometry, and `UnsupportedVersion` on a version this
/// build does not read.
pub fn decompress(data: &[u8]) -> HufResult<(Vec<u8>, Geometry)> {
    if data.len() < HEADER_SIZE {
        return Err(HufError::Truncated);
    }
    if data[..6] != MAGIC {
        return Err(HufError::InvalidContainer);
    }
    let version = u16::from_le_bytes([data[6], data[7]]);
    if version != VERSION {
        return Err(HufError::UnsupportedVersion);
    }

    let geometry = Geometry {
        width: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
        height: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
        channels: data[16],
    };
    let total = geometry.element_count()?;
    if total == 0 {
        // Compression never writes an empty image.
        return Err(HufError::InvalidContainer);
    }

    let tree_len = read_u32_le(data, HEADER_SIZE)? as usize;
    let tree_start = HEADER_SIZE + 4;
    let tree_end = tree_start
        .checked_add(tree_len)
        .ok_or(HufError::Truncated)?;
    let tree_bytes = data.get(tree_start..tree_end).ok_or(HufError::Truncated)?;
    let tree = HuffmanTree::deserialize(tree_bytes)?;

    let payload_len = read_u32_le(data, tree_end)? as usize;
    let payload_start = tree_end + 4;
    let payload_end = payload_start
        .checked_add(payload_len)
        .ok_or(HufError::Truncated)?;
    let payload_bytes = data
        .get(payload_start..payload_end)
        .ok_or(HufError::Truncated)?;

    // Every stream the compressor writes carries at least one payload
    // bit per symbol, single-leaf streams included (the forced one-bit
    // code), so a count beyond the payload's bit supply marks a forged
    // or corrupt header. Reject it before sizing the output buffer.
    if total > payload_bytes.len().saturating_mul(8) {
        return Err(HufError::Truncated);
    }

    let mut pixels = vec![0u8; total];
    payload::decode(payload_bytes, &tree, total, &mut pixels)?;
    Ok((pixels, geometry))
}

// ---------------------------------------------------------------------------
// Container format helpers
// ---------------------------------------------------------------------------

/// Write the container header to output.
fn write_header(output: &mut Vec<u8>, geometry: Geometry) {
    output.extend_from_slice(&MAGIC);
    output.extend_from_slice(&VERSION.to_le_bytes());
    output.extend_from_slice(&geometry.width.to_le_bytes());
    output.extend_from_slice(&geometry.height.to_le_bytes());
    output.push(geometry.channels);
    output.push(0); // reserved
}

fn read_u32_le(data: &[u8], offset: usize) -> HufResult<u32> {
    let end = offset.checked_add(4).ok_or(HufError::Truncated)?;
    let bytes = data.get(offset..end).ok_or(HufError::Truncated)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_geometry() {
        let pixels: Vec<u8> = (0..36).map(|i| (i * 7 % 5) as u8).collect();
        let geometry = Geometry {
            width: 4,
            height: 3,
            channels: 3,
        };
        let stream = compress(&pixels, geometry).unwrap();
        let (decoded, parsed) = decompress(&stream).unwrap();
        assert_eq!(decoded, pixels);
        assert_eq!(parsed, geometry);
    }

    #[test]
    fn test_round_trip_flat_buffer() {
        let input = b"flat files are just one-row images".to_vec();
        let stream = compress(&input, Geometry::flat(input.len() as u32)).unwrap();
        let (decoded, geometry) = decompress(&stream).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(geometry.width as usize, input.len());
        assert_eq!(geometry.height, 1);
        assert_eq!(geometry.channels, 1);
    }

    #[test]
    fn test_round_trip_uniform_image() {
        let pixels = vec![0x80u8; 64];
        let geometry = Geometry {
            width: 8,
            height: 8,
            channels: 1,
        };
        let stream = compress(&pixels, geometry).unwrap();
        let (decoded, _) = decompress(&stream).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn test_header_layout() {
        let stream = compress(b"abcabc", Geometry::flat(6)).unwrap();
        assert_eq!(&stream[..6], b"HUFPIX");
        assert_eq!(u16::from_le_bytes([stream[6], stream[7]]), 1);
        assert_eq!(
            u32::from_le_bytes([stream[8], stream[9], stream[10], stream[11]]),
            6
        );
        assert_eq!(
            u32::from_le_bytes([stream[12], stream[13], stream[14], stream[15]]),
            1
        );
        assert_eq!(stream[16], 1); // channels
        assert_eq!(stream[17], 0); // reserved
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(
            compress(&[], Geometry::flat(0)),
            Err(HufError::EmptyInput)
        );
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let geometry = Geometry {
            width: 2,
            height: 2,
            channels: 1,
        };
        assert_eq!(
            compress(b"hello", geometry),
            Err(HufError::InvalidContainer)
        );
    }

    #[test]
    fn test_bad_magic() {
        let mut stream = compress(b"payload", Geometry::flat(7)).unwrap();
        stream[0] = b'X';
        assert_eq!(decompress(&stream), Err(HufError::InvalidContainer));
    }

    #[test]
    fn test_unsupported_version() {
        let mut stream = compress(b"payload", Geometry::flat(7)).unwrap();
        stream[6] = 99;
        assert_eq!(decompress(&stream), Err(HufError::UnsupportedVersion));
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let mut stream = compress(b"payload", Geometry::flat(7)).unwrap();
        // Zero out the width field.
        stream[8..12].copy_from_slice(&0u32.to_le_bytes());
        assert_eq!(decompress(&stream), Err(HufError::InvalidContainer));
    }

    #[test]
    fn test_truncated_header() {
        let stream = compress(b"payload", Geometry::flat(7)).unwrap();
        assert_eq!(decompress(&stream[..10]), Err(HufError::Truncated));
    }

    #[test]
    fn test_truncated_tree_section() {
        let stream = compress(b"several distinct symbols", Geometry::flat(24)).unwrap();
        // Cut inside the tree bytes; the declared length overruns.
        assert_eq!(
            decompress(&stream[..HEADER_SIZE + 6]),
            Err(HufError::Truncated)
        );
    }

    #[test]
    fn test_truncated_payload_section() {
        let stream = compress(b"several distinct symbols", Geometry::flat(24)).unwrap();
        assert_eq!(
            decompress(&stream[..stream.len() - 1]),
            Err(HufError::Truncated)
        );
    }

    #[test]
    fn test_corrupt_tree_section() {
        let mut stream = compress(b"several distinct symbols", Geometry::flat(24)).unwrap();
        // Declared tree length stays, tree bits become an endless
        // internal chain.
        let tree_len = read_u32_le(&stream, HEADER_SIZE).unwrap() as usize;
        for byte in &mut stream[HEADER_SIZE + 4..HEADER_SIZE + 4 + tree_len] {
            *byte = 0;
        }
        assert!(matches!(
            decompress(&stream),
            Err(HufError::Truncated) | Err(HufError::CorruptTree)
        ));
    }

    #[test]
    fn test_forged_geometry_on_single_leaf_stream() {
        // A huge element count that passes the overflow check but that
        // the two-byte tree and one-byte payload cannot possibly back.
        // Must error out instead of attempting the allocation.
        let mut stream = compress(&[7u8], Geometry::flat(1)).unwrap();
        stream[8..12].copy_from_slice(&0x8000_0000u32.to_le_bytes());
        stream[12..16].copy_from_slice(&0x8000_0000u32.to_le_bytes());
        assert_eq!(decompress(&stream), Err(HufError::Truncated));
    }

    #[test]
    fn test_forged_geometry_on_two_leaf_stream() {
        let mut stream = compress(b"abab", Geometry::flat(4)).unwrap();
        stream[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(decompress(&stream), Err(HufError::Truncated));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut stream = compress(b"trailing", Geometry::flat(8)).unwrap();
        stream.extend_from_slice(b"junk");
        let (decoded, _) = decompress(&stream).unwrap();
        assert_eq!(decoded, b"trailing");
    }

    #[test]
    fn test_stream_has_exact_sections() {
        let input = b"exactly sized sections";
        let stream = compress(input, Geometry::flat(input.len() as u32)).unwrap();
        let tree_len = read_u32_le(&stream, HEADER_SIZE).unwrap() as usize;
        let payload_off = HEADER_SIZE + 4 + tree_len;
        let payload_len = read_u32_le(&stream, payload_off).unwrap() as usize;
        assert_eq!(stream.len(), payload_off + 4 + payload_len);
    }

    #[test]
    fn test_element_count_overflow() {
        let geometry = Geometry {
            width: u32::MAX,
            height: u32::MAX,
            channels: 255,
        };
        assert_eq!(geometry.element_count(), Err(HufError::CapacityExceeded));
    }
}
