/// Payload encoding and decoding.
///
/// The payload is the concatenation of every input symbol's prefix
/// code, zero-padded to a whole byte at the end. Encoding is a table
/// lookup per symbol; decoding walks the tree bit by bit and emits a
/// symbol at each leaf. The stream carries no terminator, so the
/// decoder must be told how many symbols to produce and stops there,
/// never mistaking pad bits for data.
use crate::bitstream::{BitReader, BitWriter};
use crate::code::CodeTable;
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;
use crate::{HufError, HufResult};

/// Exact payload size in bytes for `freq` under `table`.
///
/// Sums each symbol's count times its code length and rounds the bit
/// total up to whole bytes. Symbols absent from the table contribute
/// nothing, matching what encode would reject anyway.
pub fn encoded_len(freq: &FrequencyTable, table: &CodeTable) -> usize {
    let mut bits = 0u64;
    for symbol in 0..=255u8 {
        bits += freq.get(symbol) * u64::from(table.code(symbol).len);
    }
    ((bits + 7) / 8) as usize
}

/// Encode `input` into `out` using per-symbol codes from `table`.
///
/// Returns the number of payload bytes written. Fails with
/// `UnencodableSymbol` when a byte has no code (the table was built
/// from different data) and `Overflow` when `out` runs out of room;
/// in both cases the bytes committed so far are garbage to the caller.
pub fn encode(input: &[u8], table: &CodeTable, out: &mut [u8]) -> HufResult<usize> {
    let mut writer = BitWriter::new(out);
    for &byte in input {
        let code = table.code(byte);
        if code.len == 0 {
            return Err(HufError::UnencodableSymbol);
        }
        writer.write_bits(code.bits, u32::from(code.len))?;
    }
    writer.finalize()
}

/// Decode exactly `count` symbols from `payload` into `out`.
///
/// Each symbol is recovered by walking `tree` from the root, taking the
/// left child on a `0` bit and the right on a `1`, until a leaf is hit.
/// A single-leaf tree short-circuits that walk: the root already is the
/// leaf, so every symbol costs zero payload bits and only `count`
/// drives the output. Returns the number of symbols written.
///
/// Fails with `Overflow` when `out` cannot hold `count` symbols,
/// `Truncated` when the payload ends mid-walk, and `CorruptTree` when
/// the walk lands on an internal node with a missing child.
pub fn decode(
    payload: &[u8],
    tree: &HuffmanTree,
    count: usize,
    out: &mut [u8],
) -> HufResult<usize> {
    if count > out.len() {
        return Err(HufError::Overflow);
    }

    let mut reader = BitReader::new(payload);
    for slot in out.iter_mut().take(count) {
        let mut index = tree.root();
        while !tree.node(index).is_leaf() {
            let node = tree.node(index);
            let next = if reader.read_bit()? {
                node.right
            } else {
                node.left
            };
            index = match next {
                Some(child) => child,
                None => return Err(HufError::CorruptTree),
            };
        }
        *slot = tree.node(index).symbol;
    }
    Ok(count)
}
