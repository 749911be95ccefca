//! Huffman entropy-coding core for the hufpix image compressor.
//!
//! The library builds an optimal prefix code from a byte-frequency
//! distribution, serializes the code's defining tree as a compact
//! bitstream, and encodes/decodes raw byte buffers against it. Image
//! pixel I/O is deliberately outside the crate: callers hand in flat
//! byte buffers (pixel data, or any other bytes) and get flat byte
//! buffers back.
//!
//! **Encoding flow:**
//! `FrequencyTable` → [`tree::HuffmanTree`] → { [`code::CodeTable`] →
//! payload bits; tree bits }
//!
//! **Decoding flow:**
//! tree bits → [`tree::HuffmanTree`] → payload bits + expected symbol
//! count → raw bytes
//!
//! The [`container`] module wraps both flows in the on-disk `HUFPIX`
//! framing (header + length-prefixed tree and payload sections).

pub mod bitstream;
pub mod code;
pub mod container;
pub mod frequency;
pub mod payload;
pub mod pqueue;
pub mod tree;


/// Error types for hufpix operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HufError {
    /// No symbol has a nonzero frequency; there is nothing to encode.
    EmptyInput,
    /// A structural bound (node arena slots, 64-bit code width) would
    /// be exceeded.
    CapacityExceeded,
    /// A bit write would exceed the destination buffer's capacity.
    Overflow,
    /// A bit read exhausted its source before the value was complete.
    Truncated,
    /// A symbol has no assigned code in the table being used.
    UnencodableSymbol,
    /// Tree traversal reached a structurally invalid state.
    CorruptTree,
    /// Container framing is violated (bad magic, bad geometry,
    /// inconsistent section lengths).
    InvalidContainer,
    /// The container declares a format version this build does not
    /// understand.
    UnsupportedVersion,
}

impl std::fmt::Display for HufError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input contains no symbols"),
            Self::CapacityExceeded => write!(f, "structural capacity exceeded"),
            Self::Overflow => write!(f, "output buffer overflow"),
            Self::Truncated => write!(f, "input truncated"),
            Self::UnencodableSymbol => write!(f, "symbol has no code"),
            Self::CorruptTree => write!(f, "corrupt prefix tree"),
            Self::InvalidContainer => write!(f, "invalid container"),
            Self::UnsupportedVersion => write!(f, "unsupported container version"),
        }
    }
}

impl std::error::Error for HufError {}

pub type HufResult<T> = Result<T, HufError>;

/// Number of distinct symbols: the full byte range.
pub const ALPHABET_SIZE: usize = 256;

/// Upper bound on nodes in a prefix tree over the byte alphabet.
///
/// A full binary tree with at most 256 leaves has at most 255 internal
/// nodes, so 511 slots cover every legal build. The arena enforces this
/// as a hard capacity so that malformed input fails cleanly instead of
/// growing without bound.
pub const MAX_NODES: usize = 2 * ALPHABET_SIZE - 1;
