/// Code table generation.
///
/// Walks a prefix tree depth-first and records, for every leaf symbol,
/// the path taken to reach it: left edges append a `0` bit, right edges
/// append a `1`. Encoding then becomes a table lookup per symbol
/// instead of a tree walk.
use crate::tree::HuffmanTree;
use crate::{HufError, HufResult, ALPHABET_SIZE};

/// One symbol's prefix code.
///
/// The path bits sit in the low `len` bits of `bits` with the first
/// edge from the root in the most significant position, matching the
/// field order of [`crate::bitstream::BitWriter::write_bits`]. A zero
/// `len` marks a symbol with no code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    /// Path bits, first edge highest.
    pub bits: u64,
    /// Code length in bits (0 = unassigned, max 64).
    pub len: u8,
}

/// Per-symbol prefix codes for the full byte alphabet.
#[derive(Debug, Clone)]
pub struct CodeTable {
    codes: [Code; ALPHABET_SIZE],
}

impl CodeTable {
    /// Derive the code table for every leaf of `tree`.
    ///
    /// A tree whose root is itself a leaf would produce an empty code,
    /// so that single symbol is assigned the one-bit code `0` instead.
    /// Fails with `CapacityExceeded` if any path outgrows the 64-bit
    /// code field, and `CorruptTree` if an internal node is missing a
    /// child.
    pub fn from_tree(tree: &HuffmanTree) -> HufResult<Self> {
        let mut codes = [Code::default(); ALPHABET_SIZE];
        Self::walk(tree, tree.root(), 0, 0, &mut codes)?;
        Ok(CodeTable { codes })
    }

    fn walk(
        tree: &HuffmanTree,
        index: usize,
        bits: u64,
        len: u8,
        codes: &mut [Code; ALPHABET_SIZE],
    ) -> HufResult<()> {
        let node = tree.node(index);
        if node.is_leaf() {
            // A lone root leaf has an empty path; force one bit so the
            // symbol still occupies space in the payload.
            let code = if len == 0 {
                Code { bits: 0, len: 1 }
            } else {
                Code { bits, len }
            };
            codes[node.symbol as usize] = code;
            return Ok(());
        }

        if len >= 64 {
            return Err(HufError::CapacityExceeded);
        }
        match (node.left, node.right) {
            (Some(left), Some(right)) => {
                Self::walk(tree, left, bits << 1, len + 1, codes)?;
                Self::walk(tree, right, (bits << 1) | 1, len + 1, codes)
            }
            _ => Err(HufError::CorruptTree),
        }
    }

    /// The code assigned to `symbol`, with `len == 0` when none is.
    pub fn code(&self, symbol: u8) -> Code {
        self.codes[symbol as usize]
    }

    /// Number of symbols that received a code.
    pub fn assigned(&self) -> usize {
        self.codes.iter().filter(|code| code.len > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{get_frequency, FrequencyTable};

    fn table_for(input: &[u8]) -> CodeTable {
        let tree = HuffmanTree::from_frequencies(&get_frequency(input)).unwrap();
        CodeTable::from_tree(&tree).unwrap()
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let table = table_for(&[9u8; 42]);
        assert_eq!(table.code(9), Code { bits: 0, len: 1 });
        assert_eq!(table.assigned(), 1);
    }

    #[test]
    fn test_two_symbols_get_one_bit_each() {
        let table = table_for(b"aab");
        // The lighter leaf lands on the left (0) branch.
        assert_eq!(table.code(b'b'), Code { bits: 0b0, len: 1 });
        assert_eq!(table.code(b'a'), Code { bits: 0b1, len: 1 });
    }

    #[test]
    fn test_three_symbols_known_lengths() {
        let table = table_for(b"aaabbc");
        assert_eq!(table.code(b'a').len, 1);
        assert_eq!(table.code(b'b').len, 2);
        assert_eq!(table.code(b'c').len, 2);
        // Deterministic build: b and c share the subtree opposite a.
        assert_eq!(table.code(b'a'), Code { bits: 0b0, len: 1 });
        assert_eq!(table.code(b'c'), Code { bits: 0b10, len: 2 });
        assert_eq!(table.code(b'b'), Code { bits: 0b11, len: 2 });
    }

    #[test]
    fn test_textbook_three_symbol_example() {
        // freq {A:1, B:2, C:3}: C sits alone under the root, A and B
        // share the deeper subtree.
        let mut input = vec![b'A'];
        input.extend([b'B'; 2]);
        input.extend([b'C'; 3]);
        let table = table_for(&input);
        assert_eq!(table.code(b'C'), Code { bits: 0b0, len: 1 });
        assert_eq!(table.code(b'A'), Code { bits: 0b10, len: 2 });
        assert_eq!(table.code(b'B'), Code { bits: 0b11, len: 2 });
    }

    #[test]
    fn test_unused_symbols_have_no_code() {
        let table = table_for(b"aaabbc");
        assert_eq!(table.assigned(), 3);
        assert_eq!(table.code(b'z').len, 0);
        assert_eq!(table.code(0).len, 0);
    }

    #[test]
    fn test_rarer_symbols_get_longer_codes() {
        let mut input = Vec::new();
        input.extend(std::iter::repeat(b'x').take(100));
        input.extend(std::iter::repeat(b'y').take(10));
        input.push(b'z');
        let table = table_for(&input);
        assert!(table.code(b'x').len <= table.code(b'y').len);
        assert!(table.code(b'y').len <= table.code(b'z').len);
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let table = table_for(b"the quick brown fox jumps over the lazy dog");
        let assigned: Vec<Code> = (0..=255u8)
            .map(|s| table.code(s))
            .filter(|c| c.len > 0)
            .collect();
        for (i, a) in assigned.iter().enumerate() {
            for (j, b) in assigned.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (short, long) = if a.len <= b.len { (a, b) } else { (b, a) };
                let prefix = long.bits >> (long.len - short.len);
                assert!(
                    prefix != short.bits || a.len == b.len,
                    "code {:?} prefixes {:?}",
                    short,
                    long
                );
            }
        }
    }

    #[test]
    fn test_kraft_equality_holds() {
        // A full binary tree's code lengths satisfy sum(2^-len) == 1.
        let table = table_for(b"kraft chain inequality becomes equality here");
        let sum: u128 = (0..=255u8)
            .map(|s| table.code(s))
            .filter(|c| c.len > 0)
            .map(|c| 1u128 << (64 - u32::from(c.len)))
            .sum();
        assert_eq!(sum, 1u128 << 64);
    }

    #[test]
    fn test_full_alphabet_uniform_is_eight_bits() {
        let input: Vec<u8> = (0..=255u8).collect();
        let table = table_for(&input);
        assert_eq!(table.assigned(), 256);
        for s in 0..=255u8 {
            assert_eq!(table.code(s).len, 8);
        }
    }

    #[test]
    fn test_code_deeper_than_sixty_four_bits_rejected() {
        // Fibonacci counts skew the tree into a vine; 66 symbols push
        // the deepest path past the 64-bit code field.
        let mut freq = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..66 {
            freq.byte[symbol] = a;
            freq.total += a;
            freq.used += 1;
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffmanTree::from_frequencies(&freq).unwrap();
        assert!(matches!(
            CodeTable::from_tree(&tree),
            Err(HufError::CapacityExceeded)
        ));
    }

    #[test]
    fn test_code_depth_exactly_sixty_four_accepted() {
        let mut freq = FrequencyTable::new();
        let (mut a, mut b) = (1u64, 1u64);
        for symbol in 0..65 {
            freq.byte[symbol] = a;
            freq.total += a;
            freq.used += 1;
            let next = a + b;
            a = b;
            b = next;
        }
        let tree = HuffmanTree::from_frequencies(&freq).unwrap();
        let table = CodeTable::from_tree(&tree).unwrap();
        let max = (0..=255u8).map(|s| table.code(s).len).max().unwrap();
        assert_eq!(max, 64);
    }
}
