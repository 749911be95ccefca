/// Prefix-tree construction and serialization.
///
/// Trees are built greedily from a [`FrequencyTable`]: every nonzero
/// symbol becomes a leaf, and the two lightest subtrees are merged
/// until one root remains. Nodes live in a fixed-capacity arena and
/// refer to each other by index, so a whole tree drops in one free and
/// never needs `Rc` back-edges.
///
/// The wire form is a pre-order walk: `1` plus eight symbol bits for a
/// leaf, `0` followed by both subtrees for an internal node. The format
/// is self-delimiting, so no node count is stored.
use crate::bitstream::{BitReader, BitWriter};
use crate::frequency::FrequencyTable;
use crate::pqueue::MinHeap;
use crate::{HufError, HufResult, ALPHABET_SIZE, MAX_NODES};

// ---------------------------------------------------------------------------
// Node arena
// ---------------------------------------------------------------------------

/// A single tree node, addressed by its arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    /// Subtree weight: the symbol count for leaves, the children's sum
    /// for internal nodes. Zero for deserialized trees.
    pub weight: u64,
    /// Symbol carried by a leaf. Zero (and meaningless) for internal nodes.
    pub symbol: u8,
    /// Arena index of the left child.
    pub left: Option<usize>,
    /// Arena index of the right child.
    pub right: Option<usize>,
}

impl Node {
    /// Returns true if this node carries a symbol.
    ///
    /// The builder only ever creates leaves (no children) or internal
    /// nodes (both children), so checking one side suffices; checking
    /// both keeps half-built nodes from masquerading as leaves.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Fixed-capacity storage for tree nodes.
///
/// A tree over the 256-value byte alphabet has at most 256 leaves and
/// 255 internal nodes, so [`MAX_NODES`] slots always suffice for valid
/// input. Allocation past that fails with `CapacityExceeded` instead of
/// growing, which turns hostile serialized trees into clean errors.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an empty arena with room for [`MAX_NODES`] nodes.
    pub fn new() -> Self {
        NodeArena {
            nodes: Vec::with_capacity(MAX_NODES),
        }
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a leaf carrying `symbol` with the given weight.
    pub fn leaf(&mut self, symbol: u8, weight: u64) -> HufResult<usize> {
        self.alloc(Node {
            weight,
            symbol,
            left: None,
            right: None,
        })
    }

    /// Allocate an internal node joining two existing subtrees.
    pub fn internal(&mut self, weight: u64, left: usize, right: usize) -> HufResult<usize> {
        self.alloc(Node {
            weight,
            symbol: 0,
            left: Some(left),
            right: Some(right),
        })
    }

    /// Borrow the node at `index`.
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    fn alloc(&mut self, node: Node) -> HufResult<usize> {
        if self.nodes.len() >= MAX_NODES {
            return Err(HufError::CapacityExceeded);
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

/// A prefix tree together with the arena that owns its nodes.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    arena: NodeArena,
    root: usize,
}

impl HuffmanTree {
    /// Build a tree from a frequency table.
    ///
    /// Leaves are queued in ascending symbol order, so equal-weight
    /// merges resolve the same way on every run. A table with a single
    /// nonzero symbol yields a tree whose root is that leaf. Fails with
    /// `EmptyInput` when no symbol has a nonzero count and
    /// `CapacityExceeded` when summed weights would overflow a `u64`
    /// (reachable only through forged count fields).
    pub fn from_frequencies(freq: &FrequencyTable) -> HufResult<Self> {
        if freq.total == 0 {
            return Err(HufError::EmptyInput);
        }

        let mut arena = NodeArena::new();
        let mut heap = MinHeap::new();
        for symbol in 0..ALPHABET_SIZE {
            let count = freq.byte[symbol];
            if count > 0 {
                let index = arena.leaf(symbol as u8, count)?;
                heap.push(count, index);
            }
        }

        // Merge the two lightest subtrees until one root remains. The
        // first pop becomes the left child.
        while heap.len() > 1 {
            let (left_weight, left) = match heap.pop() {
                Some(entry) => entry,
                None => return Err(HufError::EmptyInput),
            };
            let (right_weight, right) = match heap.pop() {
                Some(entry) => entry,
                None => return Err(HufError::EmptyInput),
            };
            let weight = left_weight
                .checked_add(right_weight)
                .ok_or(HufError::CapacityExceeded)?;
            let index = arena.internal(weight, left, right)?;
            heap.push(weight, index);
        }

        let root = match heap.pop() {
            Some((_, index)) => index,
            None => return Err(HufError::EmptyInput),
        };
        Ok(HuffmanTree { arena, root })
    }

    /// Arena index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Borrow the node at `index`.
    pub fn node(&self, index: usize) -> &Node {
        self.arena.node(index)
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    // -----------------------------------------------------------------------
    // Wire codec
    // -----------------------------------------------------------------------

    /// Exact size in bytes of this tree's serialized form.
    ///
    /// Every node contributes one marker bit and every leaf adds eight
    /// symbol bits, so for `L` leaves the stream is `(2L - 1) + 8L` bits
    /// rounded up to whole bytes.
    pub fn serialized_len(&self) -> usize {
        let leaves = self
            .arena
            .nodes
            .iter()
            .filter(|node| node.is_leaf())
            .count();
        let bits = (2 * leaves - 1) + 8 * leaves;
        (bits + 7) / 8
    }

    /// Serialize the tree into `out`, returning the bytes written.
    ///
    /// The final partial byte is zero-padded. Fails with `Overflow` if
    /// `out` is smaller than [`HuffmanTree::serialized_len`].
    pub fn serialize(&self, out: &mut [u8]) -> HufResult<usize> {
        let mut writer = BitWriter::new(out);
        self.serialize_node(self.root, &mut writer)?;
        writer.finalize()
    }

    fn serialize_node(&self, index: usize, writer: &mut BitWriter) -> HufResult<()> {
        let node = self.arena.node(index);
        if node.is_leaf() {
            writer.write_bit(true)?;
            writer.write_bits(u64::from(node.symbol), 8)?;
            return Ok(());
        }
        writer.write_bit(false)?;
        if let (Some(left), Some(right)) = (node.left, node.right) {
            self.serialize_node(left, writer)?;
            self.serialize_node(right, writer)?;
            Ok(())
        } else {
            Err(HufError::CorruptTree)
        }
    }

    /// Rebuild a tree from its serialized form.
    ///
    /// Reads one complete tree and ignores any trailing padding bits.
    /// Node weights are not part of the wire form and come back as
    /// zero. Fails with `Truncated` when the data ends mid-tree,
    /// `CorruptTree` when the structure nests deeper than any tree over
    /// the byte alphabet can, and `CapacityExceeded` when it encodes
    /// more nodes than the arena holds.
    pub fn deserialize(data: &[u8]) -> HufResult<Self> {
        let mut arena = NodeArena::new();
        let mut reader = BitReader::new(data);
        let root = Self::deserialize_node(&mut arena, &mut reader, 0)?;
        Ok(HuffmanTree { arena, root })
    }

    fn deserialize_node(
        arena: &mut NodeArena,
        reader: &mut BitReader,
        depth: usize,
    ) -> HufResult<usize> {
        // Valid trees over 256 symbols never nest past depth 255; the
        // check also bounds recursion on hostile all-zero-bit input.
        if depth >= ALPHABET_SIZE {
            return Err(HufError::CorruptTree);
        }

        if reader.read_bit()? {
            let symbol = reader.read_bits(8)? as u8;
            arena.leaf(symbol, 0)
        } else {
            let left = Self::deserialize_node(arena, reader, depth + 1)?;
            let right = Self::deserialize_node(arena, reader, depth + 1)?;
            arena.internal(0, left, right)
        }
    }
}
