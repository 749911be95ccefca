//! A min-heap priority queue.
//!
//! Drives prefix-tree construction: tree nodes are queued by weight and
//! the two lightest are repeatedly merged. Priorities are `u64` to match
//! the frequency counts they order; the builder checks the merge sums
//! itself.

/// An entry in the priority queue.
#[derive(Debug, Clone)]
struct HeapEntry<T> {
    priority: u64,
    data: T,
}

/// A min-heap priority queue that pops the lowest-priority element first.
///
/// Uses 0-indexed storage with parent = (i-1)/2, children = 2i+1, 2i+2.
/// Ties between equal priorities pop in an unspecified but deterministic
/// order for a given push sequence.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    entries: Vec<HeapEntry<T>>,
}

impl<T> MinHeap<T> {
    /// Create a new, empty min-heap.
    pub fn new() -> Self {
        MinHeap {
            entries: Vec::new(),
        }
    }

    /// Returns the number of elements in the heap.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an element onto the heap with the given priority.
    pub fn push(&mut self, priority: u64, data: T) {
        self.entries.push(HeapEntry { priority, data });
        self.sift_up(self.entries.len() - 1);
    }

    /// Pop the minimum-priority element and its priority.
    ///
    /// Returns `None` if the heap is empty.
    pub fn pop(&mut self) -> Option<(u64, T)> {
        if self.entries.is_empty() {
            return None;
        }
        if self.entries.len() == 1 {
            let entry = self.entries.pop()?;
            return Some((entry.priority, entry.data));
        }
        // Swap root with last, remove last, sift down root
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let entry = self.entries.pop()?;
        self.sift_down(0);
        Some((entry.priority, entry.data))
    }

    /// Sift element at `index` up to maintain heap property.
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].priority < self.entries[parent].priority {
                self.entries.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Sift element at `index` down to maintain heap property.
    ///
    /// Compares both children against the current node and descends
    /// toward the smaller one until the heap property holds.
    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.entries[left].priority < self.entries[smallest].priority {
                smallest = left;
            }
            if right < len && self.entries[right].priority < self.entries[smallest].priority {
                smallest = right;
            }

            if smallest == index {
                break;
            }

            self.entries.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
