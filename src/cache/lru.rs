//! Least recently used ordering of the lines of one set.
//!
//! Slots are linked by index into a fixed arena with exactly one node per
//! line. The head is the most recently touched slot and the tail the least
//! recently touched one.

use std::num::NonZeroUsize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    /// Neighbour towards the head (more recently used).
    prev: Option<usize>,
    /// Neighbour towards the tail (less recently used).
    next: Option<usize>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecencyList {
    nodes: Box<[Node]>,
    head: usize,
    tail: usize,
}

impl RecencyList {
    /// Bytes of bookkeeping per slot.
    pub const NODE_SIZE: usize = std::mem::size_of::<Node>();

    /// Creates the initial order: slot `len - 1` at the head down to slot 0
    /// at the tail, so that an empty set is filled starting at slot 0.
    #[must_use]
    pub fn new(len: NonZeroUsize) -> Self {
        let len = len.get();
        let nodes = (0..len)
            .map(|slot| Node {
                prev: Some(slot + 1).filter(|&prev| prev < len),
                next: slot.checked_sub(1),
            })
            .collect();
        Self {
            nodes,
            head: len - 1,
            tail: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The most recently touched slot.
    #[inline]
    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    /// The least recently touched slot.
    #[inline]
    #[must_use]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Marks `slot` as most recently used.
    ///
    /// The relative order of all other slots is unchanged.
    pub fn touch(&mut self, slot: usize) {
        assert!(
            slot < self.len(),
            "slot {slot} out of bounds for {} lines",
            self.len()
        );
        if slot == self.head {
            return;
        }

        // unlink: slot is not the head, so it has a predecessor
        let Node { prev, next } = self.nodes[slot];
        if let Some(prev) = prev {
            self.nodes[prev].next = next;
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => {
                if let Some(prev) = prev {
                    self.tail = prev;
                }
            }
        }

        // link in front of the current head
        self.nodes[self.head].prev = Some(slot);
        self.nodes[slot] = Node {
            prev: None,
            next: Some(self.head),
        };
        self.head = slot;
    }

    /// Slots from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.head), move |&slot| self.nodes[slot].next)
    }

    /// Slots from least to most recently used.
    pub fn iter_lru(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(self.tail), move |&slot| self.nodes[slot].prev)
    }
}

impl std::fmt::Debug for RecencyList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
