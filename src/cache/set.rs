use super::{
    block::{Block, Line},
    lru::RecencyList,
    AccessOutcome,
};
use crate::address;
use std::num::NonZeroUsize;

/// One set of `E` lines together with their recency order.
#[derive(Debug, Clone)]
pub struct Set<B = Line> {
    lines: Box<[B]>,
    recency: RecencyList,
}

impl<B> Set<B>
where
    B: Block,
{
    #[must_use]
    pub fn new(ways: NonZeroUsize) -> Self {
        let lines = (0..ways.get()).map(|_| B::default()).collect();
        Self {
            lines,
            recency: RecencyList::new(ways),
        }
    }

    /// Classifies an access to `tag` without changing the set.
    ///
    /// # Returns
    /// The slot the access would use and its outcome:
    /// the matching slot on a hit, the least recently used invalid slot on
    /// a cold miss, or the least recently used slot on an evicting miss.
    #[must_use]
    pub fn probe(&self, tag: address) -> (usize, AccessOutcome) {
        if let Some(slot) = self.lines.iter().position(|line| line.holds(tag)) {
            return (slot, AccessOutcome::Hit);
        }
        if let Some(slot) = self
            .recency
            .iter_lru()
            .find(|&slot| self.lines[slot].is_invalid())
        {
            return (slot, AccessOutcome::ColdMiss);
        }
        (self.recency.tail(), AccessOutcome::Miss)
    }

    /// Accesses `tag`, installing it on a miss and marking its slot as most
    /// recently used.
    pub fn access(&mut self, tag: address) -> (usize, AccessOutcome) {
        let (slot, outcome) = self.probe(tag);
        match outcome {
            AccessOutcome::Hit => {}
            AccessOutcome::ColdMiss | AccessOutcome::Miss => {
                self.lines[slot].allocate(tag);
            }
        }
        self.recency.touch(slot);
        (slot, outcome)
    }

    /// Invalidates all lines. The recency order is kept.
    pub fn invalidate(&mut self) {
        for line in self.lines.iter_mut() {
            line.invalidate();
        }
    }

    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[B] {
        &self.lines
    }

    #[inline]
    #[must_use]
    pub fn recency(&self) -> &RecencyList {
        &self.recency
    }

    #[inline]
    #[must_use]
    pub fn associativity(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn num_valid(&self) -> usize {
        self.lines.iter().filter(|line| line.is_valid()).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.num_valid() == self.associativity()
    }

    /// Tags of all valid lines, in slot order.
    #[must_use]
    pub fn valid_tags(&self) -> Vec<address> {
        self.lines
            .iter()
            .filter(|line| line.is_valid())
            .map(Block::tag)
            .collect()
    }
}
