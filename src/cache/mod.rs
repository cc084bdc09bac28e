pub mod block;
pub mod lru;
pub mod set;

pub use block::{Block, Line};
pub use lru::RecencyList;
pub use set::Set;

use crate::{address, config};

/// Classification of a single cache access.
#[derive(Debug, strum::EnumIter, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessOutcome {
    /// A valid line holds the tag.
    Hit,
    /// Miss filled into a line that was still invalid.
    ColdMiss,
    /// Miss that evicted the least recently used valid line.
    Miss,
}

impl AccessOutcome {
    #[must_use]
    pub fn is_hit(self) -> bool {
        self == AccessOutcome::Hit
    }

    #[must_use]
    pub fn is_miss(self) -> bool {
        !self.is_hit()
    }

    #[must_use]
    pub fn is_eviction(self) -> bool {
        self == AccessOutcome::Miss
    }
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessOutcome::Hit => write!(f, "hit"),
            AccessOutcome::ColdMiss => write!(f, "miss"),
            AccessOutcome::Miss => write!(f, "miss eviction"),
        }
    }
}

impl From<AccessOutcome> for stats::cache::RequestStatus {
    fn from(outcome: AccessOutcome) -> Self {
        match outcome {
            AccessOutcome::Hit => Self::HIT,
            AccessOutcome::ColdMiss => Self::COLD_MISS,
            AccessOutcome::Miss => Self::MISS,
        }
    }
}

/// Bytes needed for `num_sets` sets of `associativity` lines.
fn footprint<B>(num_sets: usize, associativity: usize) -> Option<usize> {
    let per_set = associativity
        .checked_mul(std::mem::size_of::<B>() + RecencyList::NODE_SIZE)?
        .checked_add(std::mem::size_of::<Set<B>>())?;
    num_sets.checked_mul(per_set)
}

/// Set-associative cache with least recently used replacement.
#[derive(Debug, Clone)]
pub struct Cache<B = Line> {
    config: config::Cache,
    sets: Box<[Set<B>]>,
}

impl<B> Cache<B>
where
    B: Block,
{
    /// Allocates all sets of `config`.
    ///
    /// # Errors
    /// When the sets do not fit into the address space or cannot be allocated.
    pub fn new(config: config::Cache) -> Result<Self, config::Error> {
        let too_large = || config::Error::TooLarge {
            set_bits: config.set_bits(),
            associativity: config.associativity(),
        };
        let num_sets = config.num_sets();
        footprint::<B>(num_sets, config.associativity())
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(too_large)?;

        let mut sets = Vec::new();
        sets.try_reserve_exact(num_sets).map_err(|_| too_large())?;
        sets.extend((0..num_sets).map(|_| Set::new(config.ways())));
        log::debug!("created cache with {}", config);
        Ok(Self {
            config,
            sets: sets.into_boxed_slice(),
        })
    }

    /// Accesses `tag` in set `set_index`.
    ///
    /// Classification and the recency update happen in one step:
    /// a hit marks the line most recently used, a miss installs the tag
    /// into the least recently used invalid line or, if the set is full,
    /// into the least recently used line.
    pub fn access(&mut self, set_index: u64, tag: address) -> AccessOutcome {
        let set = self.set_mut(set_index);
        let (slot, outcome) = set.access(tag);
        log::trace!(
            "cache::access(set={}, tag={:#x}) => {:?} line[{}]",
            set_index,
            tag,
            outcome,
            slot,
        );
        outcome
    }

    /// Classifies an access without modifying the cache.
    #[must_use]
    pub fn probe(&self, set_index: u64, tag: address) -> AccessOutcome {
        self.set(set_index).probe(tag).1
    }

    /// Invalidates every line in the cache.
    pub fn invalidate(&mut self) {
        for set in self.sets.iter_mut() {
            set.invalidate();
        }
    }

    #[inline]
    #[must_use]
    pub fn set(&self, set_index: u64) -> &Set<B> {
        assert!(
            set_index < self.sets.len() as u64,
            "set index {set_index} out of bounds for {} sets",
            self.sets.len()
        );
        &self.sets[set_index as usize]
    }

    #[inline]
    fn set_mut(&mut self, set_index: u64) -> &mut Set<B> {
        assert!(
            set_index < self.sets.len() as u64,
            "set index {set_index} out of bounds for {} sets",
            self.sets.len()
        );
        &mut self.sets[set_index as usize]
    }

    #[inline]
    #[must_use]
    pub fn sets(&self) -> &[Set<B>] {
        &self.sets
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &config::Cache {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    #[must_use]
    pub fn associativity(&self) -> usize {
        self.config.associativity()
    }

    /// Number of valid lines across all sets.
    #[must_use]
    pub fn num_valid(&self) -> usize {
        self.sets.iter().map(Set::num_valid).sum()
    }
}
