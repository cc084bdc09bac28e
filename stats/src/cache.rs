use super::mem::AccessKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Classification of a single cache access.
#[derive(
    Debug,
    strum::EnumIter,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum RequestStatus {
    HIT = 0,
    /// miss that filled an invalid line
    COLD_MISS,
    /// miss that evicted a valid line
    MISS,
}

impl RequestStatus {
    #[must_use]
    pub fn is_hit(self) -> bool {
        self == RequestStatus::HIT
    }

    #[must_use]
    pub fn is_miss(self) -> bool {
        matches!(self, RequestStatus::COLD_MISS | RequestStatus::MISS)
    }

    #[must_use]
    pub fn is_eviction(self) -> bool {
        self == RequestStatus::MISS
    }
}

/// Aggregate hit, miss and eviction totals of a replay.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerformanceCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl std::fmt::Display for PerformanceCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

pub type CacheCsvRow = ((AccessKind, RequestStatus), usize);

/// One row of the per access kind breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCount {
    pub kind: AccessKind,
    pub status: RequestStatus,
    pub count: usize,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Cache {
    pub accesses: HashMap<(AccessKind, RequestStatus), usize>,
}

impl Cache {
    #[must_use]
    pub fn flatten(self) -> Vec<CacheCsvRow> {
        let mut flattened: Vec<_> = self.accesses.into_iter().collect();
        flattened.sort_by_key(|(access, _)| *access);
        flattened
    }

    #[must_use]
    pub fn rows(&self) -> Vec<AccessCount> {
        self.clone()
            .flatten()
            .into_iter()
            .map(|((kind, status), count)| AccessCount {
                kind,
                status,
                count,
            })
            .collect()
    }
}

impl std::ops::AddAssign for Cache {
    fn add_assign(&mut self, other: Self) {
        for (k, v) in other.accesses {
            *self.accesses.entry(k).or_insert(0) += v;
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        let mut accesses = HashMap::new();
        for access_kind in AccessKind::iter() {
            for status in RequestStatus::iter() {
                accesses.insert((access_kind, status), 0);
            }
        }
        Self { accesses }
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut accesses: Vec<_> = self
            .accesses
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|((access_kind, status), count)| (format!("{access_kind:?}[{status:?}]"), count))
            .collect();
        accesses.sort_by_key(|(key, _)| key.clone());

        let mut out = f.debug_struct("CacheStats");
        for (key, count) in accesses {
            out.field(&key, count);
        }
        out.finish_non_exhaustive()
    }
}

impl Cache {
    pub fn shave(&mut self) {
        self.accesses.retain(|_, v| *v > 0);
    }

    #[inline]
    pub fn inc(&mut self, kind: impl Into<AccessKind>, status: impl Into<RequestStatus>, count: usize) {
        *self
            .accesses
            .entry((kind.into(), status.into()))
            .or_insert(0) += count;
    }

    fn count_where(&self, pred: impl Fn(RequestStatus) -> bool) -> u64 {
        self.accesses
            .iter()
            .filter(|((_, status), _)| pred(*status))
            .map(|(_, count)| *count as u64)
            .sum()
    }

    #[must_use]
    pub fn total_accesses(&self) -> usize {
        self.accesses.values().sum()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.count_where(RequestStatus::is_hit)
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.count_where(RequestStatus::is_miss)
    }

    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.count_where(RequestStatus::is_eviction)
    }

    #[must_use]
    pub fn counters(&self) -> PerformanceCounters {
        PerformanceCounters {
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
        }
    }
}
