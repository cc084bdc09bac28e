//! Timestamp based LRU model used to cross check the cache.

use crate::{addrdec, cache::AccessOutcome, config, trace::Record};

#[derive(Debug)]
pub struct ReferenceCache {
    set_bits: u32,
    block_bits: u32,
    sets: Vec<Vec<Option<(u64, u64)>>>,
    clock: u64,
}

impl ReferenceCache {
    #[must_use]
    pub fn new(config: &config::Cache) -> Self {
        Self {
            set_bits: config.set_bits(),
            block_bits: config.block_bits(),
            sets: vec![vec![None; config.associativity()]; config.num_sets()],
            clock: 0,
        }
    }

    pub fn access(&mut self, addr: u64) -> AccessOutcome {
        let (tag, set_index) = addrdec::decode(addr, self.set_bits, self.block_bits);
        self.clock += 1;
        let clock = self.clock;
        let set = &mut self.sets[set_index as usize];

        if let Some(line) = set
            .iter_mut()
            .flatten()
            .find(|(line_tag, _)| *line_tag == tag)
        {
            line.1 = clock;
            return AccessOutcome::Hit;
        }
        if let Some(empty) = set.iter_mut().find(|line| line.is_none()) {
            *empty = Some((tag, clock));
            return AccessOutcome::ColdMiss;
        }
        let victim = set
            .iter_mut()
            .min_by_key(|line| line.map_or(0, |(_, last_used)| last_used))
            .expect("set has at least one line");
        *victim = Some((tag, clock));
        AccessOutcome::Miss
    }

    pub fn process(&mut self, record: &Record) -> Vec<AccessOutcome> {
        record
            .kind
            .accesses()
            .iter()
            .map(|_| self.access(record.addr))
            .collect()
    }
}
