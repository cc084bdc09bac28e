use crate::{
    addrdec::{AddressTranslation, Decoder},
    cache::{AccessOutcome, Cache},
    config,
    trace::Record,
};
use smallvec::SmallVec;

/// Outcomes of the data accesses performed for one record.
pub type Outcomes = SmallVec<[AccessOutcome; 2]>;

/// Replays memory records against a single cache and counts the outcomes.
#[derive(Debug, Clone)]
pub struct Simulator<T = Decoder> {
    cache: Cache,
    decoder: T,
    stats: stats::Cache,
}

impl Simulator<Decoder> {
    /// Creates a simulator with linear tag / set / offset decoding.
    ///
    /// # Errors
    /// When the cache cannot be allocated.
    pub fn new(config: config::Cache) -> Result<Self, config::Error> {
        let decoder = Decoder::new(&config);
        Self::with_decoder(config, decoder)
    }
}

impl<T> Simulator<T>
where
    T: AddressTranslation,
{
    /// Creates a simulator that maps addresses to sets with `decoder`.
    ///
    /// # Errors
    /// When the cache cannot be allocated.
    pub fn with_decoder(config: config::Cache, decoder: T) -> Result<Self, config::Error> {
        Ok(Self {
            cache: Cache::new(config)?,
            decoder,
            stats: stats::Cache::default(),
        })
    }

    /// Processes a single record.
    ///
    /// Instruction fetches do not access the cache. A modify accesses the
    /// same line twice, a load followed by a store.
    pub fn process(&mut self, record: &Record) -> Outcomes {
        let (tag, set_index) = self.decoder.decode(record.addr);
        record
            .kind
            .accesses()
            .iter()
            .map(|&kind| {
                let outcome = self.cache.access(set_index, tag);
                self.stats.inc(kind, outcome, 1);
                outcome
            })
            .collect()
    }

    /// Processes all `records` in order.
    pub fn run<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) -> &stats::Cache {
        for record in records {
            self.process(record);
        }
        &self.stats
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &stats::Cache {
        &self.stats
    }

    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    #[inline]
    #[must_use]
    pub fn decoder(&self) -> &T {
        &self.decoder
    }

    #[must_use]
    pub fn into_stats(self) -> stats::Cache {
        self.stats
    }
}

/// Replays `records` against a fresh cache with the given geometry.
///
/// # Errors
/// When the cache cannot be allocated.
pub fn simulate<'a>(
    config: config::Cache,
    records: impl IntoIterator<Item = &'a Record>,
) -> Result<stats::Cache, config::Error> {
    let mut sim = Simulator::new(config)?;
    sim.run(records);
    Ok(sim.into_stats())
}
