use super::{init_logging, reference::ReferenceCache, YI_TRACE};
use crate::{
    cache::AccessOutcome,
    config, report,
    trace::{self, Kind, Record},
    Simulator,
};
use color_eyre::eyre;
use pretty_assertions_sorted as diff;
use stats::PerformanceCounters;

fn replay_verbose(
    config: config::Cache,
    records: &[Record],
) -> eyre::Result<(Vec<String>, stats::Cache)> {
    let mut sim = Simulator::new(config)?;
    let lines = records
        .iter()
        .filter_map(|record| {
            let outcomes = sim.process(record);
            (!outcomes.is_empty()).then(|| report::format_record(record, &outcomes))
        })
        .collect();
    Ok((lines, sim.into_stats()))
}

#[test]
fn test_yi_trace() -> eyre::Result<()> {
    init_logging();
    let records = trace::parse_str(YI_TRACE);
    assert_eq!(records.len(), 7);

    let (lines, stats) = replay_verbose(config::Cache::new(4, 1, 4)?, &records)?;
    diff::assert_eq!(
        lines,
        vec![
            "L 10,1 miss",
            "M 20,1 miss hit",
            "L 22,1 hit",
            "S 18,1 hit",
            "L 110,1 miss eviction",
            "L 210,1 miss eviction",
            "M 12,1 miss eviction hit",
        ]
    );
    assert_eq!(report::format_summary(&stats), "hits:4 misses:5 evictions:3");
    Ok(())
}

#[test]
fn test_yi_trace_from_file() -> eyre::Result<()> {
    init_logging();
    let dir = std::env::temp_dir().join(format!("csim-replay-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let trace_path = dir.join("yi.trace");
    std::fs::write(&trace_path, format!("I 0400d7d4,8\n{YI_TRACE}garbage\n"))?;

    let mut reader = trace::Reader::new(utils::fs::open_readable(&trace_path)?);
    let mut sim = Simulator::new(config::Cache::new(4, 1, 4)?)?;
    for record in reader.by_ref() {
        sim.process(&record?);
    }
    assert_eq!(reader.skipped(), 1);

    let results_path = dir.join(report::RESULTS_FILE);
    report::write_results(&results_path, sim.stats())?;
    assert_eq!(std::fs::read_to_string(&results_path)?, "4 5 3\n");
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_yi_trace_two_way() -> eyre::Result<()> {
    init_logging();
    let records = trace::parse_str(YI_TRACE);
    let (lines, stats) = replay_verbose(config::Cache::new(4, 2, 4)?, &records)?;
    // 0x110 now fits next to 0x10, 0x210 evicts the older of the two
    assert_eq!(lines[4], "L 110,1 miss");
    assert_eq!(lines[5], "L 210,1 miss eviction");
    assert_eq!(lines[6], "M 12,1 miss eviction hit");
    diff::assert_eq!(
        stats.counters(),
        PerformanceCounters {
            hits: 4,
            misses: 5,
            evictions: 2,
        }
    );
    Ok(())
}

#[test]
fn test_matches_reference_model() -> eyre::Result<()> {
    init_logging();
    let kinds = [Kind::Load, Kind::Store, Kind::Modify, Kind::Instruction];
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let records: Vec<Record> = (0..5000)
        .map(|_| {
            // xorshift
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let kind = kinds[(state % 4) as usize];
            Record::new(kind, (state >> 8) % (1 << 14), 4)
        })
        .collect();

    for (s, e, b) in [(0, 1, 4), (0, 16, 4), (3, 1, 5), (4, 2, 4), (2, 4, 6), (5, 8, 3)] {
        let config = config::Cache::new(s, e, b)?;
        let mut sim = Simulator::new(config)?;
        let mut reference = ReferenceCache::new(&config);
        let mut expected = PerformanceCounters::default();
        for record in &records {
            let want = reference.process(record);
            let have = sim.process(record);
            assert_eq!(have.as_slice(), want.as_slice(), "{record} with {config}");
            for outcome in want {
                match outcome {
                    AccessOutcome::Hit => expected.hits += 1,
                    AccessOutcome::ColdMiss => expected.misses += 1,
                    AccessOutcome::Miss => {
                        expected.misses += 1;
                        expected.evictions += 1;
                    }
                }
            }
        }
        diff::assert_eq!(sim.stats().counters(), expected);
    }
    Ok(())
}
