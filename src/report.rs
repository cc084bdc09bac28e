use crate::{cache::AccessOutcome, config, trace::Record};
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// File the summary counters are written to for grading drivers.
pub const RESULTS_FILE: &str = ".csim_results";

/// The summary line printed at the end of a replay.
#[must_use]
pub fn format_summary(stats: &stats::Cache) -> String {
    stats.counters().to_string()
}

/// Writes the counters as `hits misses evictions` to `path`.
///
/// # Errors
/// When the file cannot be created or written.
pub fn write_results(path: impl AsRef<Path>, stats: &stats::Cache) -> std::io::Result<()> {
    let stats::PerformanceCounters {
        hits,
        misses,
        evictions,
    } = stats.counters();
    let mut writer = utils::fs::open_writable(path)?;
    writeln!(writer, "{hits} {misses} {evictions}")?;
    writer.flush()
}

/// Prints the summary line and writes the results file to the working directory.
///
/// # Errors
/// When the results file cannot be written.
pub fn print_summary(stats: &stats::Cache) -> std::io::Result<()> {
    println!("{}", format_summary(stats));
    write_results(RESULTS_FILE, stats)
}

/// Renders a trace record followed by the outcomes of its accesses,
/// for example `M 20,1 miss hit`.
#[must_use]
pub fn format_record(record: &Record, outcomes: &[AccessOutcome]) -> String {
    if outcomes.is_empty() {
        return record.to_string();
    }
    format!("{} {}", record, outcomes.iter().join(" "))
}

/// Same as [`format_record`] with outcomes colored for a terminal.
#[must_use]
pub fn style_record(record: &Record, outcomes: &[AccessOutcome]) -> String {
    let styled = outcomes.iter().map(|outcome| {
        let style = match outcome {
            AccessOutcome::Hit => console::Style::new().green(),
            AccessOutcome::ColdMiss => console::Style::new().yellow(),
            AccessOutcome::Miss => console::Style::new().red(),
        };
        style.apply_to(outcome).to_string()
    });
    std::iter::once(console::style(record).bold().to_string())
        .chain(styled)
        .join(" ")
}

/// Machine readable report of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub config: config::Cache,
    #[serde(flatten)]
    pub counters: stats::PerformanceCounters,
    pub accesses: Vec<stats::cache::AccessCount>,
}

impl Summary {
    #[must_use]
    pub fn new(config: config::Cache, stats: &stats::Cache) -> Self {
        let mut stats = stats.clone();
        stats.shave();
        Self {
            config,
            counters: stats.counters(),
            accesses: stats.rows(),
        }
    }
}

/// Writes `summary` as pretty printed JSON to `path`.
///
/// # Errors
/// When the file cannot be created or the summary cannot be serialized.
pub fn write_json(path: impl AsRef<Path>, summary: &Summary) -> std::io::Result<()> {
    let mut writer = utils::fs::open_writable(path)?;
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut writer,
        serde_json::ser::PrettyFormatter::with_indent(b"    "),
    );
    summary.serialize(&mut serializer)?;
    writer.flush()
}
