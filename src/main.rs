use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
    about = "replay a valgrind memory trace against a set-associative LRU cache",
)]
pub struct Options {
    #[clap(short = 's', value_name = "NUM", help = "number of set index bits (2^s sets)")]
    pub set_bits: u32,
    #[clap(short = 'E', value_name = "NUM", help = "number of lines per set")]
    pub associativity: usize,
    #[clap(short = 'b', value_name = "NUM", help = "number of block offset bits (2^b bytes per block)")]
    pub block_bits: u32,
    #[clap(short = 't', value_name = "FILE", help = "valgrind trace to replay")]
    pub trace_file: PathBuf,
    #[clap(short = 'v', long = "verbose", help = "print the outcome of every trace record")]
    pub verbose: bool,
    #[clap(long = "json", value_name = "PATH", help = "write a JSON summary to PATH")]
    pub json: Option<PathBuf>,
    #[clap(long = "no-results-file", help = "do not write the .csim_results file")]
    pub no_results_file: bool,
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let options = Options::parse();
    let config = csim::config::Cache::new(
        options.set_bits,
        options.associativity,
        options.block_bits,
    )
    .wrap_err("invalid cache configuration")?;
    log::info!("simulating {}", config);

    let reader = utils::fs::open_readable(&options.trace_file)
        .map_err(eyre::Report::from)
        .wrap_err_with(|| format!("failed to open trace {}", options.trace_file.display()))?;
    let mut records = csim::trace::Reader::new(reader);

    let colored = console::colors_enabled();
    let mut sim = csim::Simulator::new(config).wrap_err("failed to allocate cache")?;
    for record in records.by_ref() {
        let record = record
            .wrap_err_with(|| format!("failed to read trace {}", options.trace_file.display()))?;
        let outcomes = sim.process(&record);
        if options.verbose && !outcomes.is_empty() {
            if colored {
                println!("{}", csim::report::style_record(&record, &outcomes));
            } else {
                println!("{}", csim::report::format_record(&record, &outcomes));
            }
        }
    }
    if records.skipped() > 0 {
        log::warn!(
            "skipped {} malformed lines in {}",
            records.skipped(),
            options.trace_file.display()
        );
    }

    let stats = sim.into_stats();
    log::debug!("{:#?}", &stats);

    if options.no_results_file {
        println!("{}", csim::report::format_summary(&stats));
    } else {
        csim::report::print_summary(&stats)
            .wrap_err_with(|| format!("failed to write {}", csim::report::RESULTS_FILE))?;
    }
    if let Some(json_path) = &options.json {
        let summary = csim::report::Summary::new(config, &stats);
        csim::report::write_json(json_path, &summary)
            .wrap_err_with(|| format!("failed to write {}", json_path.display()))?;
        log::info!("written {}", json_path.display());
    }
    Ok(())
}
