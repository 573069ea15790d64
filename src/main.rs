use anyhow::Result;
use biosim_lib::app::{App, Overrides};
use biosim_lib::history::HistoryLogger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Run seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of generations to run
    #[arg(short, long)]
    generations: Option<u32>,

    /// Organisms per generation
    #[arg(short, long)]
    population: Option<usize>,

    /// Ticks simulated in every generation
    #[arg(short, long)]
    ticks: Option<u32>,

    /// Directory for the JSON-lines run log (disabled when omitted)
    #[arg(long)]
    log_dir: Option<String>,

    /// Write a world snapshot to the run log every N generations
    #[arg(long)]
    snapshot_every: Option<u32>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    biosim_core::init_logging(&args.log_level);

    let overrides = Overrides {
        seed: args.seed,
        generations: args.generations,
        population: args.population,
        ticks_per_generation: args.ticks,
    };
    let history = match &args.log_dir {
        Some(dir) => HistoryLogger::new_at(dir)?,
        None => HistoryLogger::new_dummy(),
    };

    let mut app = App::from_config_file(&args.config, &overrides, history)?
        .with_snapshots(args.snapshot_every);
    let reports = app.run()?;

    if let Some(last) = reports.last() {
        println!(
            "Finished {} generations: {} of {} survived the last one ({:.1}%), diversity {:.3}",
            reports.len(),
            last.survivors,
            last.population,
            last.survival_rate * 100.0,
            last.diversity
        );
    } else {
        println!("Nothing to run: generation count is zero.");
    }
    Ok(())
}
