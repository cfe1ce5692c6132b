use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statecraft_core::{
    prepare_world, run_ai_tick, AiConfig, AiMetrics, JsonlSink, LogSink, NotificationSink,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

mod scenario;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of AI ticks to run
    #[arg(short, long, default_value_t = 10)]
    ticks: u32,

    /// Nations in the generated world
    #[arg(short, long, default_value_t = 24)]
    nations: usize,

    /// World seed; the same seed replays the same run
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Days between ticks
    #[arg(long, default_value_t = 1)]
    days: i32,

    /// JSON file overriding AI tuning constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write notifications as JSON lines to this file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Print final metrics as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(path: &PathBuf) -> Result<AiConfig> {
    let file = File::open(path).with_context(|| format!("cannot open config {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    log::info!("Starting statecraft-sim...");

    let mut state = scenario::generate(args.nations, args.seed)?;
    if let Some(path) = &args.config {
        state.config = load_config(path)?;
    }
    prepare_world(&mut state);
    log::info!(
        "Initial State Date: {} ({} nations)",
        state.date,
        state.nations.len()
    );

    let mut sink: Box<dyn NotificationSink> = match &args.events {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create event log {}", path.display()))?;
            Box::new(JsonlSink::new(BufWriter::new(file)))
        }
        None => Box::new(LogSink),
    };

    let mut metrics = AiMetrics::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ 0x5eed);
    for _ in 0..args.ticks {
        let report = run_ai_tick(&mut state, sink.as_mut());
        metrics.record(&report);
        scenario::advance(&mut state, args.days, &mut rng);
    }
    // Flushes the event log
    drop(sink);

    log::info!("Simulation finished at {}", state.date);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &metrics)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Final date: {}", state.date)?;
        writeln!(out, "Checksum: {:016x}", state.checksum())?;
        writeln!(
            out,
            "Ticks: {} ({:.3} ms/tick)",
            metrics.total_ticks,
            metrics.tick_avg_ms()
        )?;
        writeln!(out, "Rivals chosen: {}", metrics.rivals_chosen)?;
        writeln!(out, "Alliances formed: {}", metrics.alliances_formed)?;
        writeln!(out, "Influence actions: {}", metrics.influence_actions)?;
        writeln!(out, "Research started: {}", metrics.research_started)?;
        writeln!(out, "Decisions taken: {}", metrics.decisions_taken)?;
        writeln!(out, "Focuses assigned: {}", metrics.focuses_assigned)?;
        writeln!(out, "Projects queued: {}", metrics.projects_queued)?;
        writeln!(
            out,
            "Colonies: {} invested, {} started, {} integrated",
            metrics.colonial_investments, metrics.colonies_started, metrics.colonies_integrated
        )?;
        for (name, share) in metrics.breakdown() {
            writeln!(out, "  {:<13}{:>5.1}%", name, share * 100.0)?;
        }
    }
    Ok(())
}
