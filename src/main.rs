use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::time::Duration;

use signal_sim::simulation::{SimConfig, SimulationEngine};
use signal_sim::terminal;

#[derive(Parser)]
#[command(name = "signal_sim")]
#[command(about = "Adaptive signalized intersection simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "3000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.0333")]
    delta: f32,

    /// Seed for reproducible vehicle arrivals
    #[arg(long)]
    seed: Option<u64>,

    /// Minimum green duration in seconds
    #[arg(long)]
    min_green: Option<f32>,

    /// Maximum green duration in seconds
    #[arg(long)]
    max_green: Option<f32>,

    /// Green duration with an empty queue
    #[arg(long)]
    base_green: Option<f32>,

    /// Seconds of green added per queued vehicle
    #[arg(long)]
    per_car: Option<f32>,

    /// Seconds without a passing vehicle before gapping out
    #[arg(long)]
    gap_threshold: Option<f32>,

    /// Chance of a vehicle arriving at each spawn attempt
    #[arg(long)]
    spawn_probability: Option<f64>,

    /// Force a phase advance every N ticks, as an operator would
    #[arg(long)]
    advance_every: Option<u32>,

    /// Stop after this many seconds of wall-clock time
    #[arg(long)]
    wall_limit_secs: Option<f64>,

    /// Milliseconds to pause after each printed report
    #[arg(long, default_value = "0")]
    pace_ms: u64,

    /// Skip the per-second summary and map
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> SimConfig {
        let mut config = SimConfig::default();
        if let Some(value) = self.min_green {
            config.min_green = value;
        }
        if let Some(value) = self.max_green {
            config.max_green = value;
        }
        if let Some(value) = self.base_green {
            config.base_green = value;
        }
        if let Some(value) = self.per_car {
            config.per_car_additional = value;
        }
        if let Some(value) = self.gap_threshold {
            config.gap_threshold = value;
        }
        if let Some(value) = self.spawn_probability {
            config.spawn_probability = value;
        }
        config
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run_headless(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    let config = cli.config();
    let mut engine = match cli.seed {
        Some(seed) => SimulationEngine::with_seed(config, seed)?,
        None => SimulationEngine::new(config)?,
    };

    info!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    if let Some(limit) = cli.wall_limit_secs {
        let stop = engine.stop_handle();
        let limit = Duration::try_from_secs_f64(limit)
            .with_context(|| format!("Invalid wall-clock limit {} seconds", limit))?;
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            stop.stop();
        });
    }

    // Report once per simulated second
    let ticks_per_second = (1.0 / cli.delta.max(f32::EPSILON)).ceil() as u32;

    if !cli.quiet {
        println!("Initial state:");
        let snapshot = engine.snapshot();
        terminal::print_summary(&snapshot);
        terminal::draw_map(&snapshot, &engine.config().geometry);
    }

    let mut tick = 0;
    while tick < cli.ticks && !engine.is_stopped() {
        tick += 1;
        engine.tick(cli.delta)?;

        if let Some(every) = cli.advance_every {
            if every > 0 && tick % every == 0 {
                engine.request_manual_advance();
            }
        }

        if !cli.quiet && tick % ticks_per_second.max(1) == 0 {
            println!("--- After tick {} ({:.1}s simulated time) ---", tick, engine.time());
            let snapshot = engine.snapshot();
            terminal::print_summary(&snapshot);
            terminal::draw_map(&snapshot, &engine.config().geometry);

            if cli.pace_ms > 0 {
                std::thread::sleep(Duration::from_millis(cli.pace_ms));
            }
        }
    }

    if !cli.quiet {
        println!("=== Final State ===");
        terminal::print_summary(&engine.snapshot());
    }

    engine.stats().log_report(engine.vehicle_count());
    Ok(())
}
