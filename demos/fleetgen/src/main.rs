//! fleetgen — generate a synthetic fleet telemetry data set.
//!
//! Loads an optional JSON generator config, runs a fleet of vehicle
//! sessions in lock-step, and writes `events.csv` / `sessions.csv` to the
//! output directory.  Set `RUST_LOG=debug` for per-session lifecycle logs.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use ft_core::{SimConfig, VehicleId};
use ft_models::{stats, Channel, GeneratorConfig};
use ft_output::writer::OutputWriter;
use ft_output::{CsvWriter, SinkWriter};
use ft_sim::{EventRecord, EventSink, FleetBuilder, SessionSummary};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "fleetgen", version)]
#[command(about = "Synthetic fleet telemetry generator")]
struct Args {
    /// JSON generator config; every section is optional
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of vehicles in the fleet
    #[arg(long, default_value_t = 8)]
    vehicles: usize,

    /// Upper bound on ticks per vehicle
    #[arg(long, default_value_t = 480)]
    max_ticks: u64,

    /// Master seed; overrides the config file's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = "output/fleetgen")]
    out: PathBuf,

    /// Seconds per tick
    #[arg(long, default_value_t = 60)]
    tick_secs: u32,

    /// Keep driving after the delivery is reached, until --max-ticks
    #[arg(long)]
    ignore_delivery: bool,

    /// Worker threads; all logical cores when omitted
    #[arg(long)]
    threads: Option<usize>,

    /// Print the effective generator config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

// ── Sink wrapper that keeps run statistics ────────────────────────────────────

struct StatsSink<W: OutputWriter> {
    inner:     SinkWriter<W>,
    speeds:    Vec<f64>,
    /// Engine temperature series per vehicle.
    temps:     BTreeMap<VehicleId, Vec<f64>>,
    summaries: Vec<SessionSummary>,
}

impl<W: OutputWriter> StatsSink<W> {
    fn new(inner: SinkWriter<W>) -> Self {
        Self { inner, speeds: Vec::new(), temps: BTreeMap::new(), summaries: Vec::new() }
    }

    /// Mean lag-1 autocorrelation over vehicles with enough samples.
    fn temperature_lag1(&self) -> f64 {
        let per_vehicle: Vec<f64> = self
            .temps
            .values()
            .filter(|series| series.len() > 10)
            .map(|series| stats::autocorrelation(series, 1))
            .filter(|r| r.is_finite())
            .collect();
        stats::mean(&per_vehicle)
    }
}

impl<W: OutputWriter> EventSink for StatsSink<W> {
    fn on_record(&mut self, record: EventRecord) {
        self.speeds.push(record.speed_kmh);
        if let Some(t) = record.telemetry.get(&Channel::EngineTemp) {
            self.temps.entry(record.vehicle_id).or_default().push(*t);
        }
        self.inner.on_record(record);
    }

    fn on_session_end(&mut self, summary: &SessionSummary) {
        self.summaries.push(summary.clone());
        self.inner.on_session_end(summary);
    }

    fn on_run_end(&mut self) {
        self.inner.on_run_end();
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Generator config.
    let mut gen_config = match &args.config {
        Some(path) => GeneratorConfig::from_json_path(path)
            .with_context(|| format!("loading generator config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed {
        gen_config.seed = seed;
    }
    if args.print_config {
        println!("{}", gen_config.to_json_pretty()?);
        return Ok(());
    }
    let models = gen_config.build().context("validating generator config")?.into_shared();

    // 2. Run config.
    let config = SimConfig {
        tick_duration_secs: args.tick_secs,
        max_ticks:          args.max_ticks,
        seed:               gen_config.seed,
        num_threads:        args.threads,
        stop_on_delivery:   !args.ignore_delivery,
        ..SimConfig::default()
    };

    println!("=== fleetgen — synthetic fleet telemetry ===");
    println!(
        "Vehicles: {}  |  Max ticks: {} × {} s  |  Seed: {}",
        args.vehicles, config.max_ticks, config.tick_duration_secs, config.seed
    );
    println!();

    // 3. Fleet.
    let mut fleet = FleetBuilder::new(config, models)
        .vehicles(args.vehicles)
        .build()?;

    // 4. Output.
    let writer = CsvWriter::new(&args.out)
        .with_context(|| format!("creating output in {}", args.out.display()))?;
    let mut sink = StatsSink::new(SinkWriter::new(writer));

    // 5. Run.
    let t0 = Instant::now();
    let report = fleet.run(&mut sink)?;
    let elapsed = t0.elapsed();

    if let Some(e) = sink.inner.take_error() {
        return Err(e).context("writing output");
    }

    // 6. Summary.
    println!("Generation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  events.csv   : {} rows", report.records);
    println!("  sessions.csv : {} rows", report.sessions);
    println!("  fleet ticks  : {}", report.ticks);
    println!("  delivered    : {}/{}", report.delivered, report.sessions);
    println!("  incidents    : {}", report.incidents);
    println!("  mean speed   : {:.1} km/h", stats::mean(&sink.speeds));
    println!("  temp lag-1 ρ : {:.3}", sink.temperature_lag1());
    if report.corrections.total() > 0 {
        println!(
            "  corrections  : {} speed clamps, {} λ floors",
            report.corrections.speed_clamped, report.corrections.lambda_floored
        );
    }
    println!();

    println!(
        "{:<10} {:<10} {:>6} {:>10} {:>9} {:>9}",
        "Vehicle", "Driver", "Ticks", "Km", "Incidents", "Fuel %"
    );
    println!("{}", "-".repeat(59));
    for s in &sink.summaries {
        println!(
            "{:<10} {:<10} {:>6} {:>10.2} {:>9} {:>9.2}",
            s.vehicle_id.label(),
            s.driver_id.label(),
            s.ticks,
            s.odometer_km,
            s.incidents,
            s.fuel_used_pct,
        );
    }

    Ok(())
}
