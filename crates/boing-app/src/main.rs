use anyhow::{Context, Result};
use boing_app::{LogSink, OscSink, RunOptions, load_config, render_frame, run};
use boing_core::{BirthOutcome, NoteSink, NullSink, Stage};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// Send notes as OSC messages over UDP.
    Osc,
    /// Log notes through tracing.
    Log,
    /// Drop notes.
    Null,
}

#[derive(Parser, Debug)]
#[command(
    name = "boing",
    version,
    about = "Automated music generator: cells bouncing on a lattice play notes"
)]
struct Cli {
    /// JSON stage configuration; the built-in two-instrument stage when omitted.
    #[arg(long, env = "BOING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured RNG seed.
    #[arg(long, env = "BOING_SEED")]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(long, env = "BOING_TICKS")]
    ticks: Option<u64>,

    /// Where emitted notes go.
    #[arg(long, value_enum, env = "BOING_SINK", default_value_t = SinkKind::Osc)]
    sink: SinkKind,

    /// Host of the OSC listener.
    #[arg(long, env = "BOING_OSC_HOST", default_value = boing_app::osc::DEFAULT_OSC_HOST)]
    osc_host: String,

    /// Port of the OSC listener.
    #[arg(long, env = "BOING_OSC_PORT", default_value_t = boing_app::osc::DEFAULT_OSC_PORT)]
    osc_port: u16,

    /// Step as fast as possible instead of following the tempo.
    #[arg(long, env = "BOING_UNPACED")]
    unpaced: bool,

    /// Print a text frame of the lattice after every tick.
    #[arg(long)]
    frames: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    if cli.dump_config {
        let json = serde_json::to_string_pretty(&config).context("failed to encode config")?;
        println!("{json}");
        return Ok(());
    }

    let sink = build_sink(&cli)?;
    let options = if cli.unpaced {
        RunOptions::unpaced(cli.ticks)
    } else {
        RunOptions::paced(config.tick_interval_ms(), cli.ticks)
    };
    let mut stage = Stage::with_sink(config, sink).context("failed to build stage")?;
    info!(
        size = stage.size(),
        seed = stage.seed(),
        populations = stage.populations().len(),
        "Starting performance"
    );

    let frames = cli.frames;
    let mut births = 0usize;
    let mut notes = 0usize;
    let performed = run(&mut stage, options, |stage, tick| {
        births += tick
            .reports
            .iter()
            .filter(|(_, report)| matches!(report.birth, BirthOutcome::Placed { .. }))
            .count();
        notes += tick.batches.iter().map(|batch| batch.pitches.len()).sum::<usize>();
        if frames {
            print!("{}", render_frame(&stage.snapshot()));
        }
        Ok(())
    })?;

    info!(ticks = performed, births, notes, "Performance finished");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn build_sink(cli: &Cli) -> Result<Box<dyn NoteSink>> {
    Ok(match cli.sink {
        SinkKind::Osc => {
            let sink = OscSink::connect(&cli.osc_host, cli.osc_port).with_context(|| {
                format!("failed to open OSC socket to {}:{}", cli.osc_host, cli.osc_port)
            })?;
            info!(address = %sink.target(), "Sending notes over OSC");
            Box::new(sink)
        }
        SinkKind::Log => Box::new(LogSink::default()),
        SinkKind::Null => Box::new(NullSink),
    })
}
