//! Terminal front end for the Korotkoff trainer
//!
//! Type a command and press Enter:
//!
//! ```text
//! s  mark systolic      d  mark diastolic
//! r  new round          q  quit
//! ```

use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use korotkoff_trainer_core::audio::{AudioSink, NullSink, SoundSynthesizer};
use korotkoff_trainer_core::gauge::{needle_angle, GAUGE_MAX_MMHG};
use korotkoff_trainer_core::{
    EngineConfig, Event, Phase, RngManager, SimulationEngine, SystemClock, TickResult,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const GAUGE_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "korotkoff-trainer", version, about = "Blood-pressure auscultation trainer")]
struct Args {
    /// Seed for patient draws (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with engine pacing settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without opening an audio device
    #[arg(long)]
    mute: bool,

    /// Let a scripted listener mark the first and last beat, then exit
    #[arg(long)]
    auto: bool,

    /// Append every engine event to this file as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    MarkSystolic,
    MarkDiastolic,
    Restart,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "s" => Some(Command::MarkSystolic),
            "d" => Some(Command::MarkDiastolic),
            "r" => Some(Command::Restart),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    Ok(config)
}

#[cfg(feature = "sound")]
fn open_device() -> Box<dyn AudioSink> {
    use korotkoff_trainer_core::audio::RodioSink;

    match RodioSink::try_default() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!(error = %e, "no audio output, continuing silently");
            Box::new(NullSink)
        }
    }
}

#[cfg(not(feature = "sound"))]
fn open_device() -> Box<dyn AudioSink> {
    warn!("built without sound support");
    Box::new(NullSink)
}

fn build_engine(config: EngineConfig, mute: bool) -> Result<SimulationEngine> {
    let seed = config.rng_seed;
    let sink: Box<dyn AudioSink> = if mute {
        Box::new(NullSink)
    } else {
        open_device()
    };

    SimulationEngine::with_parts(
        config,
        Box::new(SystemClock::new()),
        Box::new(RngManager::new(seed)),
        SoundSynthesizer::new(sink, seed.wrapping_add(1)),
    )
    .context("building engine")
}

/// Read commands from stdin on a separate thread
fn spawn_input(tx: Sender<Command>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            if tx.send(command).is_err() {
                return;
            }
        }
        // EOF
        let _ = tx.send(Command::Quit);
    });
}

/// Marks systolic on the first beat and diastolic once beats stop
#[derive(Debug, Default)]
struct AutoListener {
    last_beat_ms: Option<f64>,
}

impl AutoListener {
    fn reset(&mut self) {
        self.last_beat_ms = None;
    }

    fn observe(&mut self, engine: &mut SimulationEngine, ticks: &[TickResult]) {
        for tick in ticks.iter().filter(|t| t.beat) {
            if self.last_beat_ms.is_none() {
                engine.mark_systolic();
            }
            self.last_beat_ms = Some(tick.at_ms);
        }

        let (Some(last_beat), Some(latest)) = (self.last_beat_ms, ticks.last()) else {
            return;
        };
        let Some(interval) = engine.patient().map(|p| p.beat_interval_ms()) else {
            return;
        };

        // Silence for one and a half beats means the sounds have faded
        if latest.phase == Phase::Deflating
            && engine.player_diastolic().is_none()
            && latest.at_ms - last_beat > 1.5 * interval
        {
            engine.mark_diastolic();
        }
    }
}

fn render_gauge(engine: &SimulationEngine, out: &mut impl Write) -> io::Result<()> {
    let pressure = engine.pressure();
    let filled =
        ((pressure / GAUGE_MAX_MMHG).clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round() as usize;
    let mark = |v: Option<i32>| v.map_or_else(|| "---".to_string(), |v| format!("{:3}", v));

    write!(
        out,
        "\r{:<9} [{}{}] {:6.1} mmHg {:+6.1}°  sys {} dia {} ",
        engine.phase().to_string(),
        "#".repeat(filled),
        " ".repeat(GAUGE_WIDTH - filled),
        pressure,
        needle_angle(pressure),
        mark(engine.player_systolic()),
        mark(engine.player_diastolic()),
    )?;
    out.flush()
}

fn report_round(engine: &SimulationEngine, out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    if let (Some(patient), Some(feedback)) = (engine.patient(), engine.feedback()) {
        writeln!(
            out,
            "Round {}: {} (true {}/{}, you marked {}/{})",
            engine.round(),
            feedback.outcome,
            patient.systolic(),
            patient.diastolic(),
            engine
                .player_systolic()
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
            engine
                .player_diastolic()
                .map_or_else(|| "-".to_string(), |v| v.to_string()),
        )?;
    }
    writeln!(out, "Press r for a new round or q to quit.")
}

/// Stream every event to `path`, one JSON object per line
fn record_events(engine: &mut SimulationEngine, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let target = path.display().to_string();

    engine.subscribe(move |event| {
        let written = serde_json::to_writer(&mut writer, event)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(writer));
        let flushed = match event {
            Event::RoundFinished { .. } => writer.flush(),
            _ => Ok(()),
        };
        if let Err(e) = written.and(flushed) {
            warn!(error = %e, path = %target, "event not recorded");
        }
    });
    info!(path = %path.display(), "recording events");
    Ok(())
}

fn run(
    engine: &mut SimulationEngine,
    commands: &Receiver<Command>,
    auto: bool,
) -> Result<()> {
    let period = Duration::from_secs_f64(engine.config().tick_period_ms / 1000.0);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut listener = AutoListener::default();

    writeln!(out, "s = systolic, d = diastolic, r = new round, q = quit")?;
    engine.start_round();

    let mut reported = false;

    loop {
        let command = match commands.recv_timeout(period) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        // Bring the round up to the clock before acting on input
        let ticks = engine.pump();
        if auto {
            listener.observe(engine, &ticks);
        }

        match command {
            Some(Command::Quit) => break,
            Some(Command::MarkSystolic) => {
                engine.mark_systolic();
            }
            Some(Command::MarkDiastolic) => {
                engine.mark_diastolic();
            }
            Some(Command::Restart) => {
                listener.reset();
                reported = false;
                writeln!(out)?;
                engine.start_round();
            }
            None => {}
        }

        render_gauge(engine, &mut out)?;

        if engine.phase() == Phase::Finished && !reported {
            reported = true;
            report_round(engine, &mut out)?;
            if auto {
                break;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = load_config(&args)?;
    let mut engine = build_engine(config, args.mute)?;
    if let Some(path) = &args.events {
        record_events(&mut engine, path)?;
    }

    let (tx, rx) = unbounded();
    if !args.auto {
        spawn_input(tx.clone());
    }
    run(&mut engine, &rx, args.auto)?;
    drop(tx);
    Ok(())
}
