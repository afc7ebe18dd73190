//! Gesture Trainer CLI
//!
//! Streams motion samples through the classification pipeline, either to
//! watch the label stream or to play the reaction game.

use clap::{Parser, Subcommand};
use crossbeam_channel::bounded;
use gesture_trainer::{
    config::Config,
    core::HeuristicModel,
    game::{GameEngine, RoundDisplay},
    pipeline::InferenceLoop,
    source::{ReplaySource, SampleSource, SyntheticSource},
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Parser)]
#[command(name = "gesture-trainer")]
#[command(version = VERSION)]
#[command(about = "Streaming motion-gesture recognizer with a reaction game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the reaction game against a sample stream
    Play {
        /// JSONL recording to replay (synthetic motion when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Seed for target selection
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Rounds to play before the session ends
        #[arg(long, default_value = "10")]
        rounds: u32,
    },

    /// Classify a sample stream and print each event
    Classify {
        /// JSONL recording to replay (synthetic motion when omitted)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Emit events as JSON lines instead of text
        #[arg(long)]
        json: bool,

        /// Replay as fast as possible instead of at the sampling cadence
        #[arg(long)]
        no_throttle: bool,
    },

    /// Show the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            input,
            seed,
            rounds,
        } => cmd_play(input, seed, rounds),
        Commands::Classify {
            input,
            json,
            no_throttle,
        } => cmd_classify(input, json, no_throttle),
        Commands::Config => cmd_config(),
    }
}

/// Load and validate the configuration, or exit.
fn load_config() -> Config {
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.validate() {
        eprintln!("Error: invalid configuration: {e}");
        std::process::exit(1);
    }
    config
}

/// Build the configured sample source.
fn make_source(input: Option<PathBuf>, config: &Config, throttle: bool) -> Box<dyn SampleSource> {
    match input {
        Some(path) => match ReplaySource::from_path(&path, config.samples_per_second) {
            Ok(source) => {
                if throttle {
                    Box::new(source)
                } else {
                    Box::new(source.unthrottled())
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            // two seconds per archetype segment, looping long enough for a session
            let segment = (config.samples_per_second * 2) as usize;
            let source = SyntheticSource::new(config.samples_per_second, segment, 120);
            Box::new(if throttle { source } else { source.unthrottled() })
        }
    }
}

/// Set up Ctrl+C to raise the stop flag.
fn ctrlc_handler(stop: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}

fn cmd_play(input: Option<PathBuf>, seed: u64, rounds: u32) {
    let config = load_config();

    println!("Gesture Trainer v{VERSION}");
    println!();
    println!("  Gestures: {}", config.labels.join(", "));
    println!(
        "  Windows: {} samples, stride {}, {} Hz",
        config.window_size, config.window_offset, config.samples_per_second
    );
    println!("  Rounds: {rounds}, {}s each", config.round_seconds);
    println!();
    println!("Perform the requested gesture before the countdown ends.");
    println!("Press Ctrl+C to stop");
    println!();

    let mut source = make_source(input, &config, true);
    let model = HeuristicModel::with_labels(config.labels.clone());
    let mut pipeline = match InferenceLoop::new(&config, model) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let mut engine = GameEngine::new(&config, seed);

    let stop = Arc::new(AtomicBool::new(false));
    ctrlc_handler(Arc::clone(&stop));

    if let Err(e) = source.start() {
        eprintln!("Error starting source: {e}");
        std::process::exit(1);
    }

    let (display_tx, display_rx) = bounded::<RoundDisplay>(64);
    let receiver = source.receiver().clone();
    let worker_stop = Arc::clone(&stop);

    let worker = thread::spawn(move || {
        display_tx.send(engine.start()).ok();
        let result = pipeline.run(&receiver, &worker_stop, |event| {
            if let Some(update) = engine.tick(event) {
                display_tx.send(update).ok();
            }
            if engine.rounds_completed() >= rounds {
                worker_stop.store(true, Ordering::SeqCst);
            }
        });
        let final_display = engine.stop();
        display_tx.send(final_display).ok();
        result
    });

    // presentation stays on this thread; the worker only sends strings
    for update in display_rx.iter() {
        println!(
            "  {:<10} [{:^3}]   hits: {:<3} misses: {:<3}",
            update.target_text, update.countdown_text, update.success_count, update.timeout_count
        );
    }

    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("Pipeline error: {e}");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("Worker thread panicked");
            std::process::exit(1);
        }
    }

    source.stop();
    println!();
    println!("Session over.");
}

fn cmd_classify(input: Option<PathBuf>, json: bool, no_throttle: bool) {
    let config = load_config();

    let mut source = make_source(input, &config, !no_throttle);
    let model = HeuristicModel::with_labels(config.labels.clone());
    let mut pipeline = match InferenceLoop::new(&config, model) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    ctrlc_handler(Arc::clone(&stop));

    if let Err(e) = source.start() {
        eprintln!("Error starting source: {e}");
        std::process::exit(1);
    }

    let receiver = source.receiver().clone();
    let result = pipeline.run(&receiver, &stop, |event| {
        let Some(event) = event else { return };
        if json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Error serializing event: {e}"),
            }
        } else {
            println!("{} ({:.1}%)", event.label, event.confidence * 100.0);
        }
    });

    source.stop();

    if let Err(e) = result {
        eprintln!("Pipeline error: {e}");
        std::process::exit(1);
    }

    println!(
        "{} windows classified, {} events dropped",
        pipeline.windows_classified(),
        pipeline.events_dropped()
    );
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
    println!();
    println!("Derived:");
    println!("  Number of windows: {}", config.number_of_windows());
    println!("  Buffer size: {} samples", config.buffer_size());
    println!(
        "  Sample interval: {:.1} ms",
        config.sample_interval().as_secs_f64() * 1000.0
    );
}
