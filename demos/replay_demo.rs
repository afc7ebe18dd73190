//! Demonstration of the gesture pipeline and game loop.
//!
//! This example shows how to:
//! 1. Create a synthetic sample source
//! 2. Build the inference loop around the built-in model
//! 3. Drive the game engine from the classification stream
//!
//! Run with: cargo run --example replay_demo

use gesture_trainer::{
    config::Config,
    core::HeuristicModel,
    game::GameEngine,
    pipeline::InferenceLoop,
    source::{SampleSource, SyntheticSource},
};
use std::sync::atomic::AtomicBool;

fn main() {
    println!("Gesture Trainer - Pipeline Demo");
    println!("===============================");
    println!();

    let config = Config::default();
    println!("Gestures: {}", config.labels.join(", "));
    println!(
        "Windows: {} samples, stride {}, buffer {}",
        config.window_size,
        config.window_offset,
        config.buffer_size()
    );
    println!();

    // two-second archetype segments, four cycles, full speed
    let segment = (config.samples_per_second * 2) as usize;
    let mut source = SyntheticSource::new(config.samples_per_second, segment, 4).unthrottled();

    let model = HeuristicModel::with_labels(config.labels.clone());
    let mut pipeline = InferenceLoop::new(&config, model).expect("invalid configuration");
    let mut engine = GameEngine::new(&config, 7);

    println!("{:<10} [{:^3}]  hits / misses", "target", "t");
    let display = engine.start();
    println!(
        "{:<10} [{:^3}]  {} / {}",
        display.target_text, display.countdown_text, display.success_count, display.timeout_count
    );

    source.start().expect("source failed to start");
    let receiver = source.receiver().clone();
    let stop = AtomicBool::new(false);

    pipeline
        .run(&receiver, &stop, |event| {
            if let Some(update) = engine.tick(event) {
                println!(
                    "{:<10} [{:^3}]  {} / {}",
                    update.target_text,
                    update.countdown_text,
                    update.success_count,
                    update.timeout_count
                );
            }
        })
        .expect("pipeline failed");

    source.stop();
    println!();
    println!(
        "Done: {} windows classified, {} hits, {} misses",
        pipeline.windows_classified(),
        engine.success_count(),
        engine.timeout_count()
    );
}
