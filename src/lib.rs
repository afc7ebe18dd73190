//! Gesture Trainer - streaming motion-gesture recognition with a reaction game.
//!
//! This library turns a fixed-rate stream of six-axis motion samples into a
//! continuous stream of gesture classifications, and scores how quickly a
//! player performs a requested gesture.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Gesture Trainer                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────────┐   ┌───────────────────┐    │
//! │  │  Source  │──▶│ WindowBuffer │──▶│StreamingClassifier│    │
//! │  │ (25 Hz)  │   │ (dual track) │   │ (recurrent state) │    │
//! │  └──────────┘   └──────────────┘   └───────────────────┘    │
//! │                                             │               │
//! │                                             ▼               │
//! │                      ┌────────────┐   ┌────────────┐        │
//! │                      │ GameEngine │◀──│  events    │        │
//! │                      │ (rounds)   │   │  (stream)  │        │
//! │                      └────────────┘   └────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The window buffer emits overlapping fixed-size windows at a fixed stride;
//! the classifier threads its recurrent state from each window to the next so
//! the stream stays temporally continuous. The game engine consumes the
//! resulting classification events on the same sample tick that produced
//! them.
//!
//! # Example
//!
//! ```no_run
//! use gesture_trainer::{config::Config, core::HeuristicModel, pipeline::InferenceLoop};
//!
//! let config = Config::default();
//! let model = HeuristicModel::with_labels(config.labels.clone());
//! let pipeline = InferenceLoop::new(&config, model).expect("invalid configuration");
//!
//! // feed samples into `pipeline.push`; events come back per completed window
//! ```

pub mod config;
pub mod core;
pub mod game;
pub mod pipeline;
pub mod source;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    ClassificationEvent, HeuristicModel, InferenceError, RecurrentState, SequenceModel,
    StreamingClassifier, WindowBuffer,
};
pub use game::{GameEngine, GameRound, RoundDisplay, RoundOutcome};
pub use pipeline::InferenceLoop;
pub use source::{MotionSample, ReplaySource, SampleSource, SourceError, SourceEvent, SyntheticSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
