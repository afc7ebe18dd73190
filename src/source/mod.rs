//! Sample acquisition for the gesture pipeline.
//!
//! Sources deliver [`SourceEvent`]s over a bounded channel at the configured
//! sampling cadence. The pipeline never talks to hardware directly; anything
//! that can feed the channel can drive it. Two sources ship with the crate:
//! [`ReplaySource`] replays a JSONL recording, [`SyntheticSource`] generates
//! deterministic motion for demos and tests.

pub mod replay;
pub mod synthetic;
pub mod types;

// Re-export commonly used types
pub use replay::ReplaySource;
pub use synthetic::SyntheticSource;
pub use types::{MotionSample, SourceEvent, FEATURE_COUNT};

use crossbeam_channel::Receiver;

/// Common control surface for sample sources.
///
/// A source owns a delivery thread; `start` spawns it, `stop` asks it to wind
/// down. The receiving end of the channel disconnects once the source has
/// nothing more to deliver.
pub trait SampleSource {
    /// Begin delivering events on the source's channel.
    fn start(&mut self) -> Result<(), SourceError>;

    /// Stop delivering events. Safe to call at any point.
    fn stop(&mut self);

    /// The receiving end of the source's event channel.
    fn receiver(&self) -> &Receiver<SourceEvent>;
}

/// Errors that can occur while controlling a sample source.
#[derive(Debug)]
pub enum SourceError {
    AlreadyRunning,
    Exhausted,
    Recording(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyRunning => write!(f, "Source is already running"),
            SourceError::Exhausted => write!(f, "Source has already delivered its stream"),
            SourceError::Recording(e) => write!(f, "Recording error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}
