//! Core pipeline pieces: windowing, classification, and the built-in model.

pub mod classifier;
pub mod model;
pub mod window;

// Re-export commonly used types
pub use classifier::{
    ClassificationEvent, Inference, InferenceError, ModelError, ModelOutput, RecurrentState,
    SequenceModel, StreamingClassifier,
};
pub use model::HeuristicModel;
pub use window::{WindowBuffer, WindowGeometryError};
