//! Stateful sequence classification over sample windows.
//!
//! The trained model sits behind the [`SequenceModel`] trait and is swappable
//! without touching the buffer or the game. [`StreamingClassifier`] wraps it
//! with shape checking; the recurrent state is an explicit value threaded by
//! the caller, never a hidden field.

use crate::source::types::MotionSample;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Opaque carry-over produced by one model evaluation and consumed by the next.
///
/// Each evaluation returns a fresh replacement; nothing mutates a state in
/// place. The very first evaluation of a session runs without one.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrentState {
    hidden: Vec<f64>,
    cell: Vec<f64>,
}

impl RecurrentState {
    pub fn new(hidden: Vec<f64>, cell: Vec<f64>) -> Self {
        Self { hidden, cell }
    }

    pub fn hidden(&self) -> &[f64] {
        &self.hidden
    }

    pub fn cell(&self) -> &[f64] {
        &self.cell
    }
}

/// Raw output of one model evaluation.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    pub label: String,
    pub probabilities: HashMap<String, f64>,
    pub state: RecurrentState,
}

/// A model failed to evaluate a well-formed window.
///
/// Always recoverable at the loop level: the event is dropped and the
/// previous state retained.
#[derive(Debug)]
pub enum ModelError {
    Evaluation(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Evaluation(e) => write!(f, "Model evaluation failed: {e}"),
        }
    }
}

impl std::error::Error for ModelError {}

/// The seam to the trained sequence model.
///
/// `evaluate` must be deterministic in `(window, prior)`. The recurrence is
/// continuous in invocation count, not wall-clock time: the caller passes the
/// state returned by the immediately preceding call, or `None` for the first
/// window of a session.
pub trait SequenceModel: Send {
    /// The label vocabulary, in the model's output order.
    fn labels(&self) -> &[String];

    /// Classify one window given the prior recurrent state.
    fn evaluate(
        &self,
        window: &[MotionSample],
        prior: Option<&RecurrentState>,
    ) -> Result<ModelOutput, ModelError>;
}

/// One classification delivered downstream.
///
/// Immediately superseded by the next event; consumers keep only the latest.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationEvent {
    pub label: String,
    /// Probability assigned to `label`
    pub confidence: f64,
    pub probabilities: HashMap<String, f64>,
    pub at: DateTime<Utc>,
}

/// Classifier output before the loop strips off the recurrent state.
#[derive(Debug, Clone)]
pub struct Inference {
    pub event: ClassificationEvent,
    pub state: RecurrentState,
}

/// Errors from one classification attempt.
#[derive(Debug)]
pub enum InferenceError {
    /// The window does not have the classifier's shape. This is a wiring bug
    /// between buffer and classifier, never a runtime condition.
    WindowShape { expected: usize, actual: usize },
    /// The model failed on a well-formed window.
    Evaluation(String),
}

impl InferenceError {
    /// Fatal errors indicate a broken contract; recoverable ones a transient
    /// model failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, InferenceError::WindowShape { .. })
    }
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceError::WindowShape { expected, actual } => write!(
                f,
                "Window shape contract violated: expected {expected} samples, got {actual}"
            ),
            InferenceError::Evaluation(e) => write!(f, "Evaluation failed: {e}"),
        }
    }
}

impl std::error::Error for InferenceError {}

/// Shape-checking wrapper around a [`SequenceModel`].
pub struct StreamingClassifier<M> {
    model: M,
    window_size: usize,
}

impl<M: SequenceModel> StreamingClassifier<M> {
    pub fn new(model: M, window_size: usize) -> Self {
        Self { model, window_size }
    }

    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Classify one window against the prior recurrent state.
    pub fn infer(
        &self,
        window: &[MotionSample],
        prior: Option<&RecurrentState>,
    ) -> Result<Inference, InferenceError> {
        if window.len() != self.window_size {
            return Err(InferenceError::WindowShape {
                expected: self.window_size,
                actual: window.len(),
            });
        }
        let output = self
            .model
            .evaluate(window, prior)
            .map_err(|ModelError::Evaluation(e)| InferenceError::Evaluation(e))?;
        let confidence = output
            .probabilities
            .get(&output.label)
            .copied()
            .unwrap_or(0.0);
        Ok(Inference {
            event: ClassificationEvent {
                label: output.label,
                confidence,
                probabilities: output.probabilities,
                at: Utc::now(),
            },
            state: output.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Labels every window with the number of prior evaluations it saw.
    struct CountingModel {
        labels: Vec<String>,
    }

    impl CountingModel {
        fn new() -> Self {
            Self {
                labels: vec!["zero".to_string(), "some".to_string()],
            }
        }
    }

    impl SequenceModel for CountingModel {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn evaluate(
            &self,
            _window: &[MotionSample],
            prior: Option<&RecurrentState>,
        ) -> Result<ModelOutput, ModelError> {
            let count = prior.map(|s| s.hidden()[0] + 1.0).unwrap_or(0.0);
            let label = if count == 0.0 { "zero" } else { "some" };
            Ok(ModelOutput {
                label: label.to_string(),
                probabilities: HashMap::from([(label.to_string(), 1.0)]),
                state: RecurrentState::new(vec![count], vec![]),
            })
        }
    }

    fn window(len: usize) -> Vec<MotionSample> {
        vec![MotionSample::new([0.0; 3], [0.0; 3]); len]
    }

    #[test]
    fn test_wrong_shape_is_fatal() {
        let classifier = StreamingClassifier::new(CountingModel::new(), 20);
        let err = classifier.infer(&window(19), None).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            InferenceError::WindowShape {
                expected: 20,
                actual: 19
            }
        ));
    }

    #[test]
    fn test_state_threads_through_inference() {
        let classifier = StreamingClassifier::new(CountingModel::new(), 4);
        let first = classifier.infer(&window(4), None).unwrap();
        assert_eq!(first.event.label, "zero");
        assert_eq!(first.event.confidence, 1.0);

        let second = classifier.infer(&window(4), Some(&first.state)).unwrap();
        assert_eq!(second.event.label, "some");
        assert_eq!(second.state.hidden(), &[1.0]);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let classifier = StreamingClassifier::new(CountingModel::new(), 4);
        let prior = RecurrentState::new(vec![3.0], vec![]);
        let a = classifier.infer(&window(4), Some(&prior)).unwrap();
        let b = classifier.infer(&window(4), Some(&prior)).unwrap();
        assert_eq!(a.event.label, b.event.label);
        assert_eq!(a.state, b.state);
    }
}
