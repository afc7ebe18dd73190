//! The inference loop: samples in, ordered classification events out.
//!
//! Exactly one classifier invocation per ready window, in the order windows
//! complete, with the recurrent state from invocation N handed to invocation
//! N+1. The loop is the sole owner of the buffer and the carried state; a
//! failed model evaluation drops that event, keeps the previous state, and
//! leaves the stream otherwise untouched.

use crate::config::{Config, ConfigError};
use crate::core::classifier::{
    ClassificationEvent, InferenceError, RecurrentState, SequenceModel, StreamingClassifier,
};
use crate::core::window::WindowBuffer;
use crate::source::types::{MotionSample, SourceEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// How long `run` waits for a sample before re-checking the stop flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Drives samples through the window buffer and the classifier.
pub struct InferenceLoop<M: SequenceModel> {
    session_id: Uuid,
    buffer: WindowBuffer,
    classifier: StreamingClassifier<M>,
    state: Option<RecurrentState>,
    last_event: Option<ClassificationEvent>,
    windows_classified: u64,
    events_dropped: u64,
}

impl<M: SequenceModel> InferenceLoop<M> {
    /// Build a loop for the given configuration and model.
    ///
    /// Fails fast on an invalid configuration; the pipeline never runs with
    /// misaligned windows.
    pub fn new(config: &Config, model: M) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            session_id: Uuid::new_v4(),
            buffer: WindowBuffer::new(config.window_size, config.window_offset)?,
            classifier: StreamingClassifier::new(model, config.window_size),
            state: None,
            last_event: None,
            windows_classified: 0,
            events_dropped: 0,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The most recent classification, surviving dropped evaluations.
    pub fn last_event(&self) -> Option<&ClassificationEvent> {
        self.last_event.as_ref()
    }

    /// Windows classified so far.
    pub fn windows_classified(&self) -> u64 {
        self.windows_classified
    }

    /// Events dropped to recoverable evaluation failures.
    pub fn events_dropped(&self) -> u64 {
        self.events_dropped
    }

    /// Absorb one sample; classify if it completed a window.
    ///
    /// Returns the fresh event when a window was classified, `Ok(None)` when
    /// no window completed or its evaluation failed recoverably. The only
    /// error that escapes is a window-shape contract violation.
    pub fn push(&mut self, sample: MotionSample) -> Result<Option<ClassificationEvent>, InferenceError> {
        self.buffer.push(sample);
        let Some(window) = self.buffer.ready_window() else {
            return Ok(None);
        };

        match self.classifier.infer(window, self.state.as_ref()) {
            Ok(inference) => {
                self.state = Some(inference.state);
                self.windows_classified += 1;
                self.last_event = Some(inference.event.clone());
                Ok(Some(inference.event))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                // keep the previous state and label; the stream continues
                self.events_dropped += 1;
                warn!(session = %self.session_id, error = %e, "dropping classification event");
                Ok(None)
            }
        }
    }

    /// Forget buffer history, carried state, and the last event.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.state = None;
        self.last_event = None;
    }

    /// Drain a source channel until it disconnects or `stop` is raised.
    ///
    /// `on_tick` fires once per successfully acquired sample — with the fresh
    /// event when that sample completed a window, `None` otherwise. Dropped
    /// acquisition ticks are logged and skipped without a tick, so buffer
    /// indexing and the game clock stay aligned with real samples.
    pub fn run(
        &mut self,
        events: &Receiver<SourceEvent>,
        stop: &AtomicBool,
        mut on_tick: impl FnMut(Option<&ClassificationEvent>),
    ) -> Result<(), InferenceError> {
        while !stop.load(Ordering::SeqCst) {
            match events.recv_timeout(RECV_TIMEOUT) {
                Ok(SourceEvent::Sample(sample)) => {
                    let event = self.push(sample)?;
                    on_tick(event.as_ref());
                }
                Ok(SourceEvent::Dropped { reason, .. }) => {
                    warn!(session = %self.session_id, %reason, "sample acquisition failed; skipping tick");
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::{ModelError, ModelOutput};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Prior-state tags observed by a [`ScriptModel`], one entry per call.
    type SeenPriors = std::sync::Arc<Mutex<Vec<Option<f64>>>>;

    /// Scripted model: tags each state with its invocation number and records
    /// the prior-state tag seen by every call.
    struct ScriptModel {
        labels: Vec<String>,
        fail_on: Option<u64>,
        calls: Mutex<u64>,
        seen_priors: SeenPriors,
    }

    impl ScriptModel {
        fn new(fail_on: Option<u64>) -> (Self, SeenPriors) {
            let seen_priors = SeenPriors::default();
            let model = Self {
                labels: vec!["left".to_string(), "right".to_string()],
                fail_on,
                calls: Mutex::new(0),
                seen_priors: seen_priors.clone(),
            };
            (model, seen_priors)
        }
    }

    impl SequenceModel for ScriptModel {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn evaluate(
            &self,
            _window: &[MotionSample],
            prior: Option<&RecurrentState>,
        ) -> Result<ModelOutput, ModelError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            let call = *calls;
            self.seen_priors
                .lock()
                .unwrap()
                .push(prior.map(|s| s.cell()[0]));
            if self.fail_on == Some(call) {
                return Err(ModelError::Evaluation("scripted failure".to_string()));
            }
            Ok(ModelOutput {
                label: "left".to_string(),
                probabilities: HashMap::from([("left".to_string(), 0.9)]),
                state: RecurrentState::new(vec![], vec![call as f64]),
            })
        }
    }

    fn config() -> Config {
        Config::default()
    }

    fn sample() -> MotionSample {
        MotionSample::new([0.0; 3], [0.0; 3])
    }

    #[test]
    fn test_one_event_per_ready_window() {
        let (model, _) = ScriptModel::new(None);
        let mut pipeline = InferenceLoop::new(&config(), model).unwrap();
        let mut event_at = Vec::new();
        for i in 0..40 {
            if pipeline.push(sample()).unwrap().is_some() {
                event_at.push(i + 1);
            }
        }
        assert_eq!(event_at, vec![20, 25, 30, 35, 40]);
        assert_eq!(pipeline.windows_classified(), 5);
    }

    #[test]
    fn test_state_carried_exactly_once() {
        let (model, seen) = ScriptModel::new(None);
        let mut pipeline = InferenceLoop::new(&config(), model).unwrap();
        for _ in 0..40 {
            pipeline.push(sample()).unwrap();
        }
        // call N+1 always saw the state produced by call N
        let priors = seen.lock().unwrap();
        assert_eq!(
            *priors,
            vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_failed_evaluation_retains_state_and_label() {
        let (model, seen) = ScriptModel::new(Some(2));
        let mut pipeline = InferenceLoop::new(&config(), model).unwrap();
        let mut events = 0;
        for _ in 0..30 {
            if pipeline.push(sample()).unwrap().is_some() {
                events += 1;
            }
        }
        // windows at 20, 25, 30; the second evaluation failed
        assert_eq!(events, 2);
        assert_eq!(pipeline.events_dropped(), 1);
        assert_eq!(pipeline.last_event().unwrap().label, "left");

        let priors = seen.lock().unwrap();
        // call 3 still received call 1's state, not a stale or zeroed one
        assert_eq!(*priors, vec![None, Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_reset_restarts_session_statelessly() {
        let (model, seen) = ScriptModel::new(None);
        let mut pipeline = InferenceLoop::new(&config(), model).unwrap();
        for _ in 0..20 {
            pipeline.push(sample()).unwrap();
        }
        pipeline.reset();
        assert!(pipeline.last_event().is_none());
        for _ in 0..20 {
            pipeline.push(sample()).unwrap();
        }
        let priors = seen.lock().unwrap();
        // the first call after reset ran without prior state
        assert_eq!(*priors, vec![None, None]);
    }

    #[test]
    fn test_invalid_config_refused() {
        let bad = Config {
            window_offset: 3,
            ..Config::default()
        };
        let (model, _) = ScriptModel::new(None);
        assert!(InferenceLoop::new(&bad, model).is_err());
    }
}
