//! Built-in deterministic stand-in for the trained sequence model.
//!
//! Scores each gesture from windowed energy statistics, then smooths the
//! scores through the recurrent state so consecutive windows behave as one
//! continuous stream rather than independent snapshots. It lets the pipeline
//! and game run end-to-end without the trained network; swap the real model
//! in through [`SequenceModel`].
//!
//! Up to four labels are interpreted positionally: a vertical-hit gesture, a
//! twist gesture, a shake gesture, and a rest class. Extra labels score zero.

use crate::core::classifier::{ModelError, ModelOutput, RecurrentState, SequenceModel};
use crate::source::types::MotionSample;
use std::collections::HashMap;

/// Weight of the current window when blending with the carried scores.
const SMOOTHING: f64 = 0.6;

/// Deterministic energy-statistics model.
pub struct HeuristicModel {
    labels: Vec<String>,
}

impl HeuristicModel {
    pub fn with_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

/// Per-window motion statistics feeding the label scores.
struct WindowStats {
    rotation_energy: f64,
    acceleration_energy: f64,
    vertical_swing: f64,
    z_spin: f64,
    jitter: f64,
}

fn magnitude(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn window_stats(window: &[MotionSample]) -> WindowStats {
    let n = window.len() as f64;
    let rotation_energy = window.iter().map(|s| magnitude(&s.rotation_rate)).sum::<f64>() / n;
    let acceleration_energy = window.iter().map(|s| magnitude(&s.acceleration)).sum::<f64>() / n;
    let vertical_swing = window.iter().map(|s| s.acceleration[2].abs()).sum::<f64>() / n;
    let z_spin = window.iter().map(|s| s.rotation_rate[2].abs()).sum::<f64>() / n;

    // mean absolute first difference of acceleration magnitude
    let jitter = if window.len() < 2 {
        0.0
    } else {
        window
            .windows(2)
            .map(|pair| (magnitude(&pair[1].acceleration) - magnitude(&pair[0].acceleration)).abs())
            .sum::<f64>()
            / (n - 1.0)
    };

    WindowStats {
        rotation_energy,
        acceleration_energy,
        vertical_swing,
        z_spin,
        jitter,
    }
}

impl SequenceModel for HeuristicModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn evaluate(
        &self,
        window: &[MotionSample],
        prior: Option<&RecurrentState>,
    ) -> Result<ModelOutput, ModelError> {
        if window.iter().any(|s| !s.is_finite()) {
            return Err(ModelError::Evaluation(
                "window contains non-finite features".to_string(),
            ));
        }

        let stats = window_stats(window);
        let total_energy = stats.rotation_energy + stats.acceleration_energy;

        let mut scores = vec![0.0; self.labels.len()];
        for (index, score) in scores.iter_mut().enumerate() {
            *score = match index {
                0 => stats.vertical_swing * 2.0 + stats.acceleration_energy * 0.5,
                1 => stats.z_spin * 2.0 + stats.rotation_energy * 0.25,
                2 => stats.jitter * 4.0 + stats.acceleration_energy * 0.5,
                3 => 1.0 / (1.0 + total_energy * 4.0),
                _ => 0.0,
            };
        }

        // blend with the carried scores so the stream stays temporally coherent
        let smoothed: Vec<f64> = match prior {
            Some(state) if state.hidden().len() == scores.len() => scores
                .iter()
                .zip(state.hidden())
                .map(|(s, h)| SMOOTHING * s + (1.0 - SMOOTHING) * h)
                .collect(),
            _ => scores.clone(),
        };

        let sum: f64 = smoothed.iter().sum();
        let mut best = 0;
        for (index, value) in smoothed.iter().enumerate() {
            if *value > smoothed[best] {
                best = index;
            }
        }

        let probabilities: HashMap<String, f64> = self
            .labels
            .iter()
            .zip(&smoothed)
            .map(|(label, value)| {
                let p = if sum > 0.0 { value / sum } else { 0.0 };
                (label.clone(), p)
            })
            .collect();

        Ok(ModelOutput {
            label: self.labels[best].clone(),
            probabilities,
            state: RecurrentState::new(smoothed, scores),
        })
    }
}
