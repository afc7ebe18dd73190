//! Sample and event types shared by every sample source.
//!
//! A source delivers one [`MotionSample`] per acquisition tick at the
//! configured cadence. Ticks that fail to produce a sample are reported as
//! [`SourceEvent::Dropped`] so the consumer can log and skip them without
//! disturbing buffer indexing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of scalar features carried by one motion sample.
pub const FEATURE_COUNT: usize = 6;

/// One six-axis motion sample: angular rate plus linear acceleration.
///
/// Feature order is fixed and matches the classifier input layout:
/// rotation rate x/y/z, then acceleration x/y/z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Angular rate around x/y/z in radians per second
    pub rotation_rate: [f64; 3],
    /// Linear (gravity-removed) acceleration along x/y/z in g
    pub acceleration: [f64; 3],
}

impl MotionSample {
    pub fn new(rotation_rate: [f64; 3], acceleration: [f64; 3]) -> Self {
        Self {
            rotation_rate,
            acceleration,
        }
    }

    /// Build a sample from a flat feature array in classifier order.
    pub fn from_features(features: [f64; FEATURE_COUNT]) -> Self {
        Self {
            rotation_rate: [features[0], features[1], features[2]],
            acceleration: [features[3], features[4], features[5]],
        }
    }

    /// Flatten into classifier feature order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.rotation_rate[0],
            self.rotation_rate[1],
            self.rotation_rate[2],
            self.acceleration[0],
            self.acceleration[1],
            self.acceleration[2],
        ]
    }

    /// True if every feature is a finite number.
    pub fn is_finite(&self) -> bool {
        self.features().iter().all(|f| f.is_finite())
    }
}

/// What a sample source delivers over its channel.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A successfully acquired sample.
    Sample(MotionSample),
    /// One acquisition tick failed; the sample is skipped.
    Dropped {
        timestamp: DateTime<Utc>,
        reason: String,
    },
}

impl SourceEvent {
    /// Create a dropped-sample report stamped with the current time.
    pub fn dropped(reason: impl Into<String>) -> Self {
        Self::Dropped {
            timestamp: Utc::now(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_round_trip() {
        let sample = MotionSample::from_features([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(sample.rotation_rate, [1.0, 2.0, 3.0]);
        assert_eq!(sample.acceleration, [4.0, 5.0, 6.0]);
        assert_eq!(sample.features(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sample_serde_round_trip() {
        let sample = MotionSample::new([0.1, -0.2, 0.3], [0.0, 0.9, -1.1]);
        let json = serde_json::to_string(&sample).unwrap();
        let back: MotionSample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn test_finite_check() {
        assert!(MotionSample::new([0.0; 3], [0.0; 3]).is_finite());
        assert!(!MotionSample::new([f64::NAN, 0.0, 0.0], [0.0; 3]).is_finite());
    }
}
