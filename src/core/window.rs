//! Dual-track sliding-window buffer over a fixed-rate sample stream.
//!
//! Samples land in two tracks offset by `window_size`, so every completed
//! window is one contiguous slice and no wrap-around re-assembly happens at
//! read time. Once the buffer has wrapped at least once ("primed"), a window
//! becomes ready every `window_offset` pushes; consecutive windows share
//! `window_size - window_offset` samples.
//!
//! Invariants:
//! - `0 <= write_index < window_size`, cycling modulo `window_size`
//! - capacity is `window_size + window_offset * (number_of_windows - 1)`
//! - a window is ready only when primed, `write_index` is a multiple of
//!   `window_offset`, and `write_index + window_offset <= window_size`;
//!   its track is `write_index / window_offset`

use crate::source::types::MotionSample;

/// Why a window/offset combination is rejected.
///
/// Geometry is checked once, at construction; `push` and `ready_window` are
/// total afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowGeometryError {
    ZeroWindowSize,
    ZeroWindowOffset,
    OffsetExceedsWindow {
        window_size: usize,
        window_offset: usize,
    },
    UnalignedOffset {
        window_size: usize,
        window_offset: usize,
    },
}

impl std::fmt::Display for WindowGeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowGeometryError::ZeroWindowSize => write!(f, "window size must be nonzero"),
            WindowGeometryError::ZeroWindowOffset => write!(f, "window offset must be nonzero"),
            WindowGeometryError::OffsetExceedsWindow {
                window_size,
                window_offset,
            } => write!(
                f,
                "window offset {window_offset} exceeds window size {window_size}"
            ),
            WindowGeometryError::UnalignedOffset {
                window_size,
                window_offset,
            } => write!(
                f,
                "window offset {window_offset} must divide window size {window_size} evenly"
            ),
        }
    }
}

impl std::error::Error for WindowGeometryError {}

/// Fixed-capacity circular store emitting overlapping windows at a fixed stride.
#[derive(Debug)]
pub struct WindowBuffer {
    data: Vec<MotionSample>,
    window_size: usize,
    window_offset: usize,
    write_index: usize,
    primed: bool,
}

impl WindowBuffer {
    /// Create a buffer for `window_size`-sample windows advanced by
    /// `window_offset` samples each.
    pub fn new(window_size: usize, window_offset: usize) -> Result<Self, WindowGeometryError> {
        Self::check_geometry(window_size, window_offset)?;
        let capacity = Self::capacity_for(window_size, window_offset);
        Ok(Self {
            data: vec![MotionSample::new([0.0; 3], [0.0; 3]); capacity],
            window_size,
            window_offset,
            write_index: 0,
            primed: false,
        })
    }

    /// Validate a window/offset combination without building a buffer.
    pub fn check_geometry(
        window_size: usize,
        window_offset: usize,
    ) -> Result<(), WindowGeometryError> {
        if window_size == 0 {
            return Err(WindowGeometryError::ZeroWindowSize);
        }
        if window_offset == 0 {
            return Err(WindowGeometryError::ZeroWindowOffset);
        }
        if window_offset > window_size {
            return Err(WindowGeometryError::OffsetExceedsWindow {
                window_size,
                window_offset,
            });
        }
        if window_size % window_offset != 0 {
            return Err(WindowGeometryError::UnalignedOffset {
                window_size,
                window_offset,
            });
        }
        Ok(())
    }

    /// Overlapping windows held simultaneously for this geometry.
    pub fn number_of_windows_for(window_size: usize, window_offset: usize) -> usize {
        window_size / window_offset
    }

    /// Total sample capacity for this geometry.
    ///
    /// Total even over invalid geometries (reported elsewhere), so a bad
    /// config can still be displayed.
    pub fn capacity_for(window_size: usize, window_offset: usize) -> usize {
        let number_of_windows = Self::number_of_windows_for(window_size, window_offset);
        window_size + window_offset * number_of_windows.saturating_sub(1)
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn window_offset(&self) -> usize {
        self.window_offset
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// True once every buffer position holds a real sample.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Absorb one sample.
    ///
    /// The sample is copied into both tracks that cover the current write
    /// position; each slot is written at most once per wrap. Priming flips on
    /// exactly when the write index returns to 0 after a full cycle.
    pub fn push(&mut self, sample: MotionSample) {
        for offset in [0, self.window_size] {
            let index = self.write_index + offset;
            if index < self.data.len() {
                self.data[index] = sample;
            }
        }
        self.write_index = (self.write_index + 1) % self.window_size;
        if self.write_index == 0 {
            self.primed = true;
        }
    }

    /// The most recently completed stride-aligned window, if one just completed.
    ///
    /// Returns a contiguous slice of exactly `window_size` samples, oldest
    /// first. Non-`None` exactly once per `window_offset` pushes once primed,
    /// and never before priming.
    pub fn ready_window(&self) -> Option<&[MotionSample]> {
        if !self.primed {
            return None;
        }
        if self.write_index % self.window_offset != 0 {
            return None;
        }
        if self.write_index + self.window_offset > self.window_size {
            return None;
        }
        let track = self.write_index / self.window_offset;
        let start = track * self.window_offset;
        Some(&self.data[start..start + self.window_size])
    }

    /// Forget all history; the buffer must fully re-prime before the next window.
    pub fn reset(&mut self) {
        self.write_index = 0;
        self.primed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(i: usize) -> MotionSample {
        MotionSample::from_features([i as f64; 6])
    }

    fn tag_of(sample: &MotionSample) -> usize {
        sample.rotation_rate[0] as usize
    }

    #[test]
    fn test_geometry_rejected_at_construction() {
        assert_eq!(
            WindowBuffer::new(0, 5).unwrap_err(),
            WindowGeometryError::ZeroWindowSize
        );
        assert_eq!(
            WindowBuffer::new(20, 0).unwrap_err(),
            WindowGeometryError::ZeroWindowOffset
        );
        assert_eq!(
            WindowBuffer::new(5, 20).unwrap_err(),
            WindowGeometryError::OffsetExceedsWindow {
                window_size: 5,
                window_offset: 20
            }
        );
        assert_eq!(
            WindowBuffer::new(20, 7).unwrap_err(),
            WindowGeometryError::UnalignedOffset {
                window_size: 20,
                window_offset: 7
            }
        );
    }

    #[test]
    fn test_no_window_before_priming() {
        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        for i in 0..19 {
            buffer.push(tagged(i));
            assert!(!buffer.is_primed());
            assert!(buffer.ready_window().is_none(), "window before push {i}");
        }
    }

    #[test]
    fn test_scenario_20_5_geometry_and_cadence() {
        // windowSize=20, windowOffset=5 -> 4 windows, capacity 35
        assert_eq!(WindowBuffer::number_of_windows_for(20, 5), 4);
        assert_eq!(WindowBuffer::capacity_for(20, 5), 35);

        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        let mut ready_at = Vec::new();
        for i in 0..40 {
            buffer.push(tagged(i));
            if buffer.ready_window().is_some() {
                ready_at.push(i + 1); // 1-based push count
            }
        }
        assert!(buffer.is_primed());
        assert_eq!(ready_at, vec![20, 25, 30, 35, 40]);
    }

    #[test]
    fn test_window_contents_oldest_first() {
        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        for i in 0..20 {
            buffer.push(tagged(i));
        }
        let window = buffer.ready_window().unwrap();
        assert_eq!(window.len(), 20);
        let tags: Vec<usize> = window.iter().map(tag_of).collect();
        assert_eq!(tags, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_overlap_law() {
        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        let mut previous: Option<Vec<usize>> = None;
        for i in 0..60 {
            buffer.push(tagged(i));
            if let Some(window) = buffer.ready_window() {
                let tags: Vec<usize> = window.iter().map(tag_of).collect();
                if let Some(prev) = previous.take() {
                    // the last 15 samples of W_i are the first 15 of W_{i+1}
                    assert_eq!(prev[5..], tags[..15]);
                }
                previous = Some(tags);
            }
        }
    }

    #[test]
    fn test_second_wrap_reads_fresh_samples() {
        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        for i in 0..40 {
            buffer.push(tagged(i));
        }
        // after two full cycles the track-0 window holds samples 20..40
        let tags: Vec<usize> = buffer.ready_window().unwrap().iter().map(tag_of).collect();
        assert_eq!(tags, (20..40).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_requires_full_reprime() {
        let mut buffer = WindowBuffer::new(20, 5).unwrap();
        for i in 0..25 {
            buffer.push(tagged(i));
        }
        buffer.reset();
        assert!(!buffer.is_primed());
        for i in 0..19 {
            buffer.push(tagged(100 + i));
            assert!(buffer.ready_window().is_none());
        }
        buffer.push(tagged(119));
        assert!(buffer.ready_window().is_some());
    }

    #[test]
    fn test_unit_offset_geometry() {
        // stride 1: a window every push once primed
        let mut buffer = WindowBuffer::new(4, 1).unwrap();
        assert_eq!(buffer.capacity(), 7);
        for i in 0..4 {
            buffer.push(tagged(i));
        }
        for i in 4..12 {
            assert!(buffer.ready_window().is_some());
            buffer.push(tagged(i));
        }
        let tags: Vec<usize> = buffer.ready_window().unwrap().iter().map(tag_of).collect();
        assert_eq!(tags, vec![8, 9, 10, 11]);
    }
}
