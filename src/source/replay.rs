//! Replay of recorded motion streams.
//!
//! Recordings are JSON Lines files with one [`MotionSample`] per line.
//! Lines that fail to parse are reported as dropped acquisition ticks rather
//! than aborting the replay, matching how a live sensor driver reports a
//! failed read.

use crate::source::types::{MotionSample, SourceEvent};
use crate::source::{SampleSource, SourceError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Capacity of the delivery channel.
const CHANNEL_CAPACITY: usize = 10_000;

/// Replays a JSONL recording of motion samples at the configured cadence.
pub struct ReplaySource {
    lines: Arc<Vec<String>>,
    interval: Duration,
    throttle: bool,
    sender: Option<Sender<SourceEvent>>,
    receiver: Receiver<SourceEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Load a recording from disk.
    ///
    /// The file is read eagerly; parsing happens on the delivery thread so a
    /// corrupt line surfaces as a dropped tick, not a load failure.
    pub fn from_path(path: &Path, samples_per_second: u32) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Recording(format!("{}: {e}", path.display())))?;
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if lines.is_empty() {
            return Err(SourceError::Recording(format!(
                "{}: recording contains no samples",
                path.display()
            )));
        }
        Ok(Self::from_lines(lines, samples_per_second))
    }

    /// Build a replay from in-memory recording lines.
    pub fn from_lines(lines: Vec<String>, samples_per_second: u32) -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            lines: Arc::new(lines),
            interval: Duration::from_secs_f64(1.0 / f64::from(samples_per_second.max(1))),
            throttle: true,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Replay as fast as the consumer drains instead of at the recorded cadence.
    pub fn unthrottled(mut self) -> Self {
        self.throttle = false;
        self
    }

    /// Number of recording lines (samples plus any corrupt entries).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl SampleSource for ReplaySource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let sender = self.sender.take().ok_or(SourceError::Exhausted)?;
        self.running.store(true, Ordering::SeqCst);

        let lines = Arc::clone(&self.lines);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let throttle = self.throttle;

        self.handle = Some(thread::spawn(move || {
            for (index, line) in lines.iter().enumerate() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let event = match serde_json::from_str::<MotionSample>(line) {
                    Ok(sample) => SourceEvent::Sample(sample),
                    Err(e) => SourceEvent::dropped(format!("line {}: {e}", index + 1)),
                };
                if sender.send(event).is_err() {
                    break;
                }
                if throttle {
                    thread::sleep(interval);
                }
            }
            running.store(false, Ordering::SeqCst);
            // sender drops here; the receiver disconnects once drained
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn receiver(&self) -> &Receiver<SourceEvent> {
        &self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_line(v: f64) -> String {
        serde_json::to_string(&MotionSample::from_features([v; 6])).unwrap()
    }

    #[test]
    fn test_replay_delivers_all_samples() {
        let lines: Vec<String> = (0..5).map(|i| sample_line(i as f64)).collect();
        let mut source = ReplaySource::from_lines(lines, 25).unthrottled();
        source.start().unwrap();

        let mut samples = 0;
        while let Ok(event) = source.receiver().recv() {
            if let SourceEvent::Sample(_) = event {
                samples += 1;
            }
        }
        assert_eq!(samples, 5);
    }

    #[test]
    fn test_corrupt_line_becomes_dropped_tick() {
        let lines = vec![sample_line(1.0), "not json".to_string(), sample_line(2.0)];
        let mut source = ReplaySource::from_lines(lines, 25).unthrottled();
        source.start().unwrap();

        let mut samples = 0;
        let mut dropped = 0;
        while let Ok(event) = source.receiver().recv() {
            match event {
                SourceEvent::Sample(_) => samples += 1,
                SourceEvent::Dropped { reason, .. } => {
                    assert!(reason.contains("line 2"));
                    dropped += 1;
                }
            }
        }
        assert_eq!(samples, 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_start_twice_fails() {
        let mut source = ReplaySource::from_lines(vec![sample_line(0.0)], 25).unthrottled();
        source.start().unwrap();
        source.stop();
        assert!(matches!(
            source.start(),
            Err(SourceError::AlreadyRunning | SourceError::Exhausted)
        ));
    }
}
