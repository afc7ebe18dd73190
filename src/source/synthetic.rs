//! Deterministic synthetic motion for demos and tests.
//!
//! Generates an endless-feeling stream that cycles through four motion
//! archetypes (vertical chop, wrist twist, all-axis shake, rest), one segment
//! each, for a configurable number of cycles. The waveforms are pure functions
//! of the sample index, so a given configuration always produces the same
//! stream.

use crate::source::types::{MotionSample, SourceEvent};
use crate::source::{SampleSource, SourceError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const CHANNEL_CAPACITY: usize = 10_000;

/// Number of motion archetypes in one cycle.
const ARCHETYPES: usize = 4;

/// Generates deterministic gesture-shaped motion.
pub struct SyntheticSource {
    segment_len: usize,
    cycles: usize,
    interval: Duration,
    throttle: bool,
    sender: Option<Sender<SourceEvent>>,
    receiver: Receiver<SourceEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    /// Create a source emitting `cycles` passes over the four archetypes,
    /// `segment_len` samples per archetype, at the given cadence.
    pub fn new(samples_per_second: u32, segment_len: usize, cycles: usize) -> Self {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        Self {
            segment_len: segment_len.max(1),
            cycles: cycles.max(1),
            interval: Duration::from_secs_f64(1.0 / f64::from(samples_per_second.max(1))),
            throttle: true,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Emit as fast as the consumer drains instead of at the sampling cadence.
    pub fn unthrottled(mut self) -> Self {
        self.throttle = false;
        self
    }

    /// Total number of samples this source will emit.
    pub fn len(&self) -> usize {
        self.segment_len * ARCHETYPES * self.cycles
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sample at stream position `index`.
    ///
    /// Exposed so tests can feed the same waveform without a channel.
    pub fn sample_at(&self, index: usize) -> MotionSample {
        archetype_sample(self.segment_len, index)
    }
}

/// Waveform for stream position `index` given the segment length.
fn archetype_sample(segment_len: usize, index: usize) -> MotionSample {
    let segment = (index / segment_len) % ARCHETYPES;
    let phase = (index % segment_len) as f64 / segment_len as f64;
    let swing = (phase * std::f64::consts::TAU * 2.0).sin();
    match segment {
        // vertical chop: strong z-acceleration strokes
        0 => MotionSample::new([0.3 * swing, 0.1, 0.0], [0.05, 0.1, 1.4 * swing]),
        // wrist twist: rotation dominated by the z axis
        1 => MotionSample::new([0.1, 0.05, 2.2 * swing], [0.1 * swing, 0.05, 0.1]),
        // shake: fast jitter on every acceleration axis
        2 => {
            let fast = (phase * std::f64::consts::TAU * 6.0).sin();
            MotionSample::new(
                [0.4 * fast, 0.4 * -fast, 0.3 * fast],
                [1.1 * fast, 1.0 * -fast, 0.9 * fast],
            )
        }
        // rest: near stillness
        _ => MotionSample::new([0.01 * swing, 0.0, 0.0], [0.0, 0.01 * swing, 0.0]),
    }
}

impl SampleSource for SyntheticSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyRunning);
        }
        let sender = self.sender.take().ok_or(SourceError::Exhausted)?;
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let total = self.len();
        let segment_len = self.segment_len;
        let interval = self.interval;
        let throttle = self.throttle;

        self.handle = Some(thread::spawn(move || {
            for index in 0..total {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if sender
                    .send(SourceEvent::Sample(archetype_sample(segment_len, index)))
                    .is_err()
                {
                    break;
                }
                if throttle {
                    thread::sleep(interval);
                }
            }
            running.store(false, Ordering::SeqCst);
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
