//! Turn-based reaction game over the classification stream.
//!
//! The engine is driven once per sample tick with the classification event
//! that tick produced, if any. All timers are tick-counted against the
//! sampling cadence; no wall-clock timers are involved. Target selection is
//! seedable, so every transition is deterministically testable.

use crate::config::Config;
use crate::core::classifier::ClassificationEvent;

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Success,
    Timeout,
}

/// Lifecycle of the round currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundPhase {
    AwaitingMatch,
    Ended(RoundOutcome),
}

/// One round: a target gesture and its countdown.
///
/// While awaiting a match, `seconds_remaining` is the countdown; once ended,
/// it is the display-hold timer keeping the outcome on screen.
#[derive(Debug, Clone)]
pub struct GameRound {
    pub target: String,
    pub seconds_remaining: u32,
    phase: RoundPhase,
}

impl GameRound {
    /// The outcome, once the round has ended.
    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.phase {
            RoundPhase::AwaitingMatch => None,
            RoundPhase::Ended(outcome) => Some(outcome),
        }
    }
}

/// Display strings pushed to the presentation seam on every round-state change.
///
/// The receiving side may live on any thread; nothing here refers back into
/// the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundDisplay {
    pub target_text: String,
    pub countdown_text: String,
    pub success_count: u32,
    pub timeout_count: u32,
}

/// Deterministic target picker (linear congruential, seedable).
#[derive(Debug)]
struct TargetPicker {
    state: u64,
}

impl TargetPicker {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn pick(&mut self, n: usize) -> usize {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        ((self.state >> 33) as usize) % n
    }
}

/// The game state machine.
pub struct GameEngine {
    labels: Vec<String>,
    samples_per_second: u32,
    round_seconds: u32,
    hold_seconds: u32,
    picker: TargetPicker,
    playing: bool,
    success_count: u32,
    timeout_count: u32,
    round: Option<GameRound>,
    ticks_into_second: u32,
}

impl GameEngine {
    pub fn new(config: &Config, seed: u64) -> Self {
        Self {
            labels: config.labels.clone(),
            samples_per_second: config.samples_per_second,
            round_seconds: config.round_seconds,
            hold_seconds: config.hold_seconds,
            picker: TargetPicker::new(seed),
            playing: false,
            success_count: 0,
            timeout_count: 0,
            round: None,
            ticks_into_second: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn success_count(&self) -> u32 {
        self.success_count
    }

    pub fn timeout_count(&self) -> u32 {
        self.timeout_count
    }

    /// Rounds finished since the last start.
    pub fn rounds_completed(&self) -> u32 {
        self.success_count + self.timeout_count
    }

    pub fn current_round(&self) -> Option<&GameRound> {
        self.round.as_ref()
    }

    /// Begin a play session: counters reset, a fresh round starts.
    pub fn start(&mut self) -> RoundDisplay {
        self.playing = true;
        self.success_count = 0;
        self.timeout_count = 0;
        self.ticks_into_second = 0;
        let round = self.fresh_round();
        self.round = Some(round);
        self.display()
    }

    /// End the play session. Counters stay visible until the next start.
    pub fn stop(&mut self) -> RoundDisplay {
        self.playing = false;
        self.round = None;
        self.display()
    }

    /// Advance one sample tick.
    ///
    /// `event` is the classification this tick produced, if any. A match is
    /// checked before the second-boundary branch: a gesture landing on the
    /// same tick as the countdown expiring still wins. Returns a fresh
    /// display exactly when the visible round state changed.
    pub fn tick(&mut self, event: Option<&ClassificationEvent>) -> Option<RoundDisplay> {
        if !self.playing {
            return None;
        }

        let mut matched = false;
        if let (Some(event), Some(round)) = (event, self.round.as_mut()) {
            if round.phase == RoundPhase::AwaitingMatch && event.label == round.target {
                round.phase = RoundPhase::Ended(RoundOutcome::Success);
                round.seconds_remaining = self.hold_seconds;
                self.success_count += 1;
                matched = true;
            }
        }

        let mut changed = matched;
        self.ticks_into_second += 1;
        if self.ticks_into_second >= self.samples_per_second {
            self.ticks_into_second = 0;
            if !matched {
                changed |= self.second_boundary();
            }
        }

        changed.then(|| self.display())
    }

    /// Current display snapshot.
    pub fn display(&self) -> RoundDisplay {
        let (target_text, countdown_text) = match &self.round {
            Some(round) => {
                let countdown = match round.phase {
                    RoundPhase::AwaitingMatch => round.seconds_remaining.to_string(),
                    RoundPhase::Ended(RoundOutcome::Success) => "✓".to_string(),
                    RoundPhase::Ended(RoundOutcome::Timeout) => "✗".to_string(),
                };
                (round.target.clone(), countdown)
            }
            None => ("-".to_string(), "-".to_string()),
        };
        RoundDisplay {
            target_text,
            countdown_text,
            success_count: self.success_count,
            timeout_count: self.timeout_count,
        }
    }

    /// Handle one whole-second boundary. Returns true if round state changed.
    fn second_boundary(&mut self) -> bool {
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        match round.phase {
            RoundPhase::AwaitingMatch => {
                if round.seconds_remaining == 0 {
                    round.phase = RoundPhase::Ended(RoundOutcome::Timeout);
                    round.seconds_remaining = self.hold_seconds;
                    self.timeout_count += 1;
                } else {
                    round.seconds_remaining -= 1;
                }
                true
            }
            RoundPhase::Ended(_) => {
                if round.seconds_remaining > 0 {
                    round.seconds_remaining -= 1;
                }
                if round.seconds_remaining == 0 {
                    let target = self.labels[self.picker.pick(self.labels.len())].clone();
                    *round = GameRound {
                        target,
                        seconds_remaining: self.round_seconds,
                        phase: RoundPhase::AwaitingMatch,
                    };
                }
                true
            }
        }
    }

    fn fresh_round(&mut self) -> GameRound {
        let target = self.labels[self.picker.pick(self.labels.len())].clone();
        GameRound {
            target,
            seconds_remaining: self.round_seconds,
            phase: RoundPhase::AwaitingMatch,
        }
    }
}
