use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::difficulty::DifficultyCalculator;

pub const MAX_FRAME_DELTA_SECONDS: f64 = 1.0 / 30.0;
pub const DEFAULT_FRAME_SECONDS: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Upper bound for one frame's contribution to play time.
    pub max_frame_delta_seconds: f64,
    /// Substituted for negative or non-finite frame deltas.
    pub default_frame_seconds: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_frame_delta_seconds: MAX_FRAME_DELTA_SECONDS,
            default_frame_seconds: DEFAULT_FRAME_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchState {
    #[default]
    Loading,
    Playing,
    Paused,
    Over,
}

impl MatchState {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchStatistics {
    pub score: u64,
    pub kills: u32,
    pub play_time_seconds: f64,
    pub current_wave: u32,
}

impl Default for MatchStatistics {
    fn default() -> Self {
        Self {
            score: 0,
            kills: 0,
            play_time_seconds: 0.0,
            current_wave: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaCorrection {
    Clamped,
    Defaulted,
}

/// Result of one simulated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAdvance {
    pub delta_seconds: f64,
    pub play_time_seconds: f64,
    pub previous_wave: u32,
    pub current_wave: u32,
    pub correction: Option<DeltaCorrection>,
}

impl FrameAdvance {
    /// Waves entered during this frame, in increasing order. Usually empty or
    /// a single wave; several only if one frame spans multiple boundaries.
    pub fn started_waves(&self) -> RangeInclusive<u32> {
        self.previous_wave.saturating_add(1)..=self.current_wave
    }
}

/// Authoritative match time and state. Play time only accumulates while
/// `Playing` and foregrounded; paused and backgrounded real time is subtracted
/// from the next frame's delta.
#[derive(Debug, Clone)]
pub struct MatchClock {
    config: ClockConfig,
    calculator: DifficultyCalculator,
    state: MatchState,
    stats: MatchStatistics,
    last_timestamp: f64,
    accumulated_excluded_seconds: f64,
    excluded_since: Option<f64>,
    backgrounded: bool,
}

impl MatchClock {
    pub fn new(config: ClockConfig, calculator: DifficultyCalculator) -> Self {
        Self {
            config,
            calculator,
            state: MatchState::Loading,
            stats: MatchStatistics::default(),
            last_timestamp: 0.0,
            accumulated_excluded_seconds: 0.0,
            excluded_since: None,
            backgrounded: false,
        }
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn statistics(&self) -> &MatchStatistics {
        &self.stats
    }

    pub fn play_time_seconds(&self) -> f64 {
        self.stats.play_time_seconds
    }

    pub fn is_backgrounded(&self) -> bool {
        self.backgrounded
    }

    /// Begins a fresh match from any state.
    pub fn start(&mut self, now: f64) {
        self.state = MatchState::Playing;
        self.stats = MatchStatistics::default();
        self.last_timestamp = now;
        self.accumulated_excluded_seconds = 0.0;
        self.excluded_since = self.backgrounded.then_some(now);
        debug!(now, "match_clock_started");
    }

    pub fn pause(&mut self, now: f64) -> bool {
        if self.state != MatchState::Playing {
            debug!(state = self.state.as_token(), "pause_ignored");
            return false;
        }
        self.transition_excluded(now, |clock| clock.state = MatchState::Paused);
        true
    }

    pub fn resume(&mut self, now: f64) -> bool {
        if self.state != MatchState::Paused {
            debug!(state = self.state.as_token(), "resume_ignored");
            return false;
        }
        self.transition_excluded(now, |clock| clock.state = MatchState::Playing);
        true
    }

    /// Ends the match from `Playing` or `Paused`.
    pub fn end(&mut self) -> bool {
        if !matches!(self.state, MatchState::Playing | MatchState::Paused) {
            debug!(state = self.state.as_token(), "end_ignored");
            return false;
        }
        self.state = MatchState::Over;
        self.excluded_since = None;
        self.accumulated_excluded_seconds = 0.0;
        true
    }

    pub fn set_backgrounded(&mut self, backgrounded: bool, now: f64) {
        if self.backgrounded == backgrounded {
            return;
        }
        self.transition_excluded(now, |clock| clock.backgrounded = backgrounded);
    }

    pub fn add_kill(&mut self, points: u64) {
        self.stats.kills = self.stats.kills.saturating_add(1);
        self.stats.score = self.stats.score.saturating_add(points);
    }

    /// Called once per rendered frame. Returns `None` when the frame does not
    /// advance the simulation.
    pub fn advance(&mut self, now: f64) -> Option<FrameAdvance> {
        if self.state != MatchState::Playing || self.backgrounded {
            return None;
        }
        if !now.is_finite() {
            debug!("non_finite_timestamp_ignored");
            return None;
        }

        let raw_delta = now - self.last_timestamp - self.accumulated_excluded_seconds;
        self.accumulated_excluded_seconds = 0.0;
        self.last_timestamp = now;

        let (delta_seconds, correction) = self.correct_delta(raw_delta);
        self.stats.play_time_seconds += delta_seconds;

        let previous_wave = self.stats.current_wave;
        let calculated_wave = self
            .calculator
            .wave_for_play_time(self.stats.play_time_seconds);
        if calculated_wave > previous_wave {
            self.stats.current_wave = calculated_wave;
        }

        Some(FrameAdvance {
            delta_seconds,
            play_time_seconds: self.stats.play_time_seconds,
            previous_wave,
            current_wave: self.stats.current_wave,
            correction,
        })
    }

    fn correct_delta(&self, raw_delta: f64) -> (f64, Option<DeltaCorrection>) {
        if !raw_delta.is_finite() || raw_delta < 0.0 {
            debug!(raw_delta, "negative_frame_delta_defaulted");
            return (
                self.config.default_frame_seconds,
                Some(DeltaCorrection::Defaulted),
            );
        }
        if raw_delta > self.config.max_frame_delta_seconds {
            debug!(raw_delta, "frame_delta_clamped");
            return (
                self.config.max_frame_delta_seconds,
                Some(DeltaCorrection::Clamped),
            );
        }
        (raw_delta, None)
    }

    fn is_excluded(&self) -> bool {
        self.state == MatchState::Paused || self.backgrounded
    }

    /// Pause and background intervals may overlap; only their union is
    /// subtracted.
    fn transition_excluded(&mut self, now: f64, change: impl FnOnce(&mut Self)) {
        let was_excluded = self.is_excluded();
        change(self);
        let is_excluded = self.is_excluded();

        if !was_excluded && is_excluded {
            self.excluded_since = Some(now);
        } else if was_excluded && !is_excluded {
            if let Some(since) = self.excluded_since.take() {
                self.accumulated_excluded_seconds += (now - since).max(0.0);
            }
        }
    }
}
