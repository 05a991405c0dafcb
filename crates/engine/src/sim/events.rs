use super::effects::EffectKind;
use super::geometry::Vec2;

/// Notifications for the presentation layer (toasts, feedback). The engine
/// does not care how they are displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchEvent {
    MatchStarted,
    WaveStarted { wave: u32 },
    GaugeReady,
    UltimateActivated,
    EffectStarted { kind: EffectKind },
    EffectRefreshed { kind: EffectKind },
    EffectEnded { kind: EffectKind },
    ShotFired { target_id: u64, direction: Vec2 },
    KillRegistered { kills: u32, score: u64 },
    MatchEnded { play_time_seconds: f64, kills: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEventKind {
    MatchStarted,
    WaveStarted,
    GaugeReady,
    UltimateActivated,
    EffectStarted,
    EffectRefreshed,
    EffectEnded,
    ShotFired,
    KillRegistered,
    MatchEnded,
}

impl MatchEvent {
    pub fn kind(self) -> MatchEventKind {
        match self {
            Self::MatchStarted => MatchEventKind::MatchStarted,
            Self::WaveStarted { .. } => MatchEventKind::WaveStarted,
            Self::GaugeReady => MatchEventKind::GaugeReady,
            Self::UltimateActivated => MatchEventKind::UltimateActivated,
            Self::EffectStarted { .. } => MatchEventKind::EffectStarted,
            Self::EffectRefreshed { .. } => MatchEventKind::EffectRefreshed,
            Self::EffectEnded { .. } => MatchEventKind::EffectEnded,
            Self::ShotFired { .. } => MatchEventKind::ShotFired,
            Self::KillRegistered { .. } => MatchEventKind::KillRegistered,
            Self::MatchEnded { .. } => MatchEventKind::MatchEnded,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchEventCounts {
    pub total: u32,
    pub waves_started: u32,
    pub gauge_ready: u32,
    pub ultimates: u32,
    pub effects_started: u32,
    pub effects_refreshed: u32,
    pub effects_ended: u32,
    pub shots_fired: u32,
    pub kills: u32,
}

impl MatchEventCounts {
    fn record(&mut self, kind: MatchEventKind) {
        self.total = self.total.saturating_add(1);
        match kind {
            MatchEventKind::WaveStarted => {
                self.waves_started = self.waves_started.saturating_add(1)
            }
            MatchEventKind::GaugeReady => self.gauge_ready = self.gauge_ready.saturating_add(1),
            MatchEventKind::UltimateActivated => self.ultimates = self.ultimates.saturating_add(1),
            MatchEventKind::EffectStarted => {
                self.effects_started = self.effects_started.saturating_add(1)
            }
            MatchEventKind::EffectRefreshed => {
                self.effects_refreshed = self.effects_refreshed.saturating_add(1)
            }
            MatchEventKind::EffectEnded => {
                self.effects_ended = self.effects_ended.saturating_add(1)
            }
            MatchEventKind::ShotFired => self.shots_fired = self.shots_fired.saturating_add(1),
            MatchEventKind::KillRegistered => self.kills = self.kills.saturating_add(1),
            MatchEventKind::MatchStarted | MatchEventKind::MatchEnded => {}
        }
    }
}

/// Per-match event queue, drained by the host once per frame. Owned by the
/// match session and cleared when a match starts.
#[derive(Debug, Default)]
pub struct MatchEventBus {
    pending: Vec<MatchEvent>,
    lifetime_counts: MatchEventCounts,
}

impl MatchEventBus {
    pub fn emit(&mut self, event: MatchEvent) {
        self.lifetime_counts.record(event.kind());
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[MatchEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Counts since the last `reset`, including already drained events.
    pub fn lifetime_counts(&self) -> MatchEventCounts {
        self.lifetime_counts
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.lifetime_counts = MatchEventCounts::default();
    }
}
