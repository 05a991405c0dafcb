use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::warn;

use super::clock::{MatchState, MatchStatistics};
use super::difficulty::WaveMultipliers;
use super::effects::EffectKind;

static SNAPSHOT_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_snapshot_lock_poison_once(operation: &'static str) {
    if SNAPSHOT_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "match snapshot lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffectView {
    pub kind: EffectKind,
    pub remaining_seconds: f64,
}

/// What the presentation layer may read between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    pub state: MatchState,
    pub statistics: MatchStatistics,
    pub gauge: u32,
    pub gauge_ready: bool,
    pub multipliers: WaveMultipliers,
    pub fire_interval_seconds: f64,
    pub active_effects: Vec<ActiveEffectView>,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            state: MatchState::Loading,
            statistics: MatchStatistics::default(),
            gauge: 0,
            gauge_ready: false,
            multipliers: WaveMultipliers {
                speed: 1.0,
                health: 1.0,
                count: 1.0,
            },
            fire_interval_seconds: 0.0,
            active_effects: Vec::new(),
        }
    }
}

/// Shared read handle. Only the match session publishes; render threads read.
#[derive(Clone, Debug, Default)]
pub struct MatchSnapshotHandle {
    snapshot: Arc<RwLock<MatchSnapshot>>,
}

impl MatchSnapshotHandle {
    pub fn snapshot(&self) -> MatchSnapshot {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                warn_snapshot_lock_poison_once("read");
                poisoned.into_inner().clone()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: MatchSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_snapshot_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}
