mod clock;
mod difficulty;
mod effects;
mod events;
mod gauge;
mod geometry;
mod input;
mod ports;
mod session;
mod snapshot;
mod targeting;

#[cfg(test)]
pub(crate) mod test_support;

pub use clock::{
    ClockConfig, DeltaCorrection, FrameAdvance, MatchClock, MatchState, MatchStatistics,
    DEFAULT_FRAME_SECONDS, MAX_FRAME_DELTA_SECONDS,
};
pub use difficulty::{
    DifficultyCalculator, DifficultyConfig, WaveMultipliers, DEFAULT_WAVE_DURATION_SECONDS,
};
pub use effects::{
    ActiveEffect, ApplyOutcome, EffectAction, EffectCatalogue, EffectDefinition, EffectKind,
    EffectScheduler, ExpiryToken,
};
pub use events::{MatchEvent, MatchEventBus, MatchEventCounts, MatchEventKind};
pub use gauge::{UltimateGauge, GAUGE_MAX};
pub use geometry::{Vec2, ViewRect};
pub use input::{translate_drag, JoystickConfig, JoystickOutput, VirtualJoystick};
pub use ports::{EnemyRoster, ItemRoster, PlayerActor, RosterEntity, RosterItem};
pub use session::MatchSession;
pub use snapshot::{ActiveEffectView, MatchSnapshot, MatchSnapshotHandle};
pub use targeting::{aim_direction, select_nearest_visible, AutoFire, FireDecision};
