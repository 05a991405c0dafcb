use tracing::{debug, info};

use super::clock::{FrameAdvance, MatchClock, MatchState, MatchStatistics};
use super::difficulty::{DifficultyCalculator, WaveMultipliers};
use super::effects::{ApplyOutcome, EffectKind, EffectScheduler};
use super::events::{MatchEvent, MatchEventBus, MatchEventCounts};
use super::gauge::UltimateGauge;
use super::geometry::ViewRect;
use super::ports::{EnemyRoster, PlayerActor};
use super::snapshot::{ActiveEffectView, MatchSnapshot, MatchSnapshotHandle};
use super::targeting::{AutoFire, FireDecision};
use crate::config::MatchConfig;
use crate::score::PersonalRecord;

/// Everything one match owns. Built per match by the host and driven from a
/// single frame stream; nothing here is global.
pub struct MatchSession {
    config: MatchConfig,
    calculator: DifficultyCalculator,
    clock: MatchClock,
    gauge: UltimateGauge,
    effects: EffectScheduler,
    auto_fire: AutoFire,
    events: MatchEventBus,
    snapshot: Option<MatchSnapshotHandle>,
    last_fire_decision: Option<FireDecision>,
}

impl MatchSession {
    pub fn new(config: MatchConfig) -> Self {
        let calculator = DifficultyCalculator::new(config.difficulty);
        Self {
            clock: MatchClock::new(config.clock, calculator),
            effects: EffectScheduler::new(config.effects.clone()),
            calculator,
            config,
            gauge: UltimateGauge::default(),
            auto_fire: AutoFire::default(),
            events: MatchEventBus::default(),
            snapshot: None,
            last_fire_decision: None,
        }
    }

    pub fn with_snapshot_handle(mut self, handle: MatchSnapshotHandle) -> Self {
        self.snapshot = Some(handle);
        self.publish_snapshot();
        self
    }

    pub fn state(&self) -> MatchState {
        self.clock.state()
    }

    pub fn statistics(&self) -> &MatchStatistics {
        self.clock.statistics()
    }

    pub fn gauge(&self) -> &UltimateGauge {
        &self.gauge
    }

    pub fn effects(&self) -> &EffectScheduler {
        &self.effects
    }

    pub fn current_multipliers(&self) -> WaveMultipliers {
        self.calculator.multipliers(self.statistics().current_wave)
    }

    pub fn current_fire_interval_seconds(&self) -> f64 {
        self.calculator.fire_interval_seconds(self.statistics().current_wave)
    }

    pub fn last_fire_decision(&self) -> Option<FireDecision> {
        self.last_fire_decision
    }

    /// Starts a fresh match. Effects left over from a previous match are
    /// removed from the player before anything new can be applied.
    pub fn start(&mut self, now: f64, player: &mut dyn PlayerActor) {
        let leftover = self.effects.remove_all(player, &mut self.events);
        if leftover > 0 {
            debug!(leftover, "previous_match_effects_removed");
        }
        self.events.reset();
        self.gauge.reset();
        self.auto_fire.reset();
        self.last_fire_decision = None;
        self.clock.start(now);
        self.events.emit(MatchEvent::MatchStarted);
        info!(now, "match_started");
        self.publish_snapshot();
    }

    pub fn pause(&mut self, now: f64) -> bool {
        let paused = self.clock.pause(now);
        if paused {
            info!(play_time_seconds = self.clock.play_time_seconds(), "match_paused");
            self.publish_snapshot();
        }
        paused
    }

    pub fn resume(&mut self, now: f64) -> bool {
        let resumed = self.clock.resume(now);
        if resumed {
            info!(play_time_seconds = self.clock.play_time_seconds(), "match_resumed");
            self.publish_snapshot();
        }
        resumed
    }

    pub fn set_backgrounded(&mut self, backgrounded: bool, now: f64) {
        if self.clock.is_backgrounded() == backgrounded {
            return;
        }
        self.clock.set_backgrounded(backgrounded, now);
        debug!(backgrounded, "app_background_changed");
    }

    /// Runs one frame: advance the clock, announce new waves, expire effects,
    /// then auto-fire. Does nothing unless the match is playing.
    pub fn advance(
        &mut self,
        now: f64,
        player: &mut dyn PlayerActor,
        enemies: &dyn EnemyRoster,
        view: &ViewRect,
    ) -> Option<FrameAdvance> {
        let frame = self.clock.advance(now)?;

        for wave in frame.started_waves() {
            info!(wave, play_time_seconds = frame.play_time_seconds, "wave_started");
            self.events.emit(MatchEvent::WaveStarted { wave });
        }

        self.effects.expire_due(frame.play_time_seconds, player, &mut self.events);

        let roster = enemies.current_enemy_roster();
        let decision = self.auto_fire.tick(
            frame.play_time_seconds,
            self.calculator.fire_interval_seconds(frame.current_wave),
            view,
            &roster,
            player,
        );
        if let FireDecision::Fired {
            target_id,
            direction,
        } = decision
        {
            self.events.emit(MatchEvent::ShotFired {
                target_id,
                direction,
            });
        }
        self.last_fire_decision = Some(decision);

        self.publish_snapshot();
        Some(frame)
    }

    /// Counts a kill toward score and charges the gauge.
    pub fn register_kill(&mut self) -> bool {
        if self.state() != MatchState::Playing {
            debug!(state = self.state().as_token(), "kill_ignored");
            return false;
        }
        self.clock.add_kill(self.config.scoring.points_per_kill);
        let stats = *self.clock.statistics();
        self.events.emit(MatchEvent::KillRegistered {
            kills: stats.kills,
            score: stats.score,
        });
        self.charge_gauge();
        true
    }

    /// A combat event that is not a kill, such as a landed hit.
    pub fn register_hit(&mut self) -> bool {
        if self.state() != MatchState::Playing {
            return false;
        }
        self.charge_gauge();
        true
    }

    pub fn pick_up(&mut self, kind: EffectKind, player: &mut dyn PlayerActor) -> ApplyOutcome {
        if self.state() != MatchState::Playing {
            debug!(effect = kind.as_token(), "pickup_ignored");
            return ApplyOutcome::Ignored;
        }
        let now = self.clock.play_time_seconds();
        self.effects.apply(kind, now, player, &mut self.events)
    }

    pub fn pick_up_token(&mut self, token: &str, player: &mut dyn PlayerActor) -> ApplyOutcome {
        if self.state() != MatchState::Playing {
            debug!(token, "pickup_ignored");
            return ApplyOutcome::Ignored;
        }
        let now = self.clock.play_time_seconds();
        self.effects.apply_token(token, now, player, &mut self.events)
    }

    /// Fires the ultimate when the gauge is full; a no-op otherwise.
    pub fn activate_ultimate<F: FnOnce()>(&mut self, ability: F) -> bool {
        if self.state() != MatchState::Playing {
            return false;
        }
        let activated = self.gauge.activate(ability);
        if activated {
            info!(play_time_seconds = self.clock.play_time_seconds(), "ultimate_activated");
            self.events.emit(MatchEvent::UltimateActivated);
        }
        activated
    }

    /// Ends the match, tearing down every active effect, and returns the
    /// record to persist. `None` if the match was not running.
    pub fn end(&mut self, player: &mut dyn PlayerActor) -> Option<PersonalRecord> {
        if !self.clock.end() {
            return None;
        }
        self.effects.remove_all(player, &mut self.events);

        let stats = *self.clock.statistics();
        self.events.emit(MatchEvent::MatchEnded {
            play_time_seconds: stats.play_time_seconds,
            kills: stats.kills,
        });
        info!(
            play_time_seconds = stats.play_time_seconds,
            kills = stats.kills,
            score = stats.score,
            wave = stats.current_wave,
            "match_ended"
        );
        self.publish_snapshot();
        Some(PersonalRecord::from_statistics(&stats))
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.events.drain()
    }

    pub fn event_counts(&self) -> MatchEventCounts {
        self.events.lifetime_counts()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let now = self.clock.play_time_seconds();
        let wave = self.statistics().current_wave;
        MatchSnapshot {
            state: self.state(),
            statistics: *self.statistics(),
            gauge: self.gauge.value(),
            gauge_ready: self.gauge.is_ready(),
            multipliers: self.calculator.multipliers(wave),
            fire_interval_seconds: self.calculator.fire_interval_seconds(wave),
            active_effects: self
                .effects
                .active_effects()
                .map(|effect| ActiveEffectView {
                    kind: effect.kind,
                    remaining_seconds: effect.remaining_seconds(now),
                })
                .collect(),
        }
    }

    fn charge_gauge(&mut self) {
        if self.gauge.on_combat_event() {
            info!("gauge_ready");
            self.events.emit(MatchEvent::GaugeReady);
        }
    }

    fn publish_snapshot(&self) {
        if let Some(handle) = &self.snapshot {
            handle.publish(self.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ClockConfig;
    use crate::sim::events::MatchEventKind;
    use crate::sim::geometry::Vec2;
    use crate::sim::ports::RosterEntity;
    use crate::sim::test_support::RecordingPlayer;

    fn session() -> MatchSession {
        let mut config = MatchConfig::default();
        config.clock = ClockConfig {
            max_frame_delta_seconds: 1_000.0,
            ..ClockConfig::default()
        };
        MatchSession::new(config)
    }

    fn view() -> ViewRect {
        ViewRect::centered(Vec2::ZERO, 20.0, 12.0)
    }

    fn no_enemies() -> Vec<RosterEntity> {
        Vec::new()
    }

    fn kinds(events: &[MatchEvent]) -> Vec<MatchEventKind> {
        events.iter().map(|event| event.kind()).collect()
    }

    #[test]
    fn wave_events_fire_once_per_boundary() {
        let mut session = session();
        let mut player = RecordingPlayer::default();
        session.start(0.0, &mut player);
        session.drain_events();

        let mut waves = Vec::new();
        for now in [0.0, 10.0, 35.0, 65.0] {
            session.advance(now, &mut player, &no_enemies(), &view());
            waves.push(session.statistics().current_wave);
            let started = session
                .drain_events()
                .into_iter()
                .filter_map(|event| match event {
                    MatchEvent::WaveStarted { wave } => Some(wave),
                    _ => None,
                })
                .collect::<Vec<_>>();
            match now {
                n if n == 35.0 => assert_eq!(started, vec![2]),
                n if n == 65.0 => assert_eq!(started, vec![3]),
                _ => assert!(started.is_empty()),
            }
        }
        assert_eq!(waves, vec![1, 1, 2, 3]);
    }

    #[test]
    fn paused_session_ignores_frames_and_pickups() {
        let mut session = session();
        let mut player = RecordingPlayer::with_ammo(5);
        session.start(0.0, &mut player);
        session.pause(1.0);

        let roster = vec![RosterEntity {
            id: 1,
            position: Vec2::new(1.0, 0.0),
        }];
        assert!(session.advance(2.0, &mut player, &roster, &view()).is_none());
        assert_eq!(
            session.pick_up(EffectKind::SpeedBoost, &mut player),
            ApplyOutcome::Ignored
        );
        assert!(!session.register_kill());
        assert!(player.shots.is_empty());
    }

    #[test]
    fn effect_expiry_follows_play_time_not_wall_time() {
        let mut session = session();
        let mut player = RecordingPlayer::default();
        session.start(0.0, &mut player);
        session.advance(1.0, &mut player, &no_enemies(), &view());
        session.pick_up(EffectKind::SpeedBoost, &mut player);

        session.pause(2.0);
        session.resume(100.0);
        session.advance(103.0, &mut player, &no_enemies(), &view());
        assert_eq!(player.speed_boosts_removed, 0);

        session.advance(104.5, &mut player, &no_enemies(), &view());
        assert_eq!(player.speed_boosts_removed, 1);
    }

    #[test]
    fn auto_fire_uses_wave_fire_interval() {
        let mut session = session();
        let mut player = RecordingPlayer::with_ammo(100);
        session.start(0.0, &mut player);
        let roster = vec![RosterEntity {
            id: 9,
            position: Vec2::new(0.0, 3.0),
        }];
        assert_eq!(session.current_fire_interval_seconds(), 0.5);

        for frame in 0..=8 {
            session.advance(f64::from(frame) * 0.125, &mut player, &roster, &view());
        }
        // Shots at 0.0 and 0.5 and 1.0 with the wave-one interval of 0.5s.
        assert_eq!(player.shots.len(), 3);
        assert_eq!(player.shots[0], Vec2::new(0.0, 1.0));
        assert_eq!(session.event_counts().shots_fired, 3);
    }

    #[test]
    fn kills_charge_gauge_and_ultimate_resets_it() {
        let mut session = session();
        let mut player = RecordingPlayer::default();
        session.start(0.0, &mut player);
        for _ in 0..150 {
            session.register_kill();
        }
        assert_eq!(session.gauge().value(), 100);
        assert_eq!(session.statistics().kills, 150);
        assert_eq!(session.statistics().score, 15_000);
        assert_eq!(session.event_counts().gauge_ready, 1);

        let mut cleared = 0;
        assert!(session.activate_ultimate(|| cleared += 1));
        assert!(!session.activate_ultimate(|| cleared += 1));
        assert_eq!(cleared, 1);
        assert_eq!(session.gauge().value(), 0);
    }

    #[test]
    fn end_tears_down_effects_and_returns_record() {
        let mut session = session();
        let mut player = RecordingPlayer::default();
        session.start(0.0, &mut player);
        session.advance(125.4, &mut player, &no_enemies(), &view());
        for _ in 0..42 {
            session.register_kill();
        }
        session.pick_up(EffectKind::Invincibility, &mut player);
        session.pick_up(EffectKind::ShotgunMode, &mut player);

        let record = session.end(&mut player).expect("record");
        assert_eq!(record.encoded(), 8_192_042);
        assert_eq!(player.invincibility_disabled, 1);
        assert_eq!(player.shotgun_disabled, 1);
        assert!(session.end(&mut player).is_none());

        let events = session.drain_events();
        assert_eq!(kinds(&events).last(), Some(&MatchEventKind::MatchEnded));
    }

    #[test]
    fn restart_cancels_previous_effects_before_new_match() {
        let mut session = session();
        let mut player = RecordingPlayer::default();
        session.start(0.0, &mut player);
        session.pick_up(EffectKind::SpeedBoost, &mut player);

        session.start(50.0, &mut player);
        assert_eq!(player.speed_boosts_removed, 1);
        assert_eq!(session.effects().active_count(), 0);
        assert_eq!(session.drain_events(), vec![MatchEvent::MatchStarted]);

        session.advance(60.0, &mut player, &no_enemies(), &view());
        assert_eq!(player.speed_boosts_removed, 1);
    }

    #[test]
    fn snapshot_handle_tracks_frames() {
        let handle = MatchSnapshotHandle::default();
        let mut session = session().with_snapshot_handle(handle.clone());
        let mut player = RecordingPlayer::default();
        assert_eq!(handle.snapshot().state, MatchState::Loading);

        session.start(0.0, &mut player);
        session.pick_up(EffectKind::ShotgunMode, &mut player);
        session.advance(2.0, &mut player, &no_enemies(), &view());

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.state, MatchState::Playing);
        assert_eq!(snapshot.statistics.play_time_seconds, 2.0);
        assert_eq!(snapshot.active_effects.len(), 1);
        assert_eq!(snapshot.active_effects[0].remaining_seconds, 6.0);
    }
}
