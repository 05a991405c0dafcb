use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::events::{MatchEvent, MatchEventBus};
use super::ports::PlayerActor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SpeedBoost,
    Invincibility,
    ShotgunMode,
    RestoreHealth,
    RestoreAmmo,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::SpeedBoost,
        EffectKind::Invincibility,
        EffectKind::ShotgunMode,
        EffectKind::RestoreHealth,
        EffectKind::RestoreAmmo,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::SpeedBoost => "speed_boost",
            Self::Invincibility => "invincibility",
            Self::ShotgunMode => "shotgun_mode",
            Self::RestoreHealth => "restore_health",
            Self::RestoreAmmo => "restore_ammo",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_token() == token.trim())
    }
}

/// What an effect does to the player, as an apply/remove pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectAction {
    SpeedBoost {
        multiplier: f32,
    },
    Invincibility,
    ShotgunMode {
        projectile_count: u32,
        spread_degrees: f32,
    },
    RestoreHealth {
        amount: u32,
    },
    RestoreAmmo {
        amount: u32,
    },
}

impl EffectAction {
    /// The kind whose player attribute this action drives.
    pub fn kind(self) -> EffectKind {
        match self {
            Self::SpeedBoost { .. } => EffectKind::SpeedBoost,
            Self::Invincibility => EffectKind::Invincibility,
            Self::ShotgunMode { .. } => EffectKind::ShotgunMode,
            Self::RestoreHealth { .. } => EffectKind::RestoreHealth,
            Self::RestoreAmmo { .. } => EffectKind::RestoreAmmo,
        }
    }

    fn apply(self, player: &mut dyn PlayerActor) {
        match self {
            Self::SpeedBoost { multiplier } => player.apply_speed_boost(multiplier),
            Self::Invincibility => player.enable_invincibility(),
            Self::ShotgunMode {
                projectile_count,
                spread_degrees,
            } => player.enable_shotgun_mode(projectile_count, spread_degrees),
            Self::RestoreHealth { amount } => player.restore_health(amount),
            Self::RestoreAmmo { amount } => player.restore_ammo(amount),
        }
    }

    fn remove(self, player: &mut dyn PlayerActor) {
        match self {
            Self::SpeedBoost { .. } => player.remove_speed_boost(),
            Self::Invincibility => player.disable_invincibility(),
            Self::ShotgunMode { .. } => player.disable_shotgun_mode(),
            Self::RestoreHealth { .. } | Self::RestoreAmmo { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub kind: EffectKind,
    /// Zero means instant: applied once, never expires.
    pub duration_seconds: f64,
    pub action: EffectAction,
}

impl EffectDefinition {
    pub fn is_instant(&self) -> bool {
        !(self.duration_seconds > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectCatalogue {
    definitions: Vec<EffectDefinition>,
}

impl Default for EffectCatalogue {
    fn default() -> Self {
        Self::new(vec![
            EffectDefinition {
                kind: EffectKind::SpeedBoost,
                duration_seconds: 5.0,
                action: EffectAction::SpeedBoost { multiplier: 1.5 },
            },
            EffectDefinition {
                kind: EffectKind::Invincibility,
                duration_seconds: 5.0,
                action: EffectAction::Invincibility,
            },
            EffectDefinition {
                kind: EffectKind::ShotgunMode,
                duration_seconds: 8.0,
                action: EffectAction::ShotgunMode {
                    projectile_count: 5,
                    spread_degrees: 30.0,
                },
            },
            EffectDefinition {
                kind: EffectKind::RestoreHealth,
                duration_seconds: 0.0,
                action: EffectAction::RestoreHealth { amount: 25 },
            },
            EffectDefinition {
                kind: EffectKind::RestoreAmmo,
                duration_seconds: 0.0,
                action: EffectAction::RestoreAmmo { amount: 30 },
            },
        ])
    }
}

impl EffectCatalogue {
    pub fn new(definitions: Vec<EffectDefinition>) -> Self {
        Self { definitions }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Later entries win when a kind is listed twice.
    pub fn get(&self, kind: EffectKind) -> Option<&EffectDefinition> {
        self.definitions.iter().rev().find(|def| def.kind == kind)
    }

    pub fn definitions(&self) -> &[EffectDefinition] {
        &self.definitions
    }
}

/// Opaque handle to one scheduled expiry. A refreshed effect gets a new token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpiryToken(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub duration_seconds: f64,
    pub expires_at_seconds: f64,
    pub token: ExpiryToken,
    action: EffectAction,
}

impl ActiveEffect {
    pub fn remaining_seconds(&self, now_seconds: f64) -> f64 {
        (self.expires_at_seconds - now_seconds).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyOutcome {
    /// The match was not playing; nothing was applied.
    Ignored,
    UnknownKind,
    Instant,
    Started(ExpiryToken),
    Refreshed(ExpiryToken),
}

/// Timed buffs on the player. Expiry is polled against match play time from
/// the frame stream, so no callback ever runs off the simulation thread and a
/// cancelled expiry simply no longer exists.
#[derive(Debug, Clone, Default)]
pub struct EffectScheduler {
    catalogue: EffectCatalogue,
    active: BTreeMap<EffectKind, ActiveEffect>,
    next_token: u64,
}

impl EffectScheduler {
    pub fn new(catalogue: EffectCatalogue) -> Self {
        Self {
            catalogue,
            active: BTreeMap::new(),
            next_token: 0,
        }
    }

    pub fn active(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.active.get(&kind)
    }

    pub fn active_effects(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn apply(
        &mut self,
        kind: EffectKind,
        now_seconds: f64,
        player: &mut dyn PlayerActor,
        events: &mut MatchEventBus,
    ) -> ApplyOutcome {
        let Some(definition) = self.catalogue.get(kind).copied() else {
            warn!(effect = kind.as_token(), "effect_definition_missing");
            return ApplyOutcome::UnknownKind;
        };
        if definition.action.kind() != kind {
            warn!(
                effect = kind.as_token(),
                action = definition.action.kind().as_token(),
                "effect_definition_mismatched"
            );
            return ApplyOutcome::UnknownKind;
        }

        definition.action.apply(player);

        if definition.is_instant() {
            debug!(effect = kind.as_token(), "instant_effect_applied");
            events.emit(MatchEvent::EffectStarted { kind });
            return ApplyOutcome::Instant;
        }

        let token = self.alloc_token();
        let replaced = self.active.insert(
            kind,
            ActiveEffect {
                kind,
                duration_seconds: definition.duration_seconds,
                expires_at_seconds: now_seconds + definition.duration_seconds,
                token,
                action: definition.action,
            },
        );

        if replaced.is_some() {
            debug!(
                effect = kind.as_token(),
                duration_seconds = definition.duration_seconds,
                "effect_refreshed"
            );
            events.emit(MatchEvent::EffectRefreshed { kind });
            ApplyOutcome::Refreshed(token)
        } else {
            debug!(
                effect = kind.as_token(),
                duration_seconds = definition.duration_seconds,
                "effect_started"
            );
            events.emit(MatchEvent::EffectStarted { kind });
            ApplyOutcome::Started(token)
        }
    }

    /// Item pickups carry a string token; unknown tokens are logged and ignored.
    pub fn apply_token(
        &mut self,
        token: &str,
        now_seconds: f64,
        player: &mut dyn PlayerActor,
        events: &mut MatchEventBus,
    ) -> ApplyOutcome {
        match EffectKind::from_token(token) {
            Some(kind) => self.apply(kind, now_seconds, player, events),
            None => {
                warn!(token, "effect_token_unknown");
                ApplyOutcome::UnknownKind
            }
        }
    }

    /// Removes every effect whose expiry is at or before `now_seconds`, in
    /// kind order. Returns the number removed.
    pub fn expire_due(
        &mut self,
        now_seconds: f64,
        player: &mut dyn PlayerActor,
        events: &mut MatchEventBus,
    ) -> usize {
        let due = self
            .active
            .values()
            .filter(|effect| effect.expires_at_seconds <= now_seconds)
            .map(|effect| effect.kind)
            .collect::<Vec<_>>();
        for kind in &due {
            self.finish(*kind, player, events);
        }
        due.len()
    }

    /// Cancels all pending expiries and runs each remove side effect once.
    pub fn remove_all(
        &mut self,
        player: &mut dyn PlayerActor,
        events: &mut MatchEventBus,
    ) -> usize {
        let kinds = self.active.keys().copied().collect::<Vec<_>>();
        for kind in &kinds {
            self.finish(*kind, player, events);
        }
        kinds.len()
    }

    fn finish(
        &mut self,
        kind: EffectKind,
        player: &mut dyn PlayerActor,
        events: &mut MatchEventBus,
    ) {
        if let Some(effect) = self.active.remove(&kind) {
            effect.action.remove(player);
            debug!(effect = kind.as_token(), "effect_ended");
            events.emit(MatchEvent::EffectEnded { kind });
        }
    }

    fn alloc_token(&mut self) -> ExpiryToken {
        let token = ExpiryToken(self.next_token);
        self.next_token = self.next_token.saturating_add(1);
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::RecordingPlayer;

    fn scheduler() -> (EffectScheduler, RecordingPlayer, MatchEventBus) {
        (
            EffectScheduler::new(EffectCatalogue::default()),
            RecordingPlayer::default(),
            MatchEventBus::default(),
        )
    }

    #[test]
    fn timed_effect_applies_then_expires_once() {
        let (mut effects, mut player, mut events) = scheduler();
        let outcome = effects.apply(EffectKind::SpeedBoost, 10.0, &mut player, &mut events);
        assert!(matches!(outcome, ApplyOutcome::Started(_)));
        assert_eq!(player.speed_boosts_applied, 1);

        assert_eq!(effects.expire_due(14.9, &mut player, &mut events), 0);
        assert_eq!(effects.expire_due(15.0, &mut player, &mut events), 1);
        assert_eq!(effects.expire_due(30.0, &mut player, &mut events), 0);
        assert_eq!(player.speed_boosts_removed, 1);
        assert!(effects.active(EffectKind::SpeedBoost).is_none());
    }

    #[test]
    fn reapplying_refreshes_instead_of_stacking() {
        let (mut effects, mut player, mut events) = scheduler();
        effects.apply(EffectKind::Invincibility, 0.0, &mut player, &mut events);
        let outcome = effects.apply(EffectKind::Invincibility, 1.0, &mut player, &mut events);

        assert!(matches!(outcome, ApplyOutcome::Refreshed(_)));
        assert_eq!(player.invincibility_enabled, 2);
        assert_eq!(effects.active_count(), 1);

        effects.expire_due(5.5, &mut player, &mut events);
        assert_eq!(player.invincibility_disabled, 0);

        effects.expire_due(6.0, &mut player, &mut events);
        assert_eq!(player.invincibility_disabled, 1);
        effects.expire_due(60.0, &mut player, &mut events);
        assert_eq!(player.invincibility_disabled, 1);
    }

    #[test]
    fn refresh_issues_a_new_token() {
        let (mut effects, mut player, mut events) = scheduler();
        let first = effects.apply(EffectKind::ShotgunMode, 0.0, &mut player, &mut events);
        let second = effects.apply(EffectKind::ShotgunMode, 0.5, &mut player, &mut events);
        let (ApplyOutcome::Started(first), ApplyOutcome::Refreshed(second)) = (first, second)
        else {
            panic!("unexpected outcomes {first:?} {second:?}");
        };
        assert_ne!(first, second);
        assert_eq!(
            effects.active(EffectKind::ShotgunMode).map(|effect| effect.token),
            Some(second)
        );
        assert_eq!(player.shotgun_enabled_with, vec![(5, 30.0), (5, 30.0)]);
    }

    #[test]
    fn instant_effect_never_schedules_expiry() {
        let (mut effects, mut player, mut events) = scheduler();
        let outcome = effects.apply(EffectKind::RestoreHealth, 0.0, &mut player, &mut events);
        assert_eq!(outcome, ApplyOutcome::Instant);
        assert_eq!(player.health_restored, 25);
        assert_eq!(effects.active_count(), 0);
        assert_eq!(effects.remove_all(&mut player, &mut events), 0);
    }

    #[test]
    fn remove_all_runs_each_remove_once() {
        let (mut effects, mut player, mut events) = scheduler();
        effects.apply(EffectKind::SpeedBoost, 0.0, &mut player, &mut events);
        effects.apply(EffectKind::ShotgunMode, 0.0, &mut player, &mut events);

        assert_eq!(effects.remove_all(&mut player, &mut events), 2);
        assert_eq!(player.speed_boosts_removed, 1);
        assert_eq!(player.shotgun_disabled, 1);

        assert_eq!(effects.expire_due(100.0, &mut player, &mut events), 0);
        assert_eq!(player.speed_boosts_removed, 1);
    }

    #[test]
    fn missing_definition_is_a_no_op() {
        let mut effects = EffectScheduler::new(EffectCatalogue::empty());
        let mut player = RecordingPlayer::default();
        let mut events = MatchEventBus::default();
        let outcome = effects.apply(EffectKind::SpeedBoost, 0.0, &mut player, &mut events);

        assert_eq!(outcome, ApplyOutcome::UnknownKind);
        assert_eq!(player, RecordingPlayer::default());
        assert!(events.pending().is_empty());
    }

    #[test]
    fn definition_driving_another_kind_is_refused() {
        let catalogue = EffectCatalogue::new(vec![
            EffectDefinition {
                kind: EffectKind::SpeedBoost,
                duration_seconds: 5.0,
                action: EffectAction::SpeedBoost { multiplier: 1.5 },
            },
            EffectDefinition {
                kind: EffectKind::ShotgunMode,
                duration_seconds: 2.0,
                action: EffectAction::SpeedBoost { multiplier: 3.0 },
            },
        ]);
        let mut effects = EffectScheduler::new(catalogue);
        let mut player = RecordingPlayer::default();
        let mut events = MatchEventBus::default();

        effects.apply(EffectKind::SpeedBoost, 0.0, &mut player, &mut events);
        let outcome = effects.apply(EffectKind::ShotgunMode, 0.0, &mut player, &mut events);
        assert_eq!(outcome, ApplyOutcome::UnknownKind);
        assert_eq!(player.speed_boosts_applied, 1);

        assert_eq!(effects.expire_due(2.0, &mut player, &mut events), 0);
        assert_eq!(player.speed_boosts_removed, 0);
        assert!(effects.active(EffectKind::SpeedBoost).is_some());
    }

    #[test]
    fn unknown_token_is_ignored() {
        let (mut effects, mut player, mut events) = scheduler();
        let outcome = effects.apply_token("double_damage", 0.0, &mut player, &mut events);
        assert_eq!(outcome, ApplyOutcome::UnknownKind);
        let outcome = effects.apply_token("restore_ammo", 0.0, &mut player, &mut events);
        assert_eq!(outcome, ApplyOutcome::Instant);
        assert_eq!(player.ammo_restored, 30);
    }

    #[test]
    fn apply_event_precedes_end_event() {
        let (mut effects, mut player, mut events) = scheduler();
        effects.apply(EffectKind::SpeedBoost, 0.0, &mut player, &mut events);
        effects.expire_due(5.0, &mut player, &mut events);
        assert_eq!(
            events.drain(),
            vec![
                MatchEvent::EffectStarted {
                    kind: EffectKind::SpeedBoost
                },
                MatchEvent::EffectEnded {
                    kind: EffectKind::SpeedBoost
                },
            ]
        );
    }

    #[test]
    fn catalogue_parses_tagged_actions() {
        let raw = serde_json::json!([
            {
                "kind": "speed_boost",
                "duration_seconds": 2.5,
                "action": { "type": "speed_boost", "multiplier": 2.0 }
            }
        ]);
        let catalogue: EffectCatalogue = serde_json::from_value(raw).expect("catalogue");
        let definition = catalogue.get(EffectKind::SpeedBoost).expect("definition");
        assert_eq!(definition.duration_seconds, 2.5);
        assert_eq!(
            definition.action,
            EffectAction::SpeedBoost { multiplier: 2.0 }
        );
        assert!(catalogue.get(EffectKind::Invincibility).is_none());
    }

    #[test]
    fn default_catalogue_actions_match_their_kinds() {
        for definition in EffectCatalogue::default().definitions() {
            assert_eq!(definition.action.kind(), definition.kind);
        }
    }
}
