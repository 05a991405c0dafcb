use super::geometry::{Vec2, ViewRect};
use super::ports::{PlayerActor, RosterEntity};

/// Aim used when a target sits exactly on the player.
const FALLBACK_AIM: Vec2 = Vec2 { x: 1.0, y: 0.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireDecision {
    /// Nothing on screen; the fire timer is left untouched.
    NoTarget,
    CoolingDown { target_id: u64 },
    WeaponNotReady { target_id: u64 },
    Fired { target_id: u64, direction: Vec2 },
}

/// Nearest on-screen enemy by Euclidean distance. Ties go to the entity that
/// appears first in `roster`.
pub fn select_nearest_visible(
    player_position: Vec2,
    view: &ViewRect,
    roster: &[RosterEntity],
) -> Option<RosterEntity> {
    let mut best: Option<(RosterEntity, f32)> = None;
    for entity in roster.iter().filter(|entity| view.contains(entity.position)) {
        let distance_sq = player_position.distance_sq(entity.position);
        match best {
            Some((_, best_distance_sq)) if distance_sq >= best_distance_sq => {}
            _ => best = Some((*entity, distance_sq)),
        }
    }
    best.map(|(entity, _)| entity)
}

pub fn aim_direction(from: Vec2, to: Vec2) -> Vec2 {
    to.sub(from).normalized().unwrap_or(FALLBACK_AIM)
}

/// Rate-limited automatic fire. Decides when and toward what to shoot; the
/// player owns the weapon and its firing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AutoFire {
    last_shot_at: Option<f64>,
}

impl AutoFire {
    pub fn last_shot_at(&self) -> Option<f64> {
        self.last_shot_at
    }

    pub fn reset(&mut self) {
        self.last_shot_at = None;
    }

    pub fn tick(
        &mut self,
        now_seconds: f64,
        fire_interval_seconds: f64,
        view: &ViewRect,
        roster: &[RosterEntity],
        player: &mut dyn PlayerActor,
    ) -> FireDecision {
        let player_position = player.position();
        let Some(target) = select_nearest_visible(player_position, view, roster) else {
            return FireDecision::NoTarget;
        };

        let interval_elapsed = self
            .last_shot_at
            .map_or(true, |last| now_seconds - last >= fire_interval_seconds);
        if !interval_elapsed {
            return FireDecision::CoolingDown {
                target_id: target.id,
            };
        }
        if !player.can_fire() {
            return FireDecision::WeaponNotReady {
                target_id: target.id,
            };
        }

        let direction = aim_direction(player_position, target.position);
        player.fire(direction);
        player.consume_ammo();
        self.last_shot_at = Some(now_seconds);
        FireDecision::Fired {
            target_id: target.id,
            direction,
        }
    }
}
