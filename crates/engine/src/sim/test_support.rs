use super::geometry::Vec2;
use super::ports::PlayerActor;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RecordingPlayer {
    pub position: Vec2,
    pub ammo: u32,
    pub shots: Vec<Vec2>,
    pub speed_boosts_applied: u32,
    pub speed_boosts_removed: u32,
    pub invincibility_enabled: u32,
    pub invincibility_disabled: u32,
    pub shotgun_enabled_with: Vec<(u32, f32)>,
    pub shotgun_disabled: u32,
    pub health_restored: u32,
    pub ammo_restored: u32,
}

impl RecordingPlayer {
    pub fn with_ammo(ammo: u32) -> Self {
        Self {
            ammo,
            ..Self::default()
        }
    }
}

impl PlayerActor for RecordingPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn can_fire(&self) -> bool {
        self.ammo > 0
    }

    fn consume_ammo(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
    }

    fn fire(&mut self, direction: Vec2) {
        self.shots.push(direction);
    }

    fn apply_speed_boost(&mut self, _multiplier: f32) {
        self.speed_boosts_applied += 1;
    }

    fn remove_speed_boost(&mut self) {
        self.speed_boosts_removed += 1;
    }

    fn enable_invincibility(&mut self) {
        self.invincibility_enabled += 1;
    }

    fn disable_invincibility(&mut self) {
        self.invincibility_disabled += 1;
    }

    fn enable_shotgun_mode(&mut self, projectile_count: u32, spread_degrees: f32) {
        self.shotgun_enabled_with
            .push((projectile_count, spread_degrees));
    }

    fn disable_shotgun_mode(&mut self) {
        self.shotgun_disabled += 1;
    }

    fn restore_health(&mut self, amount: u32) {
        self.health_restored += amount;
    }

    fn restore_ammo(&mut self, amount: u32) {
        self.ammo_restored += amount;
    }
}
