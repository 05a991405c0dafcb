//! Narrow interfaces the match engine calls out through. Hosts implement
//! these for their actual player, spawn systems and presentation layer.

use super::effects::EffectKind;
use super::geometry::Vec2;

/// The player as seen by the engine. Buffable attributes (speed, firing mode,
/// invulnerability) are only ever changed through the effect scheduler.
pub trait PlayerActor {
    fn position(&self) -> Vec2;
    /// Ammo available and not reloading.
    fn can_fire(&self) -> bool;
    fn consume_ammo(&mut self);
    /// `direction` is a unit vector from the player toward the target.
    fn fire(&mut self, direction: Vec2);

    fn apply_speed_boost(&mut self, multiplier: f32);
    fn remove_speed_boost(&mut self);
    fn enable_invincibility(&mut self);
    fn disable_invincibility(&mut self);
    fn enable_shotgun_mode(&mut self, projectile_count: u32, spread_degrees: f32);
    fn disable_shotgun_mode(&mut self);
    fn restore_health(&mut self, amount: u32);
    fn restore_ammo(&mut self, amount: u32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterEntity {
    pub id: u64,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterItem {
    pub id: u64,
    pub position: Vec2,
    pub effect: EffectKind,
}

pub trait EnemyRoster {
    /// Live enemies in a stable iteration order; auto-fire tie-breaks on it.
    fn current_enemy_roster(&self) -> Vec<RosterEntity>;
}

pub trait ItemRoster {
    fn current_item_roster(&self) -> Vec<RosterItem>;
}

impl EnemyRoster for [RosterEntity] {
    fn current_enemy_roster(&self) -> Vec<RosterEntity> {
        self.to_vec()
    }
}

impl EnemyRoster for Vec<RosterEntity> {
    fn current_enemy_roster(&self) -> Vec<RosterEntity> {
        self.clone()
    }
}
