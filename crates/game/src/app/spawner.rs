use engine::{
    EffectKind, EnemyRoster, ItemRoster, RosterEntity, RosterItem, Vec2, ViewRect,
    WaveMultipliers,
};
use tracing::debug;

pub(crate) const MAX_LIVE_ENEMIES: usize = 40;
const BASE_ENEMIES_PER_SPAWN: f32 = 2.0;
const SPAWN_INTERVAL_SECONDS: f64 = 2.0;
const SPAWN_RING_RADIUS: f32 = 260.0;
const BASE_ENEMY_SPEED: f32 = 40.0;
const BASE_ENEMY_HEALTH: f32 = 2.0;
const CONTACT_RADIUS: f32 = 16.0;
const PICKUP_RADIUS: f32 = 32.0;
const GOLDEN_ANGLE_RADIANS: f32 = 2.399_963;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DemoEnemy {
    pub(crate) id: u64,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HitResult {
    Missed,
    Wounded,
    Killed,
}

/// Spawns enemies on a ring around the player, scaled by the current wave
/// multipliers. Placement is deterministic so scripted runs repeat exactly.
#[derive(Debug)]
pub(crate) struct DemoSpawner {
    enemies: Vec<DemoEnemy>,
    next_id: u64,
    since_last_spawn: f64,
    max_live: usize,
}

impl Default for DemoSpawner {
    fn default() -> Self {
        Self::new(MAX_LIVE_ENEMIES)
    }
}

impl DemoSpawner {
    pub(crate) fn new(max_live: usize) -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
            // Spawn on the first tick.
            since_last_spawn: SPAWN_INTERVAL_SECONDS,
            max_live,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.enemies.len()
    }

    #[cfg(test)]
    pub(crate) fn enemies(&self) -> &[DemoEnemy] {
        &self.enemies
    }

    /// Enemies a spawn pulse wants at `count` multiplier, before the live cap.
    pub(crate) fn batch_size(count_multiplier: f32) -> usize {
        let wanted = (BASE_ENEMIES_PER_SPAWN * count_multiplier).ceil();
        if wanted.is_finite() && wanted > 0.0 {
            (wanted as usize).min(MAX_LIVE_ENEMIES)
        } else if wanted.is_infinite() {
            MAX_LIVE_ENEMIES
        } else {
            0
        }
    }

    /// Moves enemies toward the player and spawns on the pulse. Returns how
    /// many enemies reached the player this tick; those are removed.
    pub(crate) fn tick(
        &mut self,
        dt_seconds: f64,
        player_position: Vec2,
        multipliers: WaveMultipliers,
    ) -> usize {
        self.since_last_spawn += dt_seconds;
        if self.since_last_spawn >= SPAWN_INTERVAL_SECONDS {
            self.since_last_spawn = 0.0;
            self.spawn_batch(player_position, multipliers);
        }

        let step = dt_seconds as f32;
        for enemy in &mut self.enemies {
            let to_player = player_position.sub(enemy.position);
            if let Some(direction) = to_player.normalized() {
                let travel = (enemy.speed * step).min(to_player.length());
                enemy.position = enemy.position.add(direction.scale(travel));
            }
        }

        let before = self.enemies.len();
        let contact_sq = CONTACT_RADIUS * CONTACT_RADIUS;
        self.enemies
            .retain(|enemy| enemy.position.distance_sq(player_position) > contact_sq);
        before - self.enemies.len()
    }

    pub(crate) fn damage(&mut self, id: u64, amount: f32) -> HitResult {
        let Some(index) = self.enemies.iter().position(|enemy| enemy.id == id) else {
            return HitResult::Missed;
        };
        let enemy = &mut self.enemies[index];
        enemy.health -= amount;
        if enemy.health <= 0.0 {
            self.enemies.remove(index);
            HitResult::Killed
        } else {
            HitResult::Wounded
        }
    }

    /// Removes every enemy inside `view`, returning how many were cleared.
    pub(crate) fn clear_within(&mut self, view: &ViewRect) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|enemy| !view.contains(enemy.position));
        before - self.enemies.len()
    }

    fn spawn_batch(&mut self, around: Vec2, multipliers: WaveMultipliers) {
        let room = self.max_live.saturating_sub(self.enemies.len());
        let batch = Self::batch_size(multipliers.count).min(room);
        for _ in 0..batch {
            let id = self.next_id;
            self.next_id += 1;
            let angle = GOLDEN_ANGLE_RADIANS * id as f32;
            let offset = Vec2::new(angle.cos(), angle.sin()).scale(SPAWN_RING_RADIUS);
            self.enemies.push(DemoEnemy {
                id,
                position: around.add(offset),
                health: BASE_ENEMY_HEALTH * multipliers.health,
                speed: BASE_ENEMY_SPEED * multipliers.speed,
            });
        }
        debug!(
            spawned = batch,
            live = self.enemies.len(),
            count_multiplier = multipliers.count,
            "enemies_spawned"
        );
    }
}

impl EnemyRoster for DemoSpawner {
    fn current_enemy_roster(&self) -> Vec<RosterEntity> {
        self.enemies
            .iter()
            .map(|enemy| RosterEntity {
                id: enemy.id,
                position: enemy.position,
            })
            .collect()
    }
}

/// Item drops lying on the field until the player walks over them.
#[derive(Debug, Default)]
pub(crate) struct ItemField {
    items: Vec<RosterItem>,
    next_id: u64,
}

impl ItemField {
    pub(crate) fn drop_item(&mut self, position: Vec2, effect: EffectKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(RosterItem {
            id,
            position,
            effect,
        });
        id
    }

    /// Removes and returns the items within reach of `player_position`.
    pub(crate) fn collect_near(&mut self, player_position: Vec2) -> Vec<RosterItem> {
        let reach_sq = PICKUP_RADIUS * PICKUP_RADIUS;
        let (collected, remaining) = self
            .items
            .drain(..)
            .partition(|item| item.position.distance_sq(player_position) <= reach_sq);
        self.items = remaining;
        collected
    }
}

impl ItemRoster for ItemField {
    fn current_item_roster(&self) -> Vec<RosterItem> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_multipliers() -> WaveMultipliers {
        WaveMultipliers {
            speed: 1.0,
            health: 1.0,
            count: 1.2,
        }
    }

    #[test]
    fn first_tick_spawns_a_scaled_batch_on_the_ring() {
        let mut spawner = DemoSpawner::default();
        spawner.tick(0.0, Vec2::ZERO, base_multipliers());

        assert_eq!(spawner.live_count(), 3);
        for enemy in spawner.enemies() {
            assert!((enemy.position.length() - SPAWN_RING_RADIUS).abs() < 1e-2);
            assert_eq!(enemy.health, BASE_ENEMY_HEALTH);
        }
    }

    #[test]
    fn live_enemies_never_exceed_cap() {
        let mut spawner = DemoSpawner::new(5);
        let huge = WaveMultipliers {
            speed: 0.0,
            health: 1.0,
            count: 1.0e9,
        };
        for _ in 0..10 {
            spawner.tick(SPAWN_INTERVAL_SECONDS, Vec2::ZERO, huge);
        }
        assert_eq!(spawner.live_count(), 5);
        assert_eq!(DemoSpawner::batch_size(f32::INFINITY), MAX_LIVE_ENEMIES);
        assert_eq!(DemoSpawner::batch_size(0.0), 0);
    }

    #[test]
    fn enemies_reaching_the_player_are_reported_as_contacts() {
        let mut spawner = DemoSpawner::default();
        spawner.tick(0.0, Vec2::ZERO, base_multipliers());
        let spawned = spawner.live_count();

        let travel_seconds = f64::from(SPAWN_RING_RADIUS / BASE_ENEMY_SPEED) + 0.1;
        let contacts = spawner.tick(travel_seconds, Vec2::ZERO, base_multipliers());
        // The long tick also spawns the next batch, which walks in as well.
        assert_eq!(contacts, spawned * 2);
        assert_eq!(spawner.live_count(), 0);
    }

    #[test]
    fn damage_kills_after_enough_hits() {
        let mut spawner = DemoSpawner::default();
        spawner.tick(0.0, Vec2::ZERO, base_multipliers());
        let id = spawner.enemies()[0].id;

        assert_eq!(spawner.damage(id, 1.0), HitResult::Wounded);
        assert_eq!(spawner.damage(id, 1.0), HitResult::Killed);
        assert_eq!(spawner.damage(id, 1.0), HitResult::Missed);
    }

    #[test]
    fn clear_within_only_touches_visible_enemies() {
        let mut spawner = DemoSpawner::default();
        spawner.tick(0.0, Vec2::ZERO, base_multipliers());
        let total = spawner.live_count();

        assert_eq!(spawner.clear_within(&ViewRect::centered(Vec2::ZERO, 10.0, 10.0)), 0);
        assert_eq!(
            spawner.clear_within(&ViewRect::centered(Vec2::ZERO, 600.0, 600.0)),
            total
        );
        assert!(spawner.current_enemy_roster().is_empty());
    }

    #[test]
    fn items_are_collected_only_within_reach() {
        let mut field = ItemField::default();
        field.drop_item(Vec2::new(10.0, 0.0), EffectKind::SpeedBoost);
        field.drop_item(Vec2::new(200.0, 0.0), EffectKind::RestoreAmmo);

        let collected = field.collect_near(Vec2::ZERO);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].effect, EffectKind::SpeedBoost);
        assert_eq!(field.current_item_roster().len(), 1);
    }
}
