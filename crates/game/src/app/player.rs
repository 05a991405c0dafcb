use engine::{PlayerActor, Vec2};
use tracing::debug;

pub(crate) const PLAYER_MAX_HEALTH: u32 = 100;
pub(crate) const MAGAZINE_SIZE: u32 = 12;
pub(crate) const RELOAD_SECONDS: f64 = 1.5;
const BASE_MOVE_SPEED_UNITS_PER_SECOND: f32 = 120.0;

/// One trigger pull. With shotgun mode active a volley carries several
/// pellets fanned across the spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Volley {
    pub(crate) direction: Vec2,
    pub(crate) pellets: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ShotgunMode {
    projectile_count: u32,
    spread_degrees: f32,
}

/// Headless stand-in for the on-screen player: health, a magazine with
/// reload, and the buffable attributes the effect scheduler toggles.
#[derive(Debug)]
pub(crate) struct DemoPlayer {
    position: Vec2,
    health: u32,
    ammo: u32,
    reload_remaining: Option<f64>,
    speed_multiplier: f32,
    invincible: bool,
    shotgun: Option<ShotgunMode>,
    pending_volleys: Vec<Volley>,
}

impl DemoPlayer {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            health: PLAYER_MAX_HEALTH,
            ammo: MAGAZINE_SIZE,
            reload_remaining: None,
            speed_multiplier: 1.0,
            invincible: false,
            shotgun: None,
            pending_volleys: Vec::new(),
        }
    }

    pub(crate) fn health(&self) -> u32 {
        self.health
    }

    pub(crate) fn ammo(&self) -> u32 {
        self.ammo
    }

    pub(crate) fn is_reloading(&self) -> bool {
        self.reload_remaining.is_some()
    }

    pub(crate) fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub(crate) fn is_down(&self) -> bool {
        self.health == 0
    }

    /// Counts down an in-progress reload.
    pub(crate) fn tick(&mut self, dt_seconds: f64) {
        if let Some(remaining) = self.reload_remaining {
            let remaining = remaining - dt_seconds;
            if remaining <= 0.0 {
                self.reload_remaining = None;
                self.ammo = MAGAZINE_SIZE;
                debug!(ammo = self.ammo, "reload_finished");
            } else {
                self.reload_remaining = Some(remaining);
            }
        }
    }

    pub(crate) fn walk(&mut self, direction: Vec2, dt_seconds: f64) {
        let distance = BASE_MOVE_SPEED_UNITS_PER_SECOND * self.speed_multiplier * dt_seconds as f32;
        self.position = self.position.add(direction.scale(distance));
    }

    /// Returns the damage actually taken; invincibility absorbs all of it.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        if self.invincible {
            return 0;
        }
        let taken = amount.min(self.health);
        self.health -= taken;
        taken
    }

    pub(crate) fn drain_volleys(&mut self) -> Vec<Volley> {
        std::mem::take(&mut self.pending_volleys)
    }
}

impl PlayerActor for DemoPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn can_fire(&self) -> bool {
        self.ammo > 0 && self.reload_remaining.is_none()
    }

    fn consume_ammo(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
        if self.ammo == 0 && self.reload_remaining.is_none() {
            self.reload_remaining = Some(RELOAD_SECONDS);
            debug!("reload_started");
        }
    }

    fn fire(&mut self, direction: Vec2) {
        let pellets = self.shotgun.map_or(1, |mode| mode.projectile_count.max(1));
        if let Some(mode) = self.shotgun {
            debug!(
                pellets,
                spread_degrees = mode.spread_degrees,
                "shotgun_volley"
            );
        }
        self.pending_volleys.push(Volley { direction, pellets });
    }

    fn apply_speed_boost(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    fn remove_speed_boost(&mut self) {
        self.speed_multiplier = 1.0;
    }

    fn enable_invincibility(&mut self) {
        self.invincible = true;
    }

    fn disable_invincibility(&mut self) {
        self.invincible = false;
    }

    fn enable_shotgun_mode(&mut self, projectile_count: u32, spread_degrees: f32) {
        self.shotgun = Some(ShotgunMode {
            projectile_count,
            spread_degrees,
        });
    }

    fn disable_shotgun_mode(&mut self) {
        self.shotgun = None;
    }

    fn restore_health(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(PLAYER_MAX_HEALTH);
    }

    /// Tops up the magazine and cancels a pending reload.
    fn restore_ammo(&mut self, amount: u32) {
        self.ammo = self.ammo.saturating_add(amount).min(MAGAZINE_SIZE);
        if self.ammo > 0 {
            self.reload_remaining = None;
        }
    }
}
