use serde::{Deserialize, Serialize};

pub const DEFAULT_WAVE_DURATION_SECONDS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub wave_duration_seconds: f64,
    pub speed_growth: f32,
    pub speed_cap: f32,
    pub health_growth: f32,
    pub health_cap: f32,
    pub count_growth: f32,
    pub base_fire_interval_seconds: f64,
    pub fire_interval_decrement_seconds: f64,
    pub min_fire_interval_seconds: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            wave_duration_seconds: DEFAULT_WAVE_DURATION_SECONDS,
            speed_growth: 1.1,
            speed_cap: 2.0,
            health_growth: 1.15,
            health_cap: 3.0,
            count_growth: 1.2,
            base_fire_interval_seconds: 0.5,
            fire_interval_decrement_seconds: 0.05,
            min_fire_interval_seconds: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveMultipliers {
    pub speed: f32,
    pub health: f32,
    /// Not capped here; spawn systems bound absolute entity counts themselves.
    pub count: f32,
}

/// Stateless wave tuning. Identical inputs always give identical outputs, so
/// spawn systems may call it independently of the match session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DifficultyCalculator {
    config: DifficultyConfig,
}

impl DifficultyCalculator {
    pub fn new(config: DifficultyConfig) -> Self {
        Self { config }
    }

    pub fn wave_for_play_time(&self, play_time_seconds: f64) -> u32 {
        let duration = self.config.wave_duration_seconds;
        if !(duration > 0.0) || !(play_time_seconds > 0.0) {
            return 1;
        }
        let completed = (play_time_seconds / duration).floor();
        if completed >= f64::from(u32::MAX - 1) {
            return u32::MAX;
        }
        completed as u32 + 1
    }

    pub fn multipliers(&self, wave: u32) -> WaveMultipliers {
        let wave = wave.max(1);
        let steps = exponent(wave - 1);
        WaveMultipliers {
            speed: self.config.speed_growth.powi(steps).min(self.config.speed_cap),
            health: self
                .config
                .health_growth
                .powi(steps)
                .min(self.config.health_cap),
            count: self.config.count_growth.powi(exponent(wave)),
        }
    }

    pub fn fire_interval_seconds(&self, wave: u32) -> f64 {
        let steps = f64::from(wave.max(1) - 1);
        let interval = self.config.base_fire_interval_seconds
            - steps * self.config.fire_interval_decrement_seconds;
        interval.max(self.config.min_fire_interval_seconds)
    }
}

fn exponent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
