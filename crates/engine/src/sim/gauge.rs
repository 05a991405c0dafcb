pub const GAUGE_MAX: u32 = 100;
const GAUGE_PER_COMBAT_EVENT: u32 = 1;

/// Charge for the ultimate ability, bounded to `[0, GAUGE_MAX]`. Only combat
/// events raise it and only activation lowers it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UltimateGauge {
    value: u32,
}

impl UltimateGauge {
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_ready(&self) -> bool {
        self.value >= GAUGE_MAX
    }

    /// Returns `true` only on the call that fills the gauge.
    pub fn on_combat_event(&mut self) -> bool {
        if self.is_ready() {
            return false;
        }
        self.value = (self.value + GAUGE_PER_COMBAT_EVENT).min(GAUGE_MAX);
        self.is_ready()
    }

    /// Runs `ability` and empties the gauge when full; otherwise does nothing
    /// and returns `false`.
    pub fn activate<F: FnOnce()>(&mut self, ability: F) -> bool {
        if !self.is_ready() {
            return false;
        }
        ability();
        self.value = 0;
        true
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
