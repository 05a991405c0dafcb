use engine::EffectKind;

pub(crate) const DEFAULT_MATCH_SECONDS: f64 = 95.0;
pub(crate) const DEFAULT_CONTACT_DAMAGE: u32 = 10;

/// A wall-clock window during which the match is paused or backgrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Interruption {
    pub(crate) at_seconds: f64,
    pub(crate) duration_seconds: f64,
}

impl Interruption {
    pub(crate) fn is_active(&self, now: f64) -> bool {
        now >= self.at_seconds && now < self.at_seconds + self.duration_seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScriptedDrop {
    /// Play time, not wall time, so pauses delay drops.
    pub(crate) at_play_seconds: f64,
    pub(crate) effect: EffectKind,
}

/// Everything the headless run does that a real player would: how long to
/// play, when to pause or leave the app, which items show up.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MatchScript {
    pub(crate) match_seconds: f64,
    pub(crate) pause: Option<Interruption>,
    pub(crate) background: Option<Interruption>,
    pub(crate) drops: Vec<ScriptedDrop>,
    pub(crate) contact_damage: u32,
    pub(crate) view_width: f32,
    pub(crate) view_height: f32,
    pub(crate) status_log_interval_seconds: f64,
}

impl Default for MatchScript {
    fn default() -> Self {
        Self {
            match_seconds: DEFAULT_MATCH_SECONDS,
            pause: Some(Interruption {
                at_seconds: 20.0,
                duration_seconds: 3.0,
            }),
            background: Some(Interruption {
                at_seconds: 50.0,
                duration_seconds: 5.0,
            }),
            drops: vec![
                scripted_drop(8.0, EffectKind::SpeedBoost),
                scripted_drop(12.0, EffectKind::ShotgunMode),
                scripted_drop(15.0, EffectKind::ShotgunMode),
                scripted_drop(28.0, EffectKind::RestoreAmmo),
                scripted_drop(40.0, EffectKind::Invincibility),
                scripted_drop(44.0, EffectKind::RestoreHealth),
                scripted_drop(62.0, EffectKind::Invincibility),
                scripted_drop(75.0, EffectKind::RestoreHealth),
            ],
            contact_damage: DEFAULT_CONTACT_DAMAGE,
            view_width: 1280.0,
            view_height: 720.0,
            status_log_interval_seconds: 10.0,
        }
    }
}

impl MatchScript {
    pub(crate) fn with_match_seconds(mut self, match_seconds: f64) -> Self {
        self.match_seconds = match_seconds;
        self
    }

    /// Drops in the order they become due.
    pub(crate) fn sorted_drops(&self) -> Vec<ScriptedDrop> {
        let mut drops = self.drops.clone();
        drops.sort_by(|a, b| a.at_play_seconds.total_cmp(&b.at_play_seconds));
        drops
    }
}

pub(crate) fn scripted_drop(at_play_seconds: f64, effect: EffectKind) -> ScriptedDrop {
    ScriptedDrop {
        at_play_seconds,
        effect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interruption_window_is_half_open() {
        let window = Interruption {
            at_seconds: 2.0,
            duration_seconds: 1.0,
        };
        assert!(!window.is_active(1.99));
        assert!(window.is_active(2.0));
        assert!(window.is_active(2.5));
        assert!(!window.is_active(3.0));
    }

    #[test]
    fn drops_are_sorted_by_play_time() {
        let script = MatchScript {
            drops: vec![
                scripted_drop(5.0, EffectKind::RestoreAmmo),
                scripted_drop(1.0, EffectKind::SpeedBoost),
            ],
            ..MatchScript::default()
        };
        let order: Vec<EffectKind> = script.sorted_drops().iter().map(|d| d.effect).collect();
        assert_eq!(order, vec![EffectKind::SpeedBoost, EffectKind::RestoreAmmo]);
    }
}
