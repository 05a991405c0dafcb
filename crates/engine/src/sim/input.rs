use serde::{Deserialize, Serialize};

use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    /// Drags at or below this length issue no movement.
    pub dead_zone: f32,
    /// Display radius for the thumb; feedback only.
    pub max_thumb_radius: f32,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            dead_zone: 8.0,
            max_thumb_radius: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoystickOutput {
    pub move_direction: Option<Vec2>,
    pub thumb_offset: Vec2,
}

pub fn translate_drag(start: Vec2, current: Vec2, config: &JoystickConfig) -> JoystickOutput {
    let drag = current.sub(start);
    let length = drag.length();

    let move_direction = if length > config.dead_zone {
        drag.normalized()
    } else {
        None
    };

    let max_radius = config.max_thumb_radius.max(0.0);
    let thumb_offset = if length > max_radius && length > 0.0 {
        drag.scale(max_radius / length)
    } else {
        drag
    };

    JoystickOutput {
        move_direction,
        thumb_offset,
    }
}

/// Tracks a single touch from press to release.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualJoystick {
    config: JoystickConfig,
    touch_start: Option<Vec2>,
    last_output: JoystickOutput,
}

impl VirtualJoystick {
    pub fn new(config: JoystickConfig) -> Self {
        Self {
            config,
            touch_start: None,
            last_output: JoystickOutput::default(),
        }
    }

    pub fn touch_began(&mut self, point: Vec2) {
        self.touch_start = Some(point);
        self.last_output = JoystickOutput::default();
    }

    /// Moves without a preceding `touch_began` are ignored.
    pub fn touch_moved(&mut self, point: Vec2) -> JoystickOutput {
        if let Some(start) = self.touch_start {
            self.last_output = translate_drag(start, point, &self.config);
        }
        self.last_output
    }

    pub fn touch_ended(&mut self) {
        self.touch_start = None;
        self.last_output = JoystickOutput::default();
    }

    pub fn output(&self) -> JoystickOutput {
        self.last_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_inside_dead_zone_issues_no_movement() {
        let output = translate_drag(
            Vec2::new(100.0, 100.0),
            Vec2::new(105.0, 103.0),
            &JoystickConfig::default(),
        );
        assert_eq!(output.move_direction, None);
        assert_eq!(output.thumb_offset, Vec2::new(5.0, 3.0));
    }

    #[test]
    fn drag_beyond_dead_zone_moves_along_unit_direction() {
        let output = translate_drag(Vec2::ZERO, Vec2::new(0.0, -20.0), &JoystickConfig::default());
        assert_eq!(output.move_direction, Some(Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn thumb_offset_is_clamped_to_radius() {
        let output = translate_drag(
            Vec2::ZERO,
            Vec2::new(300.0, 400.0),
            &JoystickConfig::default(),
        );
        assert!((output.thumb_offset.length() - 48.0).abs() < 1e-4);
        let direction = output.move_direction.expect("moving");
        assert!((direction.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn joystick_resets_on_release() {
        let mut joystick = VirtualJoystick::new(JoystickConfig::default());
        assert_eq!(joystick.touch_moved(Vec2::new(50.0, 0.0)).move_direction, None);

        joystick.touch_began(Vec2::new(10.0, 10.0));
        let output = joystick.touch_moved(Vec2::new(40.0, 10.0));
        assert_eq!(output.move_direction, Some(Vec2::new(1.0, 0.0)));

        joystick.touch_ended();
        assert_eq!(joystick.output(), JoystickOutput::default());
    }
}
