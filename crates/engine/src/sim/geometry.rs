use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn scale(self, factor: f32) -> Vec2 {
        Vec2 {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        other.sub(self).length_sq()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len_sq = self.length_sq();
        if len_sq > 0.0 && len_sq.is_finite() {
            Some(self.scale(len_sq.sqrt().recip()))
        } else {
            None
        }
    }
}

/// Axis-aligned view rectangle centered on the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl ViewRect {
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            half_extents: Vec2 {
                x: width.abs() * 0.5,
                y: height.abs() * 0.5,
            },
        }
    }

    /// Edges are inclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extents.x
            && (point.y - self.center.y).abs() <= self.half_extents.y
    }
}
