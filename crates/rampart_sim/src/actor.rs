use std::ops::RangeInclusive;

use glam::Vec2;

use crate::EDGE_EPSILON;

/// Last look direction. Up/Down only steer hit/place targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn is_right(self) -> bool {
        self == Facing::Right
    }
}

/// Vertical motion state. `Airborne` hands vertical position to gravity
/// integration; `Grounded` pins it to the supporting surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Grounded,
    Airborne { velocity: f32 },
}

/// The locally simulated player. `x` wraps modulo the world width in
/// distance units; `bottom` is height above row 0 and never goes below it.
#[derive(Debug, Clone)]
pub struct Actor {
    pub x: f32,
    pub bottom: f32,
    pub size: Vec2,
    pub facing: Facing,
    pub motion: Motion,
}

impl Actor {
    pub fn new(x: f32, bottom: f32, size: Vec2) -> Self {
        Self {
            x,
            bottom,
            size,
            facing: Facing::Right,
            motion: Motion::Grounded,
        }
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.motion, Motion::Airborne { .. })
    }

    /// Columns the bounding box overlaps at the given horizontal position.
    pub fn col_span_at(&self, x: f32, cell: f32) -> RangeInclusive<i32> {
        let left = (x / cell).floor() as i32;
        let right = ((x + self.size.x - EDGE_EPSILON) / cell).floor() as i32;
        left..=right
    }

    pub fn col_span(&self, cell: f32) -> RangeInclusive<i32> {
        self.col_span_at(self.x, cell)
    }

    /// Rows the bounding box overlaps at the given bottom height.
    pub fn row_span_at(&self, bottom: f32, cell: f32) -> RangeInclusive<i32> {
        let low = (bottom / cell).floor() as i32;
        let high = ((bottom + self.size.y - EDGE_EPSILON) / cell).floor() as i32;
        low..=high
    }

    pub fn row_span(&self, cell: f32) -> RangeInclusive<i32> {
        self.row_span_at(self.bottom, cell)
    }
}
