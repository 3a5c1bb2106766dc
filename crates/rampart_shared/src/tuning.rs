use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

const MIN_CELL_SIZE: f32 = 1.0;
const MIN_TICK_MS: u64 = 1;
const MAX_TICK_MS: u64 = 100;
const MIN_SMOOTHING: f32 = 0.01;
const MAX_SMOOTHING: f32 = 1.0;

/// Gameplay tuning values. These are arcade-feel constants, not derived
/// quantities, so they load from a TOML file with sane defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Edge length of one grid cell, in world units.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Actor bounding box, in world units (2x3 cells by default).
    #[serde(default = "default_actor_width")]
    pub actor_width: f32,
    #[serde(default = "default_actor_height")]
    pub actor_height: f32,
    /// Continuous locomotion speed, units per second.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    /// Discrete per-press step for button movement, in units.
    #[serde(default = "default_walk_step")]
    pub walk_step: f32,
    /// Vertical acceleration, units per second squared (negative = down).
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Initial upward velocity of a jump, units per second.
    #[serde(default = "default_jump_velocity")]
    pub jump_velocity: f32,
    /// Health removed per hit.
    #[serde(default = "default_hit_damage")]
    pub hit_damage: i32,
    /// Full health of a freshly placed block.
    #[serde(default = "default_block_health")]
    pub block_health: i32,
    /// Exponential smoothing factor for the remote actor (0..1, higher = snappier).
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Fixed simulation step, milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Repeat-fire interval while the hit button is held, milliseconds.
    #[serde(default = "default_hit_repeat_ms")]
    pub hit_repeat_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            actor_width: default_actor_width(),
            actor_height: default_actor_height(),
            walk_speed: default_walk_speed(),
            walk_step: default_walk_step(),
            gravity: default_gravity(),
            jump_velocity: default_jump_velocity(),
            hit_damage: default_hit_damage(),
            block_health: default_block_health(),
            smoothing: default_smoothing(),
            tick_ms: default_tick_ms(),
            hit_repeat_ms: default_hit_repeat_ms(),
        }
    }
}

impl Tuning {
    fn sanitize(mut self) -> Self {
        self.cell_size = self.cell_size.max(MIN_CELL_SIZE);
        self.actor_width = self.actor_width.max(1.0);
        self.actor_height = self.actor_height.max(1.0);
        self.walk_speed = self.walk_speed.max(0.0);
        self.walk_step = self.walk_step.max(0.0);
        self.gravity = self.gravity.min(-1.0);
        self.jump_velocity = self.jump_velocity.max(0.0);
        self.hit_damage = self.hit_damage.max(1);
        self.block_health = self.block_health.max(1);
        self.smoothing = self.smoothing.clamp(MIN_SMOOTHING, MAX_SMOOTHING);
        self.tick_ms = self.tick_ms.clamp(MIN_TICK_MS, MAX_TICK_MS);
        self.hit_repeat_ms = self.hit_repeat_ms.max(self.tick_ms);
        self
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let parsed = toml::from_str::<Self>(&contents).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to deserialize tuning: {e}"),
            )
        })?;
        Ok(parsed.sanitize())
    }

    /// Fixed simulation step as seconds, for integration.
    pub fn tick_seconds(&self) -> f32 {
        self.tick_ms as f32 / 1000.0
    }
}

fn default_cell_size() -> f32 {
    15.0
}

fn default_actor_width() -> f32 {
    30.0
}

fn default_actor_height() -> f32 {
    45.0
}

fn default_walk_speed() -> f32 {
    420.0
}

fn default_walk_step() -> f32 {
    16.0
}

fn default_gravity() -> f32 {
    -3000.0
}

fn default_jump_velocity() -> f32 {
    1000.0
}

fn default_hit_damage() -> i32 {
    10
}

fn default_block_health() -> i32 {
    30
}

fn default_smoothing() -> f32 {
    0.25
}

fn default_tick_ms() -> u64 {
    16
}

fn default_hit_repeat_ms() -> u64 {
    700
}
