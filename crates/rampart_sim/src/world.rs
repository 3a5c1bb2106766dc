use glam::Vec2;

use rampart_shared::grid::TileGrid;
use rampart_shared::tuning::Tuning;

use crate::action::{self, HitResult, PlaceResult};
use crate::actor::{Actor, Facing, Motion};
use crate::collision;
use crate::peer::RemotePeer;

/// One device's complete world model: the local grid, the locally simulated
/// actor, and the render mirror of the remote peer. World mutations flow
/// through the action entry points; the network layer decides which side is
/// allowed to call the mutating ones.
#[derive(Debug)]
pub struct Simulation {
    grid: TileGrid,
    actor: Actor,
    peer: RemotePeer,
    tuning: Tuning,
}

impl Simulation {
    /// Starts on the standard arena, dropping the actor in from above the
    /// terrain near the left edge.
    pub fn new(tuning: Tuning) -> Self {
        let grid = rampart_shared::grid::starter_map(tuning.block_health);
        Self::with_grid(grid, tuning)
    }

    pub fn with_grid(grid: TileGrid, tuning: Tuning) -> Self {
        let size = Vec2::new(tuning.actor_width, tuning.actor_height);
        let spawn_bottom = 9.0 * tuning.cell_size;
        let mut actor = Actor::new(2.0 * tuning.cell_size, spawn_bottom, size);
        actor.motion = Motion::Airborne { velocity: 0.0 };
        Self {
            grid,
            actor,
            peer: RemotePeer::new(),
            tuning,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn peer(&self) -> &RemotePeer {
        &self.peer
    }

    pub fn peer_mut(&mut self) -> &mut RemotePeer {
        &mut self.peer
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn world_width(&self) -> f32 {
        self.grid.width() as f32 * self.tuning.cell_size
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.actor.facing = facing;
    }

    /// One walk step left. Faces left, clamps against the grid, and rechecks
    /// support so stepping off a ledge starts a fall.
    pub fn move_left(&mut self) {
        self.actor.facing = Facing::Left;
        let requested = self.actor.x - self.tuning.walk_step;
        self.actor.x = collision::resolve_horizontal(&self.grid, &self.tuning, &self.actor, requested);
        collision::update_support(&self.grid, &self.tuning, &mut self.actor);
    }

    pub fn move_right(&mut self) {
        self.actor.facing = Facing::Right;
        let requested = self.actor.x + self.tuning.walk_step;
        self.actor.x = collision::resolve_horizontal(&self.grid, &self.tuning, &self.actor, requested);
        collision::update_support(&self.grid, &self.tuning, &mut self.actor);
    }

    /// Signed continuous displacement, for axis-driven locomotion. Facing
    /// is left to the caller, which knows the axis sign.
    pub fn walk(&mut self, step: f32) {
        if step == 0.0 {
            return;
        }
        let requested = self.actor.x + step;
        self.actor.x = collision::resolve_horizontal(&self.grid, &self.tuning, &self.actor, requested);
        collision::update_support(&self.grid, &self.tuning, &mut self.actor);
    }

    pub fn jump(&mut self) -> bool {
        collision::jump(&self.tuning, &mut self.actor)
    }

    /// Swings from the local actor's box and facing.
    pub fn hit(&mut self) -> Option<HitResult> {
        let Actor { x, bottom, size, facing, .. } = self.actor;
        action::swing(&mut self.grid, &self.tuning, x, bottom, size, facing)
    }

    pub fn place(&mut self) -> Option<PlaceResult> {
        let Actor { x, bottom, size, facing, .. } = self.actor;
        action::build(&mut self.grid, &self.tuning, x, bottom, size, facing)
    }

    /// Swings on behalf of the remote peer, targeting from its smoothed
    /// position with the standard box. Host-side use only. Inert until the
    /// peer has reported a position, so early input cannot act from the
    /// origin.
    pub fn hit_as_peer(&mut self, facing: Facing) -> Option<HitResult> {
        if !self.peer.has_pos() {
            return None;
        }
        let size = self.actor.size;
        let (x, bottom) = (self.peer.x, self.peer.bottom);
        action::swing(&mut self.grid, &self.tuning, x, bottom, size, facing)
    }

    pub fn place_as_peer(&mut self, facing: Facing) -> Option<PlaceResult> {
        if !self.peer.has_pos() {
            return None;
        }
        let size = self.actor.size;
        let (x, bottom) = (self.peer.x, self.peer.bottom);
        action::build(&mut self.grid, &self.tuning, x, bottom, size, facing)
    }

    /// One fixed step: gravity integration while airborne, support check
    /// while grounded, then peer smoothing. Returns true on landing.
    pub fn tick(&mut self, dt: f32) -> bool {
        let landed = if self.actor.is_airborne() {
            collision::step_vertical(&self.grid, &self.tuning, &mut self.actor, dt)
        } else {
            collision::update_support(&self.grid, &self.tuning, &mut self.actor);
            false
        };
        let width = self.world_width();
        self.peer.smooth(width, self.tuning.smoothing);
        landed
    }

    /// The grid-quantized tuple that goes on the wire: wrapped column, row,
    /// and whether the actor faces right.
    pub fn quantized_pos(&self) -> (i32, i32, bool) {
        let col = (self.actor.x / self.tuning.cell_size).floor() as i32;
        let row = (self.actor.bottom / self.tuning.cell_size).floor() as i32;
        (self.grid.wrap_col(col), row, self.actor.facing.is_right())
    }
}
