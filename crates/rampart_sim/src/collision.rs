use rampart_shared::grid::TileGrid;
use rampart_shared::tuning::Tuning;

use crate::actor::{Actor, Motion};
use crate::EDGE_EPSILON;

fn any_solid_in_rows(grid: &TileGrid, col: i32, rows: std::ops::RangeInclusive<i32>) -> bool {
    rows.into_iter().any(|row| grid.is_solid(col, row))
}

fn any_solid_in_cols(grid: &TileGrid, cols: std::ops::RangeInclusive<i32>, row: i32) -> bool {
    cols.into_iter().any(|col| grid.is_solid(col, row))
}

/// Clamps a requested horizontal position against the columns the leading
/// edge would newly enter.
///
/// The direction of travel picks which edge leads; every column between the
/// current and the requested leading column is checked across the rows the
/// box overlaps, and the nearest solid one stops the move flush against its
/// boundary. A single step can cross more than one boundary, so this is a
/// sweep, not a single-column test. The result is wrapped into
/// `[0, world_width)` to bound float drift over long sessions.
pub fn resolve_horizontal(grid: &TileGrid, tuning: &Tuning, actor: &Actor, requested_x: f32) -> f32 {
    let cell = tuning.cell_size;
    let mut next = requested_x;
    let rows = actor.row_span(cell);

    if next > actor.x {
        let from_col = ((actor.x + actor.size.x - EDGE_EPSILON) / cell).floor() as i32;
        let to_col = ((next + actor.size.x - EDGE_EPSILON) / cell).floor() as i32;
        for col in (from_col + 1)..=to_col {
            if any_solid_in_rows(grid, col, rows.clone()) {
                next = col as f32 * cell - actor.size.x;
                break;
            }
        }
    } else if next < actor.x {
        let from_col = (actor.x / cell).floor() as i32;
        let to_col = (next / cell).floor() as i32;
        for col in (to_col..from_col).rev() {
            if any_solid_in_rows(grid, col, rows.clone()) {
                next = (col + 1) as f32 * cell;
                break;
            }
        }
    }

    let world_width = grid.width() as f32 * cell;
    ((next % world_width) + world_width) % world_width
}

/// One fixed integration step of airborne motion (semi-implicit Euler).
/// Returns true when the actor landed during this step.
///
/// Both the ascent and the descent sweep every row boundary crossed within
/// the step, so a fast actor cannot tunnel through a single-row ceiling or
/// floor.
pub fn step_vertical(grid: &TileGrid, tuning: &Tuning, actor: &mut Actor, dt: f32) -> bool {
    let Motion::Airborne { velocity } = actor.motion else {
        return false;
    };
    let cell = tuning.cell_size;

    let prev_bottom = actor.bottom;
    let mut v = velocity + tuning.gravity * dt;
    actor.bottom += v * dt;

    let cols = actor.col_span(cell);

    if v > 0.0 {
        // Ceiling: the first (lowest) crossed row with a solid cell stops us.
        let prev_top = prev_bottom + actor.size.y;
        let now_top = actor.bottom + actor.size.y;
        let start_row = (prev_top / cell).floor() as i32;
        let end_row = (now_top / cell).floor() as i32;
        for row in (start_row + 1)..=end_row {
            if any_solid_in_cols(grid, cols.clone(), row) {
                actor.bottom = row as f32 * cell - actor.size.y;
                v = 0.0;
                break;
            }
        }

        // A block placed directly overhead since last step can leave the top
        // already penetrating without any boundary crossing.
        let top_row_now = ((actor.bottom + actor.size.y - EDGE_EPSILON) / cell).floor() as i32;
        if any_solid_in_cols(grid, cols.clone(), top_row_now) {
            actor.bottom = top_row_now as f32 * cell - actor.size.y;
            v = 0.0;
        }
    }

    if v <= 0.0 {
        // Landing: of all surfaces crossed between the previous and the new
        // bottom, the topmost one wins. Only an actual boundary crossing
        // counts; without one, an actor sitting on a row edge with partial
        // support would re-land on the row it just stepped off and hover.
        let start_row = ((prev_bottom - EDGE_EPSILON) / cell).floor() as i32;
        let end_row = (actor.bottom / cell).floor() as i32;
        if end_row < start_row {
            let mut landing_top: Option<f32> = None;
            let mut row = start_row;
            while row >= end_row.max(0) {
                if any_solid_in_cols(grid, cols.clone(), row) {
                    let top = (row + 1) as f32 * cell;
                    if prev_bottom >= top && actor.bottom <= top {
                        landing_top = Some(landing_top.map_or(top, |best: f32| best.max(top)));
                    }
                }
                row -= 1;
            }
            if let Some(top) = landing_top {
                actor.bottom = top;
                actor.motion = Motion::Grounded;
                return true;
            }
        }
        if actor.bottom <= 0.0 {
            actor.bottom = 0.0;
            actor.motion = Motion::Grounded;
            return true;
        }
    }

    actor.motion = Motion::Airborne { velocity: v };
    false
}

/// True when the actor stands on something: bottom exactly at the world
/// floor, or a solid cell immediately beneath the box in every overlapped
/// column.
pub fn supported(grid: &TileGrid, tuning: &Tuning, actor: &Actor) -> bool {
    if actor.bottom <= 0.0 {
        return true;
    }
    let cell = tuning.cell_size;
    let row_under = ((actor.bottom - EDGE_EPSILON) / cell).floor() as i32;
    if row_under < 0 {
        return false;
    }
    actor.col_span(cell).into_iter().all(|col| grid.is_solid(col, row_under))
}

/// Re-enters airborne state with zero velocity when support was lost, which
/// is what makes walking off an edge fall without an explicit jump.
pub fn update_support(grid: &TileGrid, tuning: &Tuning, actor: &mut Actor) {
    if !actor.is_airborne() && !supported(grid, tuning, actor) {
        actor.motion = Motion::Airborne { velocity: 0.0 };
    }
}

/// Launches a grounded actor; airborne actors cannot double-jump.
pub fn jump(tuning: &Tuning, actor: &mut Actor) -> bool {
    if actor.is_airborne() {
        return false;
    }
    actor.motion = Motion::Airborne { velocity: tuning.jump_velocity };
    true
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use rampart_shared::grid::TileGrid;
    use rampart_shared::tuning::Tuning;

    use super::{jump, resolve_horizontal, step_vertical, supported, update_support};
    use crate::actor::{Actor, Motion};

    fn tuning() -> Tuning {
        Tuning::default()
    }

    fn actor_at(x: f32, bottom: f32) -> Actor {
        Actor::new(x, bottom, Vec2::new(30.0, 45.0))
    }

    #[test]
    fn moving_right_clamps_flush_to_a_wall() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        // Wall occupying columns 6..=8 from the floor up.
        grid.place_block(6, 0, 3, 3, 30).expect("wall");

        let actor = actor_at(55.0, 0.0);
        let resolved = resolve_horizontal(&grid, &t, &actor, 62.0);

        // Right edge must sit exactly on column 6's left boundary (x=90).
        assert_eq!(resolved, 6.0 * 15.0 - 30.0);
        let clamped = Actor { x: resolved, ..actor };
        assert!(!clamped.col_span(t.cell_size).contains(&6));
    }

    #[test]
    fn moving_left_clamps_to_the_right_boundary() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(2, 0, 3, 3, 30).expect("wall");

        let actor = actor_at(90.0, 0.0);
        let resolved = resolve_horizontal(&grid, &t, &actor, 70.0);
        assert_eq!(resolved, 5.0 * 15.0);
    }

    #[test]
    fn a_step_crossing_two_boundaries_stops_at_the_first_wall() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(9, 0, 3, 3, 30).expect("wall");

        // A 16-unit step on 15-unit cells moves the leading edge from
        // column 8 straight past 9 into 10; the sweep must catch column 9.
        let actor = actor_at(105.0, 0.0);
        let resolved = resolve_horizontal(&grid, &t, &actor, 121.0);
        assert_eq!(resolved, 9.0 * 15.0 - 30.0);
    }

    #[test]
    fn unobstructed_motion_passes_through() {
        let t = tuning();
        let grid = TileGrid::new(40, 20, 30);
        let actor = actor_at(30.0, 0.0);
        assert_eq!(resolve_horizontal(&grid, &t, &actor, 95.0), 95.0);
    }

    #[test]
    fn requests_past_world_width_wrap_identically() {
        let t = tuning();
        let grid = TileGrid::new(40, 20, 30);
        let world = 40.0 * 15.0;

        let actor = actor_at(10.0, 0.0);
        let direct = resolve_horizontal(&grid, &t, &actor, 25.0);
        let wrapped = resolve_horizontal(&grid, &t, &actor, world + 25.0);
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn ballistic_jump_lands_back_on_the_ground() {
        let t = tuning();
        let grid = TileGrid::new(40, 60, 30);
        let mut actor = actor_at(0.0, 0.0);
        assert!(jump(&t, &mut actor));
        assert!(!jump(&t, &mut actor), "no double jump");

        let dt = t.tick_seconds();
        let mut peak = 0.0f32;
        let mut landings = 0;
        for _ in 0..200 {
            if step_vertical(&grid, &t, &mut actor, dt) {
                landings += 1;
            }
            peak = peak.max(actor.bottom);
            if !actor.is_airborne() {
                break;
            }
        }

        assert_eq!(landings, 1);
        assert_eq!(actor.bottom, 0.0);
        assert!(!actor.is_airborne());
        assert!(peak > 100.0, "jump should gain real height, got {peak}");
    }

    #[test]
    fn landing_rests_exactly_on_the_surface() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(0, 0, 3, 3, 30).expect("floor block");

        // Falling from high above the 3-cell-tall block.
        let mut actor = actor_at(0.0, 300.0);
        actor.motion = Motion::Airborne { velocity: 0.0 };
        let dt = t.tick_seconds();
        for _ in 0..400 {
            if step_vertical(&grid, &t, &mut actor, dt) {
                break;
            }
        }

        assert!(!actor.is_airborne());
        assert_eq!(actor.bottom, 3.0 * 15.0);
    }

    #[test]
    fn fast_fall_cannot_tunnel_through_a_thin_platform() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 40, 30);
        grid.place_block(0, 6, 3, 3, 30).expect("platform");

        // One step at this velocity drops ~160 units, far more than a cell.
        let mut actor = actor_at(0.0, 400.0);
        actor.motion = Motion::Airborne { velocity: -10_000.0 };
        let dt = t.tick_seconds();
        let mut landed = false;
        for _ in 0..50 {
            if step_vertical(&grid, &t, &mut actor, dt) {
                landed = true;
                break;
            }
        }

        assert!(landed);
        assert_eq!(actor.bottom, 9.0 * 15.0, "lands on the platform, not the floor");
    }

    #[test]
    fn ascent_sweeps_all_crossed_rows_for_a_ceiling() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 40, 30);
        grid.place_block(0, 9, 3, 3, 30).expect("ceiling");

        let mut actor = actor_at(0.0, 0.0);
        actor.motion = Motion::Airborne { velocity: 8_000.0 };
        let dt = t.tick_seconds();
        step_vertical(&grid, &t, &mut actor, dt);

        // Top clamped to the ceiling's bottom boundary (row 9 at y=135).
        assert_eq!(actor.bottom + actor.size.y, 9.0 * 15.0);
        assert_eq!(actor.motion, Motion::Airborne { velocity: 0.0 });
    }

    #[test]
    fn block_appearing_overhead_is_resolved_by_the_overlap_check() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 40, 30);

        // Top sits exactly on row 5's bottom boundary; the block arrives there
        // while the actor is still rising, so no boundary is crossed.
        let mut actor = actor_at(0.0, 30.0);
        actor.motion = Motion::Airborne { velocity: 500.0 };
        grid.place_block(0, 5, 3, 3, 30).expect("overhead block");

        step_vertical(&grid, &t, &mut actor, t.tick_seconds());
        assert!(actor.bottom + actor.size.y <= 5.0 * 15.0 + super::EDGE_EPSILON);
        assert_eq!(actor.motion, Motion::Airborne { velocity: 0.0 });
    }

    #[test]
    fn losing_support_reenters_airborne_with_zero_velocity() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(0, 0, 3, 3, 30).expect("ledge");

        let mut actor = actor_at(0.0, 45.0);
        assert!(supported(&grid, &t, &actor));
        update_support(&grid, &t, &mut actor);
        assert!(!actor.is_airborne());

        // Step fully past the ledge: nothing beneath either column.
        actor.x = 90.0;
        assert!(!supported(&grid, &t, &actor));
        update_support(&grid, &t, &mut actor);
        assert_eq!(actor.motion, Motion::Airborne { velocity: 0.0 });
    }

    #[test]
    fn half_overhang_counts_as_unsupported() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(0, 0, 3, 3, 30).expect("ledge");

        // Left column still over the ledge, right column over the void.
        let actor = actor_at(30.0, 45.0);
        assert!(!supported(&grid, &t, &actor));
    }

    #[test]
    fn a_half_supported_actor_falls_instead_of_relanding() {
        let t = tuning();
        let mut grid = TileGrid::new(40, 20, 30);
        grid.place_block(0, 0, 3, 3, 30).expect("ledge");

        // Start on the ledge top with the right column over the void and
        // drive the same airborne/support alternation the world tick does.
        // The fall must not re-land on the boundary it starts on.
        let mut actor = actor_at(30.0, 45.0);
        let dt = t.tick_seconds();
        for _ in 0..120 {
            if actor.is_airborne() {
                step_vertical(&grid, &t, &mut actor, dt);
            } else {
                update_support(&grid, &t, &mut actor);
            }
        }

        assert_eq!(actor.bottom, 0.0, "half support must not hold the actor up");
        assert!(!actor.is_airborne());
    }

    #[test]
    fn the_world_floor_always_supports() {
        let t = tuning();
        let grid = TileGrid::new(40, 20, 30);
        let actor = actor_at(123.0, 0.0);
        assert!(supported(&grid, &t, &actor));
    }
}
