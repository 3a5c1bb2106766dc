use glam::Vec2;

use rampart_shared::grid::{TileGrid, BLOCK_SPAN};
use rampart_shared::tuning::Tuning;

use crate::actor::Facing;
use crate::EDGE_EPSILON;

/// Result of a landed hit, with everything the network layer needs to emit
/// the matching world delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    pub col: i32,
    pub row: i32,
    pub remaining: i32,
}

/// Result of a successful placement: the wrapped anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceResult {
    pub col: i32,
    pub row: i32,
}

/// Bounding-box geometry shared by both actions. Targets derive from the
/// box and facing only, never from a pointer or a peer-reported cell.
struct Footing {
    left_col: i32,
    right_col: i32,
    bottom_row: i32,
    top_row: i32,
    mid_row: i32,
    center_col: i32,
}

impl Footing {
    fn new(x: f32, bottom: f32, size: Vec2, cell: f32) -> Self {
        let left_col = (x / cell).floor() as i32;
        let right_col = ((x + size.x - EDGE_EPSILON) / cell).floor() as i32;
        let bottom_row = (bottom / cell).floor() as i32;
        let top_row = ((bottom + size.y - EDGE_EPSILON) / cell).floor() as i32;
        Self {
            left_col,
            right_col,
            bottom_row,
            top_row,
            mid_row: (bottom_row + top_row) / 2,
            center_col: ((x + size.x / 2.0) / cell).floor() as i32,
        }
    }

    fn cols(&self) -> std::ops::RangeInclusive<i32> {
        self.left_col..=self.right_col
    }

    fn rows(&self) -> std::ops::RangeInclusive<i32> {
        self.bottom_row..=self.top_row
    }
}

fn ranges_overlap(a: &std::ops::RangeInclusive<i32>, b: &std::ops::RangeInclusive<i32>) -> bool {
    a.start() <= b.end() && b.start() <= a.end()
}

/// Damages the single cell adjacent to the box in the facing direction:
/// past the left/right edge at the box's vertical midpoint, or past the
/// top/bottom at the horizontal center. Returns the struck block's anchor
/// (what goes on the wire) and its remaining health, or None when nothing
/// was there to hit.
pub fn swing(
    grid: &mut TileGrid,
    tuning: &Tuning,
    x: f32,
    bottom: f32,
    size: Vec2,
    facing: Facing,
) -> Option<HitResult> {
    let foot = Footing::new(x, bottom, size, tuning.cell_size);
    let (col, row) = match facing {
        Facing::Left => (foot.left_col - 1, foot.mid_row),
        Facing::Right => (foot.right_col + 1, foot.mid_row),
        Facing::Up => (foot.center_col, foot.top_row + 1),
        Facing::Down => (foot.center_col, foot.bottom_row - 1),
    };

    let (anchor_col, anchor_row) = match grid.block_at(col, row) {
        Some(block) => (block.col, block.row),
        None => return None,
    };
    let remaining = grid.damage(col, row, tuning.hit_damage);
    Some(HitResult {
        col: anchor_col,
        row: anchor_row,
        remaining,
    })
}

fn can_place_at(
    grid: &TileGrid,
    foot: &Footing,
    anchor_col: i32,
    anchor_row: i32,
) -> bool {
    if !grid.in_rows(anchor_row) || !grid.in_rows(anchor_row + BLOCK_SPAN - 1) {
        return false;
    }

    // Never bury the actor inside the new footprint.
    let place_cols = anchor_col..=(anchor_col + BLOCK_SPAN - 1);
    let place_rows = anchor_row..=(anchor_row + BLOCK_SPAN - 1);
    if ranges_overlap(&place_cols, &foot.cols()) && ranges_overlap(&place_rows, &foot.rows()) {
        return false;
    }

    for dx in 0..BLOCK_SPAN {
        for dy in 0..BLOCK_SPAN {
            if grid.is_solid(anchor_col + dx, anchor_row + dy) {
                return false;
            }
        }
    }
    true
}

/// Places a standard block directly against the box's face in the facing
/// direction. The footprint must actually touch that face and share a
/// row/column band with the box; anything overlapping, occupied, or out of
/// vertical bounds is rejected with no mutation.
pub fn build(
    grid: &mut TileGrid,
    tuning: &Tuning,
    x: f32,
    bottom: f32,
    size: Vec2,
    facing: Facing,
) -> Option<PlaceResult> {
    let foot = Footing::new(x, bottom, size, tuning.cell_size);

    let (anchor_col, anchor_row, touches) = match facing {
        Facing::Left => {
            let col = foot.left_col - BLOCK_SPAN;
            let row = foot.bottom_row;
            let touches = ranges_overlap(&(row..=row + BLOCK_SPAN - 1), &foot.rows());
            (col, row, touches)
        }
        Facing::Right => {
            let col = foot.right_col + 1;
            let row = foot.bottom_row;
            let touches = ranges_overlap(&(row..=row + BLOCK_SPAN - 1), &foot.rows());
            (col, row, touches)
        }
        Facing::Up => {
            let col = foot.center_col - 1;
            let row = foot.top_row + 1;
            let touches = ranges_overlap(&(col..=col + BLOCK_SPAN - 1), &foot.cols());
            (col, row, touches)
        }
        Facing::Down => {
            let col = foot.center_col - 1;
            let row = foot.bottom_row - BLOCK_SPAN;
            let touches = ranges_overlap(&(col..=col + BLOCK_SPAN - 1), &foot.cols());
            (col, row, touches)
        }
    };

    if !touches || !can_place_at(grid, &foot, anchor_col, anchor_row) {
        return None;
    }

    grid.place_footprint(anchor_col, anchor_row).map(|_| PlaceResult {
        col: grid.wrap_col(anchor_col),
        row: anchor_row,
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use rampart_shared::grid::TileGrid;
    use rampart_shared::tuning::Tuning;

    use super::{build, swing};
    use crate::actor::Facing;

    const SIZE: Vec2 = Vec2::new(30.0, 45.0);

    fn setup() -> (TileGrid, Tuning) {
        (TileGrid::new(40, 24, 30), Tuning::default())
    }

    #[test]
    fn swing_right_targets_the_column_past_the_edge() {
        let (mut grid, t) = setup();
        // Block in columns 6..=8; actor box covers columns 4..=5, rows 0..=2.
        grid.place_block(6, 0, 3, 3, 30).expect("target block");

        let hit = swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).expect("hit lands");
        assert_eq!((hit.col, hit.row), (6, 0), "anchor of the struck block");
        assert_eq!(hit.remaining, 20);
        assert_eq!(grid.health_at(6, 1), 20, "struck at the midpoint row");
    }

    #[test]
    fn swing_left_and_down_resolve_their_cells() {
        let (mut grid, t) = setup();
        grid.place_block(3, 3, 3, 3, 30).expect("left block");
        grid.place_block(6, 0, 3, 3, 30).expect("floor block");

        // Standing on the floor block, left neighbor in reach at (5, 4).
        let left = swing(&mut grid, &t, 90.0, 45.0, SIZE, Facing::Left).expect("left hit");
        assert_eq!((left.col, left.row), (3, 3));

        // Down digs into the block being stood on, at (7, 2).
        let down = swing(&mut grid, &t, 90.0, 45.0, SIZE, Facing::Down).expect("down hit");
        assert_eq!((down.col, down.row), (6, 0));
    }

    #[test]
    fn swing_up_targets_the_row_past_the_top() {
        let (mut grid, t) = setup();
        grid.place_block(3, 3, 3, 3, 30).expect("overhead block");

        let hit = swing(&mut grid, &t, 52.0, 0.0, SIZE, Facing::Up).expect("up hit");
        assert_eq!((hit.col, hit.row), (3, 3));
        assert_eq!(grid.health_at(4, 3), 20, "struck at the center column");
    }

    #[test]
    fn swing_into_empty_space_or_void_rows_is_none() {
        let (mut grid, t) = setup();
        assert!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).is_none());
        // Down from the floor points below row 0.
        assert!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Down).is_none());
    }

    #[test]
    fn repeated_swings_destroy_and_then_miss() {
        let (mut grid, t) = setup();
        grid.place_block(6, 0, 3, 3, 30).expect("target");

        assert_eq!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).unwrap().remaining, 20);
        assert_eq!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).unwrap().remaining, 10);
        assert_eq!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).unwrap().remaining, 0);
        assert!(!grid.is_solid(6, 0));
        assert!(swing(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).is_none());
    }

    #[test]
    fn build_right_lands_flush_against_the_box() {
        let (mut grid, t) = setup();
        // Box covers columns 4..=5, rows 0..=2.
        let placed = build(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).expect("placement");
        assert_eq!((placed.col, placed.row), (6, 0));
        assert!(grid.is_solid(6, 0));
        assert!(grid.is_solid(8, 2));
    }

    #[test]
    fn build_left_and_down_anchor_correctly() {
        let (mut grid, t) = setup();
        let left = build(&mut grid, &t, 60.0, 45.0, SIZE, Facing::Left).expect("left placement");
        assert_eq!((left.col, left.row), (1, 3));

        let down = build(&mut grid, &t, 60.0, 45.0, SIZE, Facing::Down).expect("down placement");
        // Center col 5, anchor col 4, footprint rows 0..=2 right under the feet.
        assert_eq!((down.col, down.row), (4, 0));
    }

    #[test]
    fn build_up_rests_on_the_head_row() {
        let (mut grid, t) = setup();
        let up = build(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Up).expect("up placement");
        assert_eq!((up.col, up.row), (4, 3));
    }

    #[test]
    fn build_rejects_occupied_overlapping_and_out_of_bounds() {
        let (mut grid, t) = setup();
        grid.place_block(6, 0, 3, 3, 30).expect("occupied region");
        assert!(build(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).is_none());

        // Down from the world floor would dip below row 0.
        assert!(build(&mut grid, &t, 150.0, 0.0, SIZE, Facing::Down).is_none());

        // Up near the world ceiling runs out of rows.
        let top = (grid.height() - 1) as f32 * t.cell_size;
        assert!(build(&mut grid, &t, 150.0, top, SIZE, Facing::Up).is_none());

        let before = grid.snapshot();
        assert!(build(&mut grid, &t, 60.0, 0.0, SIZE, Facing::Right).is_none());
        assert_eq!(grid.snapshot(), before, "failed placement mutates nothing");
    }

    #[test]
    fn build_footprints_wrap_across_the_seam() {
        let (mut grid, t) = setup();
        // Box near the right end of a 40-column world: columns 38..=39.
        let placed = build(&mut grid, &t, 38.0 * 15.0, 0.0, SIZE, Facing::Right).expect("seam");
        assert_eq!((placed.col, placed.row), (0, 0));
        assert!(grid.is_solid(0, 0) && grid.is_solid(1, 0) && grid.is_solid(2, 0));
    }
}
