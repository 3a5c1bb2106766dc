use rustc_hash::FxHashMap;

/// Footprint edge length of a standard block, in cells.
pub const BLOCK_SPAN: i32 = 3;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

/// A rectangular destructible solid anchored at its bottom-left cell.
/// The anchor column is always stored pre-wrapped into `[0, width)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub col: i32,
    pub row: i32,
    pub w: i32,
    pub h: i32,
    pub health: i32,
    pub max_health: i32,
}

/// Tile map with horizontal wrap. Columns wrap modulo `width`, rows do not.
///
/// Blocks live in an id-keyed arena; a dense occupancy index maps each cell
/// to the id of the block covering it. All lookups go through the id so that
/// removal can never leave a dangling reference.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    occ: Vec<Option<BlockId>>,
    blocks: FxHashMap<BlockId, Block>,
    next_id: u32,
    max_health: i32,
}

impl TileGrid {
    pub fn new(width: i32, height: i32, max_health: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            occ: vec![None; (width * height) as usize],
            blocks: FxHashMap::default(),
            next_id: 1,
            max_health,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn wrap_col(&self, col: i32) -> i32 {
        ((col % self.width) + self.width) % self.width
    }

    pub fn in_rows(&self, row: i32) -> bool {
        row >= 0 && row < self.height
    }

    fn idx(&self, col: i32, row: i32) -> usize {
        (row * self.width + self.wrap_col(col)) as usize
    }

    pub fn is_solid(&self, col: i32, row: i32) -> bool {
        self.in_rows(row) && self.occ[self.idx(col, row)].is_some()
    }

    pub fn block_at(&self, col: i32, row: i32) -> Option<&Block> {
        if !self.in_rows(row) {
            return None;
        }
        let id = self.occ[self.idx(col, row)]?;
        self.blocks.get(&id)
    }

    /// Remaining health of the block covering the cell, or 0 when empty.
    pub fn health_at(&self, col: i32, row: i32) -> i32 {
        self.block_at(col, row).map_or(0, |b| b.health)
    }

    /// Places a block covering `w * h` cells anchored at `(col, row)`.
    ///
    /// The whole footprint is validated before any cell is written, so a
    /// failed placement leaves the grid untouched. Covered columns wrap
    /// individually, which lets a block straddle the horizontal seam.
    pub fn place_block(&mut self, col: i32, row: i32, w: i32, h: i32, health: i32) -> Option<BlockId> {
        if w <= 0 || h <= 0 {
            return None;
        }
        if !self.in_rows(row) || !self.in_rows(row + h - 1) {
            return None;
        }
        let anchor = self.wrap_col(col);
        for dx in 0..w {
            for dy in 0..h {
                if self.occ[self.idx(anchor + dx, row + dy)].is_some() {
                    return None;
                }
            }
        }

        let id = BlockId(self.next_id);
        self.next_id += 1;
        let health = health.clamp(0, self.max_health);
        self.blocks.insert(
            id,
            Block {
                id,
                col: anchor,
                row,
                w,
                h,
                health,
                max_health: self.max_health,
            },
        );
        for dx in 0..w {
            for dy in 0..h {
                let cell = self.idx(anchor + dx, row + dy);
                self.occ[cell] = Some(id);
            }
        }
        Some(id)
    }

    /// Places a standard full-health block at the anchor.
    pub fn place_footprint(&mut self, col: i32, row: i32) -> Option<BlockId> {
        let health = self.max_health;
        self.place_block(col, row, BLOCK_SPAN, BLOCK_SPAN, health)
    }

    /// Clears every cell the block covered. Unknown ids are a no-op.
    pub fn remove_block(&mut self, id: BlockId) {
        let Some(block) = self.blocks.remove(&id) else {
            return;
        };
        for dx in 0..block.w {
            for dy in 0..block.h {
                let cell = self.idx(block.col + dx, block.row + dy);
                self.occ[cell] = None;
            }
        }
    }

    /// Removes whichever block covers the cell, if any.
    pub fn remove_at(&mut self, col: i32, row: i32) {
        if !self.in_rows(row) {
            return;
        }
        if let Some(id) = self.occ[self.idx(col, row)] {
            self.remove_block(id);
        }
    }

    /// Subtracts `amount` from the block covering the cell, clamped at 0.
    /// A block that reaches 0 is removed in the same call; returns the
    /// remaining health, or 0 when the cell was empty.
    pub fn damage(&mut self, col: i32, row: i32, amount: i32) -> i32 {
        if !self.in_rows(row) {
            return 0;
        }
        let Some(id) = self.occ[self.idx(col, row)] else {
            return 0;
        };
        let Some(block) = self.blocks.get_mut(&id) else {
            return 0;
        };
        block.health = (block.health - amount).max(0);
        let remaining = block.health;
        if remaining == 0 {
            self.remove_block(id);
        }
        remaining
    }

    /// Applies a remote-authoritative absolute health value to the block
    /// covering the cell. Clamped to `[0, max_health]`; 0 removes the block.
    /// Idempotent, so replayed messages are harmless.
    pub fn set_health(&mut self, col: i32, row: i32, value: i32) {
        if !self.in_rows(row) {
            return;
        }
        let Some(id) = self.occ[self.idx(col, row)] else {
            return;
        };
        let Some(block) = self.blocks.get_mut(&id) else {
            return;
        };
        block.health = value.clamp(0, block.max_health);
        if block.health == 0 {
            self.remove_block(id);
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Id-ordered copies of every live block, for read-only consumers.
    pub fn snapshot(&self) -> Vec<Block> {
        let mut out: Vec<Block> = self.blocks.values().cloned().collect();
        out.sort_by_key(|b| b.id);
        out
    }
}

/// The default arena: a ground band with a gap, stair stacks, floating
/// platforms and a bridge, all built from standard 3x3 blocks.
pub fn starter_map(max_health: i32) -> TileGrid {
    let width = 64 * BLOCK_SPAN;
    let height = 18 * BLOCK_SPAN;
    let mut grid = TileGrid::new(width, height, max_health);

    // Ground band, leaving a gap under the bridge at 36..39.
    for col in (0..width).step_by(BLOCK_SPAN as usize) {
        if (36 * BLOCK_SPAN..39 * BLOCK_SPAN).contains(&col) {
            continue;
        }
        grid.place_footprint(col, 0);
    }

    // Left staircase stack.
    grid.place_footprint(10 * BLOCK_SPAN, BLOCK_SPAN);
    grid.place_footprint(10 * BLOCK_SPAN, 2 * BLOCK_SPAN);
    grid.place_footprint(10 * BLOCK_SPAN, 3 * BLOCK_SPAN);

    // Floating platform.
    grid.place_footprint(18 * BLOCK_SPAN, 4 * BLOCK_SPAN);
    grid.place_footprint(19 * BLOCK_SPAN, 4 * BLOCK_SPAN);
    grid.place_footprint(20 * BLOCK_SPAN, 4 * BLOCK_SPAN);

    // Ascending steps.
    grid.place_footprint(26 * BLOCK_SPAN, BLOCK_SPAN);
    grid.place_footprint(27 * BLOCK_SPAN, 2 * BLOCK_SPAN);
    grid.place_footprint(28 * BLOCK_SPAN, 3 * BLOCK_SPAN);

    // Bridge over the ground gap.
    grid.place_footprint(36 * BLOCK_SPAN, 2 * BLOCK_SPAN);
    grid.place_footprint(37 * BLOCK_SPAN, 2 * BLOCK_SPAN);
    grid.place_footprint(38 * BLOCK_SPAN, 2 * BLOCK_SPAN);

    // Right wall.
    grid.place_footprint(46 * BLOCK_SPAN, BLOCK_SPAN);
    grid.place_footprint(46 * BLOCK_SPAN, 2 * BLOCK_SPAN);

    grid
}
