/// Render-side mirror of the other player. Position reports are quantized
/// to cells on the wire, so the mirror keeps a target and eases toward it
/// instead of teleporting every frame.
#[derive(Debug, Clone, Default)]
pub struct RemotePeer {
    pub x: f32,
    pub bottom: f32,
    target_x: f32,
    target_bottom: f32,
    pub facing_right: bool,
    pub character: Option<String>,
    has_pos: bool,
}

impl RemotePeer {
    pub fn new() -> Self {
        Self {
            facing_right: true,
            ..Self::default()
        }
    }

    pub fn has_pos(&self) -> bool {
        self.has_pos
    }

    /// Ingests a quantized position report. The first report snaps the
    /// mirror onto the target so a freshly joined peer does not glide in
    /// from the origin.
    pub fn apply_pos(&mut self, col: i32, row: i32, facing_right: bool, cell: f32) {
        self.target_x = col as f32 * cell;
        self.target_bottom = row as f32 * cell;
        self.facing_right = facing_right;
        if !self.has_pos {
            self.x = self.target_x;
            self.bottom = self.target_bottom;
            self.has_pos = true;
        }
    }

    /// One smoothing step toward the latest target. Horizontal easing takes
    /// the short way around the wrapped world so a peer crossing the seam
    /// does not sweep across the whole map.
    pub fn smooth(&mut self, world_width: f32, alpha: f32) {
        if !self.has_pos {
            return;
        }
        let mut dx = self.target_x - self.x;
        if dx > world_width / 2.0 {
            dx -= world_width;
        } else if dx < -world_width / 2.0 {
            dx += world_width;
        }
        self.x = (self.x + dx * alpha).rem_euclid(world_width);
        self.bottom += (self.target_bottom - self.bottom) * alpha;
    }
}
