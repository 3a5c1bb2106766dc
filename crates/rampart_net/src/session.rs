use tracing::{debug, info, warn};

use rampart_shared::protocol::{decode, InputFlags, Message, TileUpdate};
use rampart_shared::tuning::Tuning;
use rampart_sim::action::HitResult;
use rampart_sim::actor::Facing;
use rampart_sim::world::Simulation;

/// Which side of the link this session plays. Only the host may mutate the
/// world in response to peer intent; the client requests and follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Client,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Host => "host",
            Role::Client => "client",
        }
    }
}

/// Callbacks for the rendering/UI layer. All methods default to no-ops so
/// implementors pick only what they draw.
pub trait SessionObserver {
    fn on_connection_changed(&mut self, _connected: bool) {}
    fn on_peer_character(&mut self, _name: &str) {}
    fn on_peer_pos(&mut self, _x: f32, _bottom: f32, _facing_right: bool) {}
    fn on_world_changed(&mut self) {}
}

/// One peer's session: the local simulation plus the reconciliation policy
/// for everything that crosses the wire. Outgoing messages accumulate in an
/// outbox that the transport drains once per tick.
pub struct Session {
    role: Role,
    sim: Simulation,
    connected: bool,
    character: Option<String>,
    observer: Option<Box<dyn SessionObserver>>,
    outbox: Vec<Message>,
    last_sent_pos: Option<(i32, i32, bool)>,
    axis: f32,
    hit_held: bool,
    hit_cooldown: f32,
}

impl Session {
    pub fn new(role: Role, tuning: Tuning) -> Self {
        Self::with_sim(role, Simulation::new(tuning))
    }

    pub fn with_sim(role: Role, sim: Simulation) -> Self {
        Self {
            role,
            sim,
            connected: false,
            character: None,
            observer: None,
            outbox: Vec::new(),
            last_sent_pos: None,
            axis: 0.0,
            hit_held: false,
            hit_cooldown: 0.0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Swaps in the current observer, replaying cached connectivity, peer
    /// identity, and peer position so a freshly attached UI starts from the
    /// last-known state instead of a blank one.
    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        let mut observer = observer;
        observer.on_connection_changed(self.connected);
        if let Some(name) = self.sim.peer().character.clone() {
            observer.on_peer_character(&name);
        }
        if self.sim.peer().has_pos() {
            let peer = self.sim.peer();
            observer.on_peer_pos(peer.x, peer.bottom, peer.facing_right);
        }
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Connectivity transition from the transport. Idempotent; on a fresh
    /// connection the host greets, both sides re-announce their character,
    /// and the position dedupe resets so the peer gets a fresh `POS`.
    pub fn set_connected(&mut self, connected: bool) {
        if connected == self.connected {
            return;
        }
        self.connected = connected;
        info!("session {}: connected={connected}", self.role.as_str());

        if connected {
            if self.role == Role::Host {
                self.outbox.push(Message::Hello { role: self.role.as_str().to_string() });
            }
            if let Some(name) = self.character.clone() {
                self.outbox.push(Message::Char { name });
            }
            self.last_sent_pos = None;
        }

        if let Some(observer) = &mut self.observer {
            observer.on_connection_changed(connected);
        }
    }

    pub fn close(&mut self) {
        self.set_connected(false);
    }

    /// Announces the locally selected character; safe to call repeatedly.
    pub fn set_local_character(&mut self, name: &str) {
        if self.character.as_deref() == Some(name) {
            return;
        }
        self.character = Some(name.to_string());
        self.send(Message::Char { name: name.to_string() });
    }

    pub fn request_move_left(&mut self) {
        self.sim.move_left();
        if self.role == Role::Client {
            self.send(Message::Input(InputFlags::LEFT));
        }
    }

    pub fn request_move_right(&mut self) {
        self.sim.move_right();
        if self.role == Role::Client {
            self.send(Message::Input(InputFlags::RIGHT));
        }
    }

    pub fn request_jump(&mut self) {
        if self.sim.jump() && self.role == Role::Client {
            self.send(Message::Input(InputFlags::JUMP));
        }
    }

    /// One hit. The host swings locally and pushes the resulting world
    /// delta; the client only reports intent and waits for the delta.
    pub fn request_hit(&mut self) {
        match self.role {
            Role::Host => {
                if let Some(hit) = self.sim.hit() {
                    self.push_hit_delta(hit);
                }
            }
            Role::Client => {
                let flags = InputFlags::HIT | self.facing_bits();
                self.send(Message::Input(flags));
            }
        }
    }

    pub fn request_place(&mut self) {
        match self.role {
            Role::Host => {
                if let Some(placed) = self.sim.place() {
                    self.send(Message::Tile(TileUpdate::Place { col: placed.col, row: placed.row }));
                    self.notify_world_changed();
                }
            }
            Role::Client => {
                let flags = InputFlags::PLACE | self.facing_bits();
                self.send(Message::Input(flags));
            }
        }
    }

    /// Continuous locomotion input, -1.0..=1.0. Applied every tick; no
    /// per-tick wire traffic, the quantized `POS` stream covers it.
    pub fn set_axis(&mut self, axis: f32) {
        self.axis = axis.clamp(-1.0, 1.0);
    }

    /// Press-and-hold hit. Fires immediately, then repeats at the tuned
    /// interval until released.
    pub fn set_hit_held(&mut self, held: bool) {
        if held && !self.hit_held {
            self.request_hit();
            self.hit_cooldown = self.sim.tuning().hit_repeat_ms as f32 / 1000.0;
        }
        self.hit_held = held;
    }

    /// One raw frame off the wire. Malformed frames are logged and dropped
    /// without touching any state.
    pub fn handle_frame(&mut self, frame: &str) {
        match decode(frame) {
            Ok(msg) => self.handle_message(msg),
            Err(err) => warn!("dropping bad frame: {err}"),
        }
    }

    fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Hello { role } => {
                debug!("peer greeted as {role}");
            }
            Message::Input(flags) => self.handle_input(flags),
            Message::Pos { col, row, facing_right } => {
                let cell = self.sim.tuning().cell_size;
                self.sim.peer_mut().apply_pos(col, row, facing_right, cell);
                if let Some(observer) = &mut self.observer {
                    let peer = self.sim.peer();
                    observer.on_peer_pos(peer.x, peer.bottom, peer.facing_right);
                }
            }
            Message::Tile(update) => self.handle_tile(update),
            Message::Char { name } => {
                if self.sim.peer().character.as_deref() != Some(name.as_str()) {
                    self.sim.peer_mut().character = Some(name.clone());
                    if let Some(observer) = &mut self.observer {
                        observer.on_peer_character(&name);
                    }
                }
            }
        }
    }

    /// Host-side execution of peer intent. Left/right bits steer the peer's
    /// rendered facing and pick the action direction; locomotion itself is
    /// never applied from them, each side runs its own physics.
    fn handle_input(&mut self, flags: InputFlags) {
        if self.role != Role::Host {
            debug!("ignoring INPUT on client side");
            return;
        }

        if flags.contains(InputFlags::LEFT) {
            self.sim.peer_mut().facing_right = false;
        } else if flags.contains(InputFlags::RIGHT) {
            self.sim.peer_mut().facing_right = true;
        }

        let facing = if flags.contains(InputFlags::LEFT) {
            Facing::Left
        } else if flags.contains(InputFlags::RIGHT) {
            Facing::Right
        } else if self.sim.peer().facing_right {
            Facing::Right
        } else {
            Facing::Left
        };

        if flags.contains(InputFlags::HIT) {
            if let Some(hit) = self.sim.hit_as_peer(facing) {
                self.push_hit_delta(hit);
            }
        }
        if flags.contains(InputFlags::PLACE) {
            if let Some(placed) = self.sim.place_as_peer(facing) {
                self.send(Message::Tile(TileUpdate::Place { col: placed.col, row: placed.row }));
                self.notify_world_changed();
            }
        }
    }

    /// Client-side application of authoritative deltas, verbatim. The host
    /// never receives these; its world is the source of truth.
    fn handle_tile(&mut self, update: TileUpdate) {
        if self.role != Role::Client {
            debug!("ignoring TILE on host side");
            return;
        }
        match update {
            TileUpdate::Destroy { col, row } => {
                self.sim.grid_mut().remove_at(col, row);
            }
            TileUpdate::Place { col, row } => {
                if self.sim.grid_mut().place_footprint(col, row).is_none() {
                    warn!("host-directed placement at ({col},{row}) did not fit");
                }
            }
            TileUpdate::Health { col, row, health } => {
                self.sim.grid_mut().set_health(col, row, health);
            }
        }
        self.notify_world_changed();
    }

    /// One fixed step: continuous locomotion, physics, held-hit repeat, and
    /// the deduplicated `POS` broadcast.
    pub fn tick(&mut self, dt: f32) {
        if self.axis != 0.0 {
            if self.axis > 0.0 {
                self.sim.set_facing(Facing::Right);
            } else {
                self.sim.set_facing(Facing::Left);
            }
            let step = self.axis * self.sim.tuning().walk_speed * dt;
            self.sim.walk(step);
        }

        self.sim.tick(dt);

        if self.hit_held {
            self.hit_cooldown -= dt;
            if self.hit_cooldown <= 0.0 {
                self.request_hit();
                self.hit_cooldown = self.sim.tuning().hit_repeat_ms as f32 / 1000.0;
            }
        }

        let pos = self.sim.quantized_pos();
        if self.connected && self.last_sent_pos != Some(pos) {
            let (col, row, facing_right) = pos;
            self.outbox.push(Message::Pos { col, row, facing_right });
            self.last_sent_pos = Some(pos);
        }
    }

    /// Drains everything queued for the wire since the last drain.
    pub fn take_outbox(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }

    fn facing_bits(&self) -> InputFlags {
        match self.sim.actor().facing {
            Facing::Left => InputFlags::LEFT,
            Facing::Right => InputFlags::RIGHT,
            Facing::Up | Facing::Down => InputFlags::empty(),
        }
    }

    fn push_hit_delta(&mut self, hit: HitResult) {
        let update = if hit.remaining <= 0 {
            TileUpdate::Destroy { col: hit.col, row: hit.row }
        } else {
            TileUpdate::Health { col: hit.col, row: hit.row, health: hit.remaining }
        };
        self.send(Message::Tile(update));
        self.notify_world_changed();
    }

    fn notify_world_changed(&mut self) {
        if let Some(observer) = &mut self.observer {
            observer.on_world_changed();
        }
    }

    fn send(&mut self, msg: Message) {
        if !self.connected {
            warn!("dropping {msg:?}: not connected");
            return;
        }
        self.outbox.push(msg);
    }
}
