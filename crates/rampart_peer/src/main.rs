mod commands;

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use commands::{parse_command, Command};
use rampart_net::session::{Role, Session, SessionObserver};
use rampart_net::transport::{Endpoint, DEFAULT_HOST_ADDR, DEFAULT_PORT};
use rampart_shared::protocol::encode;
use rampart_shared::tuning::Tuning;
use rampart_sim::step::FixedStep;

struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_connection_changed(&mut self, connected: bool) {
        info!("peer {}", if connected { "connected" } else { "disconnected" });
    }

    fn on_peer_character(&mut self, name: &str) {
        info!("peer picked character '{name}'");
    }
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut role = Role::Host;
    let mut addr = DEFAULT_HOST_ADDR.to_string();
    let mut port = DEFAULT_PORT;
    let mut name: Option<String> = None;
    let mut tuning_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => role = Role::Host,
            "--join" => {
                role = Role::Client;
                // An address is optional; loopback is the documented default.
                if args.peek().is_some_and(|next| !next.starts_with('-')) {
                    if let Some(value) = args.next() {
                        addr = value;
                    }
                }
            }
            "--port" => {
                let Some(value) = args.next() else {
                    eprintln!("--port expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u16>() {
                    Ok(parsed) => port = parsed,
                    Err(err) => {
                        eprintln!("invalid port '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--name" => {
                let Some(value) = args.next() else {
                    eprintln!("--name expects a character name");
                    std::process::exit(2);
                };
                name = Some(value);
            }
            "--tuning" => {
                let Some(value) = args.next() else {
                    eprintln!("--tuning expects a path argument");
                    std::process::exit(2);
                };
                tuning_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                println!(
                    "Usage: rampart_peer [--host | --join [addr]] [--port <u16>] \
                     [--name <character>] [--tuning <path>]"
                );
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let tuning = match &tuning_path {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(err) => {
                eprintln!("failed to load tuning from {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("failed to set Ctrl+C handler: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(role, &addr, port, name, tuning, running) {
        eprintln!("peer failed: {err}");
        std::process::exit(1);
    }
}

fn run(
    role: Role,
    addr: &str,
    port: u16,
    name: Option<String>,
    tuning: Tuning,
    running: Arc<AtomicBool>,
) -> io::Result<()> {
    let tick = Duration::from_millis(tuning.tick_ms);
    let dt = tuning.tick_seconds();

    let mut session = Session::new(role, tuning);
    session.set_observer(Box::new(LogObserver));
    if let Some(name) = name {
        session.set_local_character(&name);
    }

    let mut endpoint = match role {
        Role::Host => Endpoint::host(port)?,
        // A failed dial is a connectivity state, not a startup error; the
        // peer keeps running solo.
        Role::Client => match Endpoint::connect(addr, port) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                warn!("could not reach {addr}:{port}: {err}; continuing disconnected");
                Endpoint::detached()
            }
        },
    };
    info!("running as {}", role.as_str());

    let (command_tx, command_rx) = mpsc::channel();
    spawn_console_command_thread(command_tx);

    let mut stepper = FixedStep::new(tick);
    let mut last_frame = Instant::now();
    let mut frames = Vec::new();
    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();

        while let Ok(command) = command_rx.try_recv() {
            if !execute_console_command(&mut session, command) {
                running.store(false, Ordering::SeqCst);
            }
        }

        frames.clear();
        endpoint.update(&mut frames);
        session.set_connected(endpoint.is_connected());
        for frame in &frames {
            session.handle_frame(frame);
        }

        // A slow frame banks extra ticks and catches up here.
        for _ in 0..stepper.advance(frame_start - last_frame) {
            session.tick(dt);
        }
        last_frame = frame_start;

        for msg in session.take_outbox() {
            endpoint.send(&encode(&msg));
        }

        let elapsed = frame_start.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }

    endpoint.close();
    session.close();
    Ok(())
}

/// Runs one console command; returns false when the loop should stop.
fn execute_console_command(session: &mut Session, command: Command) -> bool {
    match command {
        Command::Noop => {}
        Command::Left => session.request_move_left(),
        Command::Right => session.request_move_right(),
        Command::Jump => session.request_jump(),
        Command::Hit => session.request_hit(),
        Command::Place => session.request_place(),
        Command::Axis(value) => session.set_axis(value),
        Command::Status => {
            let actor = session.sim().actor();
            let peer = session.sim().peer();
            info!(
                "{} | actor at ({:.1}, {:.1}) airborne={} | peer connected={} pos=({:.1}, {:.1}) char={:?} | {} blocks",
                session.role().as_str(),
                actor.x,
                actor.bottom,
                actor.is_airborne(),
                session.is_connected(),
                peer.x,
                peer.bottom,
                peer.character,
                session.sim().grid().blocks().count(),
            );
        }
        Command::Quit => {
            info!("quitting");
            return false;
        }
        Command::Help => {
            println!("Commands: left, right, jump, hit, place, axis <-1..1>, status, quit");
        }
        Command::InvalidUsage(usage) => println!("{usage}"),
        Command::Unknown(input) => println!("Unknown command: {input}"),
    }
    true
}

fn spawn_console_command_thread(command_tx: Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(err) => {
                    warn!("console read error: {err}");
                    break;
                }
            };
            if command_tx.send(parse_command(&line)).is_err() {
                break;
            }
        }
    });
}
