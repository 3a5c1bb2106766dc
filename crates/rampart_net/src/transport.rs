use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Fixed port both roles use; the host binds it, the client dials it.
pub const DEFAULT_PORT: u16 = 8082;
/// Documented loopback default for a client with no explicit target.
pub const DEFAULT_HOST_ADDR: &str = "127.0.0.1";

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const KEEPALIVE_FRAME: &str = "PING";

/// Splits completed newline-terminated frames out of the receive buffer,
/// leaving any trailing partial line in place.
fn split_frames(buffer: &mut Vec<u8>, frames: &mut Vec<String>) {
    while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=newline).collect();
        let text = String::from_utf8_lossy(&line[..newline]);
        let trimmed = text.trim_end_matches('\r');
        if !trimmed.is_empty() {
            frames.push(trimmed.to_string());
        }
    }
}

/// One live line-framed connection: newline-delimited text frames over a
/// nonblocking TCP stream, with a transport-level keep-alive the session
/// never sees.
struct LineLink {
    stream: TcpStream,
    rx: Vec<u8>,
    last_recv: Instant,
    last_send: Instant,
    closed: bool,
}

impl LineLink {
    fn new(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        let now = Instant::now();
        Ok(Self {
            stream,
            rx: Vec::new(),
            last_recv: now,
            last_send: now,
            closed: false,
        })
    }

    /// Sends one frame. A failed send drops the frame with a warning; the
    /// liveness timeout is what eventually declares the link dead.
    fn send_frame(&mut self, frame: &str) {
        if self.closed {
            return;
        }
        let mut line = String::with_capacity(frame.len() + 1);
        line.push_str(frame);
        line.push('\n');
        if let Err(err) = self.stream.write_all(line.as_bytes()) {
            warn!("dropping outgoing frame: {err}");
        } else {
            self.last_send = Instant::now();
        }
    }

    /// Drains the socket into complete frames. Keep-alives are answered
    /// here and filtered out; silence past the timeout closes the link.
    fn poll(&mut self, frames: &mut Vec<String>) {
        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    info!("peer closed the connection");
                    self.closed = true;
                    break;
                }
                Ok(n) => {
                    self.rx.extend_from_slice(&chunk[..n]);
                    self.last_recv = Instant::now();
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("read error, closing link: {err}");
                    self.closed = true;
                    break;
                }
            }
        }

        let mut raw = Vec::new();
        split_frames(&mut self.rx, &mut raw);
        frames.extend(raw.into_iter().filter(|f| f != KEEPALIVE_FRAME));

        if self.last_send.elapsed() >= KEEPALIVE_INTERVAL {
            self.send_frame(KEEPALIVE_FRAME);
        }
        if self.last_recv.elapsed() >= LIVENESS_TIMEOUT {
            warn!("no traffic for {LIVENESS_TIMEOUT:?}, dropping link");
            self.closed = true;
        }
    }
}

/// The two-peer transport. A host listens and keeps at most one link; a
/// client dials out once. Connection loss surfaces only through
/// `is_connected`.
pub struct Endpoint {
    listener: Option<TcpListener>,
    link: Option<LineLink>,
}

impl Endpoint {
    /// Binds the listening side on all interfaces.
    pub fn host(port: u16) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        info!("listening on 0.0.0.0:{port}");
        Ok(Self { listener: Some(listener), link: None })
    }

    /// Dials the host once, blocking up to the connect timeout.
    pub fn connect(addr: &str, port: u16) -> std::io::Result<Self> {
        let target = (addr, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "unresolvable address"))?;
        let stream = TcpStream::connect_timeout(&target, CONNECT_TIMEOUT)?;
        info!("connected to {target}");
        Ok(Self { listener: None, link: Some(LineLink::new(stream)?) })
    }

    /// No listener, no link. What a client falls back to when the dial
    /// fails, so it keeps running solo; sends drop and `is_connected`
    /// stays false.
    pub fn detached() -> Self {
        Self { listener: None, link: None }
    }

    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(|l| !l.closed)
    }

    /// One pump: accept a pending peer (host side), read frames, run the
    /// keep-alive, and reap a dead link.
    pub fn update(&mut self, frames: &mut Vec<String>) {
        if let Some(listener) = &self.listener {
            loop {
                match listener.accept() {
                    Ok((stream, peer)) => {
                        if self.link.is_some() {
                            info!("rejecting extra connection from {peer}");
                            continue;
                        }
                        match LineLink::new(stream) {
                            Ok(fresh) => {
                                info!("peer connected from {peer}");
                                self.link = Some(fresh);
                            }
                            Err(err) => warn!("failed to set up link from {peer}: {err}"),
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        warn!("accept error: {err}");
                        break;
                    }
                }
            }
        }

        if let Some(link) = &mut self.link {
            link.poll(frames);
            if link.closed {
                self.link = None;
            }
        }
    }

    pub fn send(&mut self, frame: &str) {
        match &mut self.link {
            Some(link) => link.send_frame(frame),
            None => warn!("dropping frame, no connection"),
        }
    }

    pub fn close(&mut self) {
        self.link = None;
    }
}
