use std::collections::HashMap;
use std::fmt;
use std::io;
use std::net::{Shutdown, SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token, Waker};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::files::StaticResolver;
use crate::http::connection::{Dispatch, ReadOutcome, Session};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const FIRST_CONNECTION: usize = 2;

const EVENT_CAPACITY: usize = 1024;

/// Upper bound on bytes requested from one connection per loop turn.
const READ_BUDGET: usize = 4096;

/// Stops a running [`Server`] from any thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    /// Asks the loop to close every socket and return.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        if let Err(e) = self.waker.wake() {
            warn!(error = %e, "failed to wake the event loop");
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// `<method> <path> <status>`, logged once per answered connection.
#[derive(Debug, Clone)]
struct AccessLine {
    method: String,
    path: String,
    status: u16,
}

impl fmt::Display for AccessLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.path, self.status)
    }
}

enum ConnectionState {
    Receiving(Session),
    Responding {
        writer: ResponseWriter,
        line: AccessLine,
    },
}

/// What the loop must do with a connection after servicing it.
enum Step {
    Continue,
    /// The read budget ran out before the socket would block.
    Yield,
    AwaitWritable,
    Finished(AccessLine),
    PeerClosed,
}

struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    state: ConnectionState,
    last_active: Instant,
}

impl Connection {
    fn advance(&mut self, resolver: &StaticResolver) -> io::Result<Step> {
        self.last_active = Instant::now();

        if let ConnectionState::Receiving(session) = &mut self.state {
            let mut budget = READ_BUDGET;
            let dispatch = loop {
                if budget == 0 {
                    return Ok(Step::Yield);
                }
                budget = budget.saturating_sub(session.read_size());

                match session.read_from(&mut self.stream) {
                    Ok(ReadOutcome::Pending) => continue,
                    Ok(ReadOutcome::Ready(dispatch)) => break dispatch,
                    Ok(ReadOutcome::PeerClosed) => return Ok(Step::PeerClosed),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                        return Ok(Step::Continue);
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            };

            let (response, line) = respond(dispatch, resolver, self.peer);
            self.state = ConnectionState::Responding {
                writer: ResponseWriter::new(&response),
                line,
            };
        }

        match &mut self.state {
            ConnectionState::Responding { writer, line } => {
                if writer.write_to(&mut self.stream)? {
                    Ok(Step::Finished(line.clone()))
                } else {
                    Ok(Step::AwaitWritable)
                }
            }
            ConnectionState::Receiving(_) => Ok(Step::Continue),
        }
    }
}

fn respond(dispatch: Dispatch, resolver: &StaticResolver, peer: SocketAddr) -> (Response, AccessLine) {
    match dispatch {
        Dispatch::Request(request) => {
            let response = resolver.resolve(&request.path);
            let line = AccessLine {
                method: request.method.to_string(),
                path: request.path,
                status: response.status.as_u16(),
            };
            (response, line)
        }
        Dispatch::Malformed { raw, error } => {
            warn!(%peer, error = %error, "invalid request head");
            let response = Response::invalid_request_diagnostic(&raw);
            let line = AccessLine {
                method: "-".to_string(),
                path: "-".to_string(),
                status: response.status.as_u16(),
            };
            (response, line)
        }
    }
}

/// Single-threaded static file server.
///
/// One `mio::Poll` watches the listener, a shutdown waker and every live
/// connection. Each connection's parse state lives in the registry owned
/// by the server and is only touched from [`Server::run`].
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    resolver: StaticResolver,
    connections: HashMap<Token, Connection>,
    /// Connections that still had unread data when their budget ran out.
    ready: Vec<Token>,
    next_token: usize,
    shutdown: ShutdownHandle,
    idle_timeout: Option<Duration>,
}

impl Server {
    pub fn bind(cfg: &Config) -> anyhow::Result<Self> {
        let addr = cfg
            .server
            .listen_addr
            .to_socket_addrs()
            .with_context(|| format!("resolving {}", cfg.server.listen_addr))?
            .next()
            .with_context(|| format!("no address for {}", cfg.server.listen_addr))?;

        let resolver = StaticResolver::new(&cfg.static_files.root).with_context(|| {
            format!("opening server root {}", cfg.static_files.root.display())
        })?;

        let poll = Poll::new().context("creating poll instance")?;
        let mut listener =
            TcpListener::bind(addr).with_context(|| format!("binding {addr}"))?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .context("registering listener")?;

        let waker = Waker::new(poll.registry(), WAKER).context("creating waker")?;
        let shutdown = ShutdownHandle {
            requested: Arc::new(AtomicBool::new(false)),
            waker: Arc::new(waker),
        };

        Ok(Self {
            poll,
            listener,
            resolver,
            connections: HashMap::new(),
            ready: Vec::new(),
            next_token: FIRST_CONNECTION,
            shutdown,
            idle_timeout: cfg.idle_timeout(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs until the shutdown handle is triggered, then closes the listener
    /// and every open connection.
    pub fn run(mut self) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            root = %self.resolver.root().display(),
            "Listening"
        );

        let mut events = Events::with_capacity(EVENT_CAPACITY);
        let result = loop {
            if self.shutdown.is_triggered() {
                info!("Shutdown requested");
                break Ok(());
            }

            // Edge-triggered: yielded connections get no new event, so poll
            // without waiting and service them again below.
            let timeout = if self.ready.is_empty() {
                self.idle_timeout
            } else {
                Some(Duration::ZERO)
            };
            let carried = std::mem::take(&mut self.ready);

            match self.poll.poll(&mut events, timeout) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    self.ready = carried;
                    continue;
                }
                Err(e) => break Err(e).context("polling for readiness"),
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_pending(),
                    WAKER => {}
                    token => self.service(token),
                }
            }

            for token in carried {
                self.service(token);
            }

            if let Some(limit) = self.idle_timeout {
                self.expire_idle(limit);
            }
        };

        self.close_all();
        result
    }

    /// Accepts until the backlog is drained. Reading waits for the new
    /// connection's own readiness.
    fn accept_pending(&mut self) {
        loop {
            let (mut stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    return;
                }
            };

            let token = Token(self.next_token);
            self.next_token += 1;

            if let Err(e) = self
                .poll
                .registry()
                .register(&mut stream, token, Interest::READABLE)
            {
                warn!(%peer, error = %e, "failed to register connection");
                continue;
            }

            debug!(%peer, ?token, "accepted connection");
            self.connections.insert(
                token,
                Connection {
                    stream,
                    peer,
                    state: ConnectionState::Receiving(Session::new()),
                    last_active: Instant::now(),
                },
            );
        }
    }

    fn service(&mut self, token: Token) {
        let Some(conn) = self.connections.get_mut(&token) else {
            return;
        };

        match conn.advance(&self.resolver) {
            Ok(Step::Continue) => {}
            Ok(Step::Yield) => {
                if !self.ready.contains(&token) {
                    self.ready.push(token);
                }
            }
            Ok(Step::AwaitWritable) => {
                if let Err(e) =
                    self.poll
                        .registry()
                        .reregister(&mut conn.stream, token, Interest::WRITABLE)
                {
                    warn!(peer = %conn.peer, error = %e, "failed to wait for writability");
                    self.close(token);
                }
            }
            Ok(Step::Finished(line)) => {
                info!(target: "access", "{line}");
                self.close(token);
            }
            Ok(Step::PeerClosed) => {
                debug!(peer = %conn.peer, "peer closed before sending a full request");
                self.close(token);
            }
            Err(e) => {
                warn!(peer = %conn.peer, error = %e, "connection failed");
                self.close(token);
            }
        }
    }

    fn expire_idle(&mut self, limit: Duration) {
        let stale: Vec<Token> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.last_active.elapsed() >= limit)
            .map(|(token, _)| *token)
            .collect();

        for token in stale {
            if let Some(conn) = self.connections.get(&token) {
                warn!(peer = %conn.peer, "closing idle connection");
            }
            self.close(token);
        }
    }

    fn close(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            let _ = self.poll.registry().deregister(&mut conn.stream);
            let _ = conn.stream.shutdown(Shutdown::Both);
            debug!(peer = %conn.peer, "closed connection");
        }
    }

    fn close_all(&mut self) {
        let tokens: Vec<Token> = self.connections.keys().copied().collect();
        for token in tokens {
            self.close(token);
        }
        let _ = self.poll.registry().deregister(&mut self.listener);
        debug!("listener closed");
    }
}
