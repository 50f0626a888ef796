//! Threaded TCP server.
//!
//! One connection carries one request: parse, dispatch, write the
//! enveloped reply, close. Connections are handled on their own threads
//! from an externally unbounded spawn, capped by `max_connections`; the
//! dispatcher itself is shared read-only across all of them.

use std::io::{self, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use switchboard_core::{DispatchError, Dispatcher, Envelope, Logger, NOT_FOUND_PAYLOAD, Reply};

use crate::parser::{ParseError, ParseLimits, read_request};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default cap on concurrently handled connections (0 = unlimited).
pub const DEFAULT_MAX_CONNECTIONS: usize = 64;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Cap on concurrently handled connections (0 = unlimited).
    pub max_connections: usize,
    /// HTTP parse limits.
    pub limits: ParseLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            limits: ParseLimits::default(),
        }
    }
}

impl ServerConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the concurrent connection cap (0 = unlimited).
    #[must_use]
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the parse limits.
    #[must_use]
    pub fn limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Reason phrase for a status code.
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A bound, not-yet-serving server.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    logger: Arc<Logger>,
}

impl Server {
    /// Bind the listener.
    ///
    /// # Errors
    ///
    /// Propagates the bind failure.
    pub fn bind(config: ServerConfig, dispatcher: Dispatcher, logger: Logger) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.bind_addr)?;
        Ok(Self {
            listener,
            config,
            dispatcher: Arc::new(dispatcher),
            logger: Arc::new(logger),
        })
    }

    /// The actual bound address (useful with a `:0` port).
    ///
    /// # Errors
    ///
    /// Propagates the socket query failure.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and handle connections until the listener fails.
    ///
    /// One request's failure never takes down the loop: parse and dispatch
    /// problems become error responses on that connection only.
    ///
    /// # Errors
    ///
    /// Only a failure of the accept loop itself.
    pub fn serve(self) -> io::Result<()> {
        self.logger.info(
            "server listening",
            &[("addr", &self.local_addr()?.to_string())],
        );

        let active = Arc::new(AtomicUsize::new(0));
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    self.logger
                        .warn("accept failed", &[("error", &err.to_string())]);
                    continue;
                }
            };

            if self.config.max_connections > 0
                && active.load(Ordering::SeqCst) >= self.config.max_connections
            {
                reject_over_capacity(stream, &self.logger);
                continue;
            }

            active.fetch_add(1, Ordering::SeqCst);
            let dispatcher = Arc::clone(&self.dispatcher);
            let logger = Arc::clone(&self.logger);
            let limits = self.config.limits.clone();
            let active = Arc::clone(&active);
            thread::spawn(move || {
                handle_connection(stream, &dispatcher, &logger, &limits);
                active.fetch_sub(1, Ordering::SeqCst);
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn reject_over_capacity(mut stream: TcpStream, logger: &Logger) {
    logger.warn("connection rejected, at capacity", &[]);
    let envelope = Envelope {
        server_code: 503,
        response: "Too many connections".to_string(),
    };
    let _ = write_response(&mut stream, 503, &envelope.to_json());
}

fn handle_connection(
    stream: TcpStream,
    dispatcher: &Dispatcher,
    logger: &Logger,
    limits: &ParseLimits,
) {
    let mut reader = match stream.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(err) => {
            logger.warn("connection clone failed", &[("error", &err.to_string())]);
            return;
        }
    };
    let mut stream = stream;

    let (status, payload) = match read_request(&mut reader, limits) {
        Ok(request) => {
            let outcome = dispatcher.dispatch(&request);
            let (status, payload) = render_outcome(&outcome, logger);
            logger.info(
                "processing",
                &[
                    ("method", request.method.as_str()),
                    ("path", &request.path),
                    ("body_bytes", &request.body.len().to_string()),
                    ("status", &status.to_string()),
                ],
            );
            (status, payload)
        }
        Err(err) => {
            logger.warn("unparseable request", &[("error", &err.to_string())]);
            (400, parse_error_payload(&err))
        }
    };

    let envelope = Envelope {
        server_code: status,
        response: payload,
    };
    if let Err(err) = write_response(&mut stream, status, &envelope.to_json()) {
        logger.warn("response write failed", &[("error", &err.to_string())]);
    }
}

/// Map a dispatch outcome to `(status, payload)` for the envelope.
fn render_outcome(outcome: &Result<Reply, DispatchError>, logger: &Logger) -> (u16, String) {
    match outcome {
        Ok(reply) => (reply.status, reply.payload.clone()),
        Err(err @ DispatchError::NotFound) => (err.status(), NOT_FOUND_PAYLOAD.to_string()),
        Err(err @ DispatchError::BadParameter(convert)) => (err.status(), convert.to_string()),
        Err(err @ DispatchError::HandlerFailure(failure)) => {
            // The failure detail stays in the log; the wire gets a generic
            // server error.
            logger.error("handler failure", &[("error", &failure.to_string())]);
            (err.status(), "Internal server error".to_string())
        }
    }
}

fn parse_error_payload(err: &ParseError) -> String {
    format!("Malformed request: {}", err)
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason_phrase(status),
        body.len(),
        body
    )?;
    stream.flush()
}
