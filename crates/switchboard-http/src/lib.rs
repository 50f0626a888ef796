//! Minimal HTTP/1.1 transport for switchboard.
//!
//! This crate is the thin shell between a TCP socket and the core
//! dispatcher: it parses one request per connection (request line, headers,
//! `Content-Length`-delimited body), hands `(method, path, body)` to the
//! dispatcher, and writes the enveloped reply back. Keep-alive, TLS,
//! chunked transfer, and streaming bodies are deliberately absent.
//!
//! # Example
//!
//! ```no_run
//! use switchboard_core::{Dispatcher, HandlerRegistry, LogConfig, Logger, Method, Reply,
//!     RouteDescriptor, RouteTableBuilder};
//! use switchboard_http::{Server, ServerConfig};
//!
//! let report = RouteTableBuilder::new()
//!     .descriptor(RouteDescriptor::new(Method::Get, "/health", ("Health", "check")))
//!     .build();
//! let registry = HandlerRegistry::new().register("Health", "check", |_| Ok(Reply::ok("up")));
//! let dispatcher = Dispatcher::new(report.table, registry);
//!
//! let server = Server::bind(
//!     ServerConfig::new().bind_addr("127.0.0.1:8080"),
//!     dispatcher,
//!     Logger::new(LogConfig::new()),
//! ).expect("bind");
//! server.serve().expect("serve");
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::uninlined_format_args)]

pub mod parser;
pub mod server;

pub use parser::{ParseError, ParseLimits, percent_decode, read_request};
pub use server::{
    DEFAULT_BIND_ADDR, DEFAULT_MAX_CONNECTIONS, Server, ServerConfig, reason_phrase,
};
