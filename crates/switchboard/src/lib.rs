//! Declarative HTTP request routing.
//!
//! switchboard compiles a list of endpoint descriptors into an ordered,
//! immutable route table and dispatches requests against it:
//!
//! - **Declarative routes** — endpoints are plain [`RouteDescriptor`]
//!   values; no code generation, no annotation scanning
//! - **Table-driven dispatch** — a single ordered scan, first structural
//!   match wins
//! - **Typed path parameters** — `{name}` placeholders converted to the
//!   declared type before the handler runs
//! - **Per-controller serialization** — mutating requests on one
//!   controller never overlap; GETs are never serialized
//!
//! # Quick Start
//!
//! ```no_run
//! use switchboard::prelude::*;
//!
//! let report = RouteTableBuilder::new()
//!     .descriptor(
//!         RouteDescriptor::new(Method::Get, "/users/{id}", ("Users", "get"))
//!             .param("id", ParamType::Int),
//!     )
//!     .descriptor(RouteDescriptor::new(Method::Post, "/users", ("Users", "create")).with_body())
//!     .build();
//!
//! let registry = HandlerRegistry::new()
//!     .register("Users", "get", |args: HandlerArgs<'_>| {
//!         Ok(Reply::ok(format!("user {}", args.int(0).unwrap_or(-1))))
//!     })
//!     .register("Users", "create", |args: HandlerArgs<'_>| {
//!         Ok(Reply::created(args.body().unwrap_or("").to_string()))
//!     });
//!
//! let dispatcher = Dispatcher::new(report.table, registry);
//! let server = Server::bind(
//!     ServerConfig::new().bind_addr("127.0.0.1:8080"),
//!     dispatcher,
//!     Logger::new(LogConfig::new()),
//! ).expect("bind");
//! server.serve().expect("serve");
//! ```
//!
//! # Crate Structure
//!
//! - [`switchboard_core`] — descriptors, route table, dispatcher, registry
//! - [`switchboard_http`] — minimal HTTP/1.1 transport

#![forbid(unsafe_code)]

// Re-export crates
pub use switchboard_core as core;
pub use switchboard_http as http;

// Re-export commonly used types
pub use switchboard_core::{
    ActionId, BuildReport, CompiledRoute, ControllerId, ConversionPolicy, ConvertError,
    DispatchError, Dispatcher, Envelope, HandlerArgs, HandlerError, HandlerRef, HandlerRegistry,
    LogConfig, LogEntry, LogLevel, LogSink, Logger, Method, NOT_FOUND_PAYLOAD, ParamSpec,
    ParamType, ParamValue, PathTemplate, Reply, Request, RouteDescriptor, RouteTable,
    RouteTableBuilder, RouterConfig, ValidationError, ValidationErrorKind,
};

pub use switchboard_http::{ParseError, ParseLimits, Server, ServerConfig};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ConversionPolicy, DispatchError, Dispatcher, HandlerArgs, HandlerError, HandlerRegistry,
        LogConfig, LogLevel, Logger, Method, ParamType, ParamValue, Reply, Request,
        RouteDescriptor, RouteTableBuilder, RouterConfig, Server, ServerConfig,
    };
}
