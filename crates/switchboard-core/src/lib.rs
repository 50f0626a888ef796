//! Core types for the switchboard routing engine.
//!
//! This crate turns a declarative list of [`RouteDescriptor`]s into a
//! validated, immutable [`RouteTable`] and dispatches requests against it:
//!
//! - [`PathTemplate`] — segment-level template matching and parameter
//!   extraction (`/users/{id}`)
//! - [`RouteTableBuilder`] — best-effort compilation with per-descriptor
//!   validation errors
//! - [`Dispatcher`] — first-match-wins dispatch, parameter conversion,
//!   handler invocation
//! - [`HandlerRegistry`] — handler lookup keyed by controller identity,
//!   with per-controller serialization of mutating requests
//!
//! # Design Principles
//!
//! - The compiled table is write-once: built before the first request,
//!   shared read-only across worker threads without locking
//! - Declaration order is the matching order; the first structural match
//!   wins, never a specificity ranking
//! - Dispatch failures become values, not panics; one request's failure
//!   cannot affect another's

#![forbid(unsafe_code)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod convert;
pub mod descriptor;
pub mod dispatch;
pub mod logging;
mod method;
pub mod registry;
mod reply;
mod request;
pub mod table;
pub mod template;

pub use config::RouterConfig;
pub use convert::{ConversionPolicy, ConvertError, ParamType, ParamValue, convert};
pub use descriptor::{ActionId, ControllerId, HandlerRef, ParamSpec, RouteDescriptor};
pub use dispatch::{DispatchError, Dispatcher};
pub use logging::{LogConfig, LogEntry, LogLevel, LogSink, Logger};
pub use method::Method;
pub use registry::{BoxHandler, HandlerArgs, HandlerError, HandlerRegistry};
pub use reply::{Envelope, NOT_FOUND_PAYLOAD, Reply};
pub use request::Request;
pub use table::{BuildReport, CompiledRoute, RouteTable, RouteTableBuilder, ValidationError, ValidationErrorKind};
pub use template::{PathTemplate, TemplateSegment, is_placeholder, split_segments};
