//! Request dispatch.
//!
//! The dispatcher scans the compiled table in declaration order, takes the
//! first route whose method and template both match, extracts and converts
//! its parameters, and invokes the bound handler through the registry.
//! First match wins: when two templates can match the same concrete path,
//! declaration order is the tie-break, not specificity. A literal route
//! declared after an overlapping placeholder route loses; that policy is
//! deliberate and preserved.
//!
//! Dispatch is stateless across requests. The table, registry, and config
//! are read-only, so one dispatcher is shared across worker threads.

use crate::config::RouterConfig;
use crate::convert::{ConvertError, convert};
use crate::registry::{HandlerArgs, HandlerError, HandlerRegistry};
use crate::reply::Reply;
use crate::request::Request;
use crate::table::RouteTable;
use crate::template::split_segments;
use std::fmt;

/// Why a request produced no successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No route matched the method and path. Terminal 404.
    NotFound,
    /// A matched route's parameter failed conversion. Client error.
    BadParameter(ConvertError),
    /// A route matched but its handler failed. Never conflated with
    /// [`DispatchError::NotFound`]; the transport renders it as a server
    /// error.
    HandlerFailure(HandlerError),
}

impl DispatchError {
    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadParameter(_) => 400,
            Self::HandlerFailure(_) => 500,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no route matched"),
            Self::BadParameter(err) => write!(f, "{}", err),
            Self::HandlerFailure(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::BadParameter(err) => Some(err),
            Self::HandlerFailure(err) => Some(err),
        }
    }
}

/// The per-request matching and invocation engine.
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    registry: HandlerRegistry,
    config: RouterConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    #[must_use]
    pub fn new(table: RouteTable, registry: HandlerRegistry) -> Self {
        Self::with_config(table, registry, RouterConfig::default())
    }

    /// Create a dispatcher with an explicit configuration.
    #[must_use]
    pub fn with_config(table: RouteTable, registry: HandlerRegistry, config: RouterConfig) -> Self {
        Self {
            table,
            registry,
            config,
        }
    }

    /// The compiled table this dispatcher scans.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Dispatch one request.
    ///
    /// Invokes at most one handler, exactly once. The owning controller's
    /// exclusion lock is held around the handler call for every non-GET
    /// method, and around nothing else.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotFound`] when no route matches,
    /// [`DispatchError::BadParameter`] when a parameter fails conversion
    /// under the strict policy, [`DispatchError::HandlerFailure`] when the
    /// matched handler (or its registration) fails.
    pub fn dispatch(&self, request: &Request) -> Result<Reply, DispatchError> {
        let path_segments = split_segments(&request.path);

        let route = self
            .table
            .iter()
            .find(|route| {
                route.method == request.method && route.template.matches(&path_segments)
            })
            .ok_or(DispatchError::NotFound)?;

        let mut params = Vec::with_capacity(route.bindings.len());
        for binding in &route.bindings {
            // The structural match guarantees the segment index is in range.
            let raw = path_segments[binding.segment];
            let value = convert(&binding.name, raw, binding.ty, self.config.conversion_policy)
                .map_err(DispatchError::BadParameter)?;
            params.push(value);
        }

        let body = route.wants_body.then_some(request.body.as_str());
        self.registry
            .invoke(
                &route.handler,
                !request.method.is_get(),
                HandlerArgs::new(&params, body),
            )
            .map_err(DispatchError::HandlerFailure)
    }
}
