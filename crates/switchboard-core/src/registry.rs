//! Handler registry and the mutual-exclusion policy.
//!
//! The registry holds one entry per controller: its registered actions and
//! one exclusion lock. The dispatcher invokes through [`HandlerRegistry::invoke`],
//! which acquires the lock for mutating (non-GET) requests only, and only
//! for the duration of the handler call — never for matching or parameter
//! extraction. GET requests bypass the lock entirely and may run
//! concurrently with each other and with a mutating request on the same
//! controller; that read-availability tradeoff is intentional and is not
//! an `RwLock` in disguise.
//!
//! Handlers are synchronous, so the lock is never held across a suspension
//! point.

use crate::convert::ParamValue;
use crate::descriptor::{ActionId, ControllerId, HandlerRef};
use crate::reply::Reply;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// The arguments assembled for one handler invocation.
///
/// Parameters appear in the order the route declared them; the body is
/// present iff the route's method binds one.
#[derive(Debug, Clone, Copy)]
pub struct HandlerArgs<'a> {
    params: &'a [ParamValue],
    body: Option<&'a str>,
}

impl<'a> HandlerArgs<'a> {
    /// Assemble arguments.
    #[must_use]
    pub fn new(params: &'a [ParamValue], body: Option<&'a str>) -> Self {
        Self { params, body }
    }

    /// All converted parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamValue] {
        self.params
    }

    /// The parameter at `index` as an integer.
    #[must_use]
    pub fn int(&self, index: usize) -> Option<i64> {
        self.params.get(index).and_then(ParamValue::as_int)
    }

    /// The parameter at `index` as a string.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<&str> {
        self.params.get(index).and_then(ParamValue::as_str)
    }

    /// The request body, when the route binds one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body
    }
}

/// Why an invocation failed after a route had already matched.
///
/// Distinct from not-found by design: "matched but failed" and "never
/// matched" must be distinguishable to callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The route references a controller or action nobody registered.
    NotRegistered {
        /// The dangling reference.
        handler: String,
    },
    /// The handler itself failed.
    Failed {
        /// Handler-provided description.
        message: String,
    },
}

impl HandlerError {
    /// A failure raised from inside a handler.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRegistered { handler } => {
                write!(f, "no handler registered for {}", handler)
            }
            Self::Failed { message } => write!(f, "handler failed: {}", message),
        }
    }
}

impl std::error::Error for HandlerError {}

/// A boxed handler function.
pub type BoxHandler = Box<dyn Fn(HandlerArgs<'_>) -> Result<Reply, HandlerError> + Send + Sync>;

/// One controller: its actions plus the exclusion lock serializing its
/// mutating requests.
struct ControllerEntry {
    actions: HashMap<ActionId, BoxHandler>,
    exclusion: Mutex<()>,
}

/// Registry of handlers keyed by controller identity.
///
/// Mirrors the one-shared-instance-per-owning-class model of the original
/// system: registering two actions under the same controller id makes them
/// share one exclusion lock.
#[derive(Default)]
pub struct HandlerRegistry {
    controllers: HashMap<ControllerId, ControllerEntry>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `(controller, action)`.
    ///
    /// Registering the same pair twice replaces the earlier handler.
    #[must_use]
    pub fn register<F>(
        mut self,
        controller: impl Into<ControllerId>,
        action: impl Into<ActionId>,
        handler: F,
    ) -> Self
    where
        F: Fn(HandlerArgs<'_>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        let entry = self
            .controllers
            .entry(controller.into())
            .or_insert_with(|| ControllerEntry {
                actions: HashMap::new(),
                exclusion: Mutex::new(()),
            });
        entry.actions.insert(action.into(), Box::new(handler));
        self
    }

    /// True if `(controller, action)` resolves to a handler.
    #[must_use]
    pub fn contains(&self, handler: &HandlerRef) -> bool {
        self.controllers
            .get(&handler.controller)
            .is_some_and(|entry| entry.actions.contains_key(&handler.action))
    }

    /// Number of registered controllers.
    #[must_use]
    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Invoke the handler behind `handler_ref`.
    ///
    /// With `exclusive` set (every non-GET method), the controller's lock
    /// is held for exactly the duration of the handler call.
    ///
    /// # Errors
    ///
    /// [`HandlerError::NotRegistered`] when the reference is dangling, or
    /// whatever the handler itself returns.
    pub fn invoke(
        &self,
        handler_ref: &HandlerRef,
        exclusive: bool,
        args: HandlerArgs<'_>,
    ) -> Result<Reply, HandlerError> {
        let entry = self
            .controllers
            .get(&handler_ref.controller)
            .ok_or_else(|| HandlerError::NotRegistered {
                handler: handler_ref.to_string(),
            })?;
        let action = entry
            .actions
            .get(&handler_ref.action)
            .ok_or_else(|| HandlerError::NotRegistered {
                handler: handler_ref.to_string(),
            })?;

        if exclusive {
            // A poisoned lock means a handler panicked while holding it;
            // the lock itself guards no data, so continuing is sound.
            let _guard = entry
                .exclusion
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            action(args)
        } else {
            action(args)
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("controllers", &self.controllers.len())
            .finish()
    }
}
