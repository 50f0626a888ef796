//! Route descriptors: the declarative input to the table builder.
//!
//! A descriptor is passive data describing one endpoint. Descriptors are
//! supplied as plain values by whatever declaration mechanism the embedding
//! application uses (hand-written registration, a config file, a build
//! step); the engine never inspects language metadata itself.

use crate::convert::ParamType;
use crate::method::Method;
use std::fmt;

/// Identity of a handler-owning controller.
///
/// This is the key for handler lookup and for the mutual-exclusion lock
/// serializing mutating requests (§ the registry).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerId(String);

impl ControllerId {
    /// Create a controller identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identity of one handler action on a controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionId(String);

impl ActionId {
    /// Create an action identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identity as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Opaque reference to the handler bound to a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    /// The owning controller; also the mutual-exclusion key.
    pub controller: ControllerId,
    /// The action on that controller.
    pub action: ActionId,
}

impl HandlerRef {
    /// Create a handler reference.
    pub fn new(controller: impl Into<ControllerId>, action: impl Into<ActionId>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl From<(&str, &str)> for HandlerRef {
    fn from((controller, action): (&str, &str)) -> Self {
        Self::new(controller, action)
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.controller, self.action)
    }
}

/// One declared path parameter: name plus expected type, in the position
/// it is passed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Placeholder name this parameter binds to.
    pub name: String,
    /// Declared type.
    pub ty: ParamType,
}

impl ParamSpec {
    /// Create a parameter spec.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Declarative description of one endpoint.
///
/// Built with chained setters:
///
/// ```
/// use switchboard_core::{Method, ParamType, RouteDescriptor};
///
/// let descriptor = RouteDescriptor::new(Method::Put, "/users/{id}", ("Users", "update"))
///     .param("id", ParamType::Int)
///     .with_body();
/// ```
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    /// HTTP method this route answers.
    pub method: Method,
    /// The `/`-delimited path template.
    pub path_template: String,
    /// Declared parameters, in handler-invocation order.
    pub parameters: Vec<ParamSpec>,
    /// How many declared inputs bind the whole request body.
    ///
    /// Valid declarations have exactly one for POST/PUT and zero
    /// otherwise; other counts are representable so the table builder can
    /// report them instead of the constructor panicking.
    pub body_params: usize,
    /// The bound handler.
    pub handler: HandlerRef,
}

impl RouteDescriptor {
    /// Create a descriptor with no parameters and no body binding.
    pub fn new(
        method: Method,
        path_template: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) -> Self {
        Self {
            method,
            path_template: path_template.into(),
            parameters: Vec::new(),
            body_params: 0,
            handler: handler.into(),
        }
    }

    /// Append a declared path parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.parameters.push(ParamSpec::new(name, ty));
        self
    }

    /// Declare one whole-body input.
    #[must_use]
    pub fn with_body(mut self) -> Self {
        self.body_params += 1;
        self
    }

    /// `METHOD /path/template`, used in diagnostics.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }
}
