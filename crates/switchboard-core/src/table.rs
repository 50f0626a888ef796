//! Route table compilation.
//!
//! The builder validates each descriptor and compiles the survivors into
//! an ordered, immutable [`RouteTable`]. Compilation is best-effort: a bad
//! descriptor is reported and excluded, never fatal to the rest, so a
//! process can come up with a partial but valid route set. The builder
//! holds no state between builds; compiling the same descriptors twice
//! yields tables with identical match behavior.

use crate::convert::ParamType;
use crate::descriptor::{HandlerRef, ParamSpec, RouteDescriptor};
use crate::method::Method;
use crate::template::PathTemplate;
use std::fmt;

/// Why a descriptor was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// POST/PUT descriptor with no whole-body input declared.
    MissingBody,
    /// POST/PUT descriptor with more than one whole-body input declared.
    DuplicateBody {
        /// Number of body inputs declared.
        count: usize,
    },
    /// A declared parameter has no `{name}` placeholder segment in the
    /// template.
    UnknownPathParameter {
        /// The offending parameter name.
        name: String,
    },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBody => write!(f, "body parameter doesn't exist"),
            Self::DuplicateBody { count } => {
                write!(f, "too many body parameters ({} declared)", count)
            }
            Self::UnknownPathParameter { name } => {
                write!(f, "parameter '{}' has no placeholder in the path", name)
            }
        }
    }
}

/// A per-descriptor validation failure, reported but non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// `METHOD /path/template` of the offending descriptor.
    pub route: String,
    /// What was wrong with it.
    pub kind: ValidationErrorKind,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.route, self.kind)
    }
}

impl std::error::Error for ValidationError {}

/// A declared parameter bound to its placeholder's segment position.
///
/// The position is resolved once at build time; after a successful
/// structural match the request path has the same segment count as the
/// template, so the index is always in range.
#[derive(Debug, Clone)]
pub struct ParamBinding {
    /// Placeholder name.
    pub name: String,
    /// Declared type.
    pub ty: ParamType,
    /// Segment index in the split path.
    pub segment: usize,
}

/// A validated descriptor, compiled for matching.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    /// HTTP method this route answers.
    pub method: Method,
    /// Pre-parsed path template.
    pub template: PathTemplate,
    /// Parameter bindings, in handler-invocation order.
    pub bindings: Vec<ParamBinding>,
    /// Whether dispatch passes the request body to the handler.
    pub wants_body: bool,
    /// The bound handler.
    pub handler: HandlerRef,
}

impl CompiledRoute {
    /// `METHOD /path/template`, used in diagnostics.
    #[must_use]
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.template)
    }
}

/// The compiled, ordered, immutable route table.
///
/// Order is declaration order; the dispatcher takes the first structural
/// match. Shared read-only across worker threads without locking.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Iterate routes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    /// Number of compiled routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if no descriptor survived validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Outcome of a build: the table plus everything that was rejected.
#[derive(Debug)]
pub struct BuildReport {
    /// The compiled table (possibly empty).
    pub table: RouteTable,
    /// One entry per rejected declaration problem, in input order.
    pub errors: Vec<ValidationError>,
}

impl BuildReport {
    /// True if every descriptor compiled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collects descriptors and compiles them into a [`RouteTable`].
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    descriptors: Vec<RouteDescriptor>,
}

impl RouteTableBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor. Declaration order is matching order.
    #[must_use]
    pub fn descriptor(mut self, descriptor: RouteDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Append many descriptors.
    #[must_use]
    pub fn descriptors(mut self, descriptors: impl IntoIterator<Item = RouteDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// Validate and compile.
    ///
    /// Each descriptor is checked for body arity (POST/PUT must declare
    /// exactly one whole-body input; other methods are never checked) and
    /// path-parameter consistency (every declared name must have a
    /// `{name}` placeholder segment). A descriptor with any error is
    /// excluded; all of its errors are reported.
    #[must_use]
    pub fn build(self) -> BuildReport {
        let mut table = RouteTable::default();
        let mut errors = Vec::new();

        for descriptor in self.descriptors {
            if let Some(route) = compile(&descriptor, &mut errors) {
                table.routes.push(route);
            }
        }

        BuildReport { table, errors }
    }
}

fn compile(
    descriptor: &RouteDescriptor,
    errors: &mut Vec<ValidationError>,
) -> Option<CompiledRoute> {
    let before = errors.len();
    let template = PathTemplate::parse(&descriptor.path_template);

    if descriptor.method.requires_body() {
        match descriptor.body_params {
            1 => {}
            0 => errors.push(ValidationError {
                route: descriptor.signature(),
                kind: ValidationErrorKind::MissingBody,
            }),
            count => errors.push(ValidationError {
                route: descriptor.signature(),
                kind: ValidationErrorKind::DuplicateBody { count },
            }),
        }
    }

    let mut bindings = Vec::with_capacity(descriptor.parameters.len());
    for ParamSpec { name, ty } in &descriptor.parameters {
        match template.placeholder_index(name) {
            Some(segment) => bindings.push(ParamBinding {
                name: name.clone(),
                ty: *ty,
                segment,
            }),
            None => errors.push(ValidationError {
                route: descriptor.signature(),
                kind: ValidationErrorKind::UnknownPathParameter { name: name.clone() },
            }),
        }
    }

    if errors.len() > before {
        return None;
    }

    Some(CompiledRoute {
        method: descriptor.method,
        template,
        bindings,
        wants_body: descriptor.method.requires_body(),
        handler: descriptor.handler.clone(),
    })
}
