//! Path parameter type conversion.
//!
//! Raw path segments are strings; handlers declare the type they expect.
//! Integer conversion has two policies, selected through
//! [`RouterConfig`](crate::RouterConfig):
//!
//! - [`ConversionPolicy::Reject`] (default): an unparseable value is a
//!   structured [`ConvertError`], surfaced to the client as a 400.
//! - [`ConversionPolicy::ZeroOnError`]: the value silently becomes 0. This
//!   reproduces the historical behavior of servers generated from endpoint
//!   annotations, where `Integer.parseInt` failures were swallowed, and
//!   exists only for wire compatibility with clients that depend on it.

use std::fmt;

/// Declared type of a path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// The raw segment, unchanged (empty allowed).
    Str,
    /// An `i64`, parsed from the segment.
    Int,
}

impl ParamType {
    /// Lowercase type name, used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A string parameter.
    Str(String),
    /// An integer parameter.
    Int(i64),
}

impl ParamValue {
    /// The integer value, if this is an [`ParamValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    /// The string value, if this is a [`ParamValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
        }
    }
}

/// What to do when an integer parameter fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    /// Fail the request with a structured [`ConvertError`] (default).
    #[default]
    Reject,
    /// Substitute 0 and continue. Legacy behavior, opt-in only.
    ZeroOnError,
}

/// A path segment could not be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    /// The parameter name from the route declaration.
    pub name: String,
    /// The raw segment value that failed to convert.
    pub value: String,
    /// The declared parameter type.
    pub expected: ParamType,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "path parameter '{}': cannot convert '{}' to {}",
            self.name, self.value, self.expected
        )
    }
}

impl std::error::Error for ConvertError {}

/// Convert a raw path segment to its declared type.
///
/// # Errors
///
/// Returns [`ConvertError`] only for `Int` parameters under
/// [`ConversionPolicy::Reject`]; `Str` conversion cannot fail.
pub fn convert(
    name: &str,
    raw: &str,
    expected: ParamType,
    policy: ConversionPolicy,
) -> Result<ParamValue, ConvertError> {
    match expected {
        ParamType::Str => Ok(ParamValue::Str(raw.to_string())),
        ParamType::Int => match raw.parse::<i64>() {
            Ok(n) => Ok(ParamValue::Int(n)),
            Err(_) => match policy {
                ConversionPolicy::ZeroOnError => Ok(ParamValue::Int(0)),
                ConversionPolicy::Reject => Err(ConvertError {
                    name: name.to_string(),
                    value: raw.to_string(),
                    expected,
                }),
            },
        },
    }
}
