//! HTTP method type.

use std::fmt;

/// HTTP method.
///
/// Parsing accepts only the canonical uppercase form; a lowercase method
/// token on the wire is not a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
    /// PATCH method.
    Patch,
    /// OPTIONS method.
    Options,
    /// HEAD method.
    Head,
    /// TRACE method.
    Trace,
}

impl Method {
    /// Parse a method from its canonical uppercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::from_bytes(s.as_bytes())
    }

    /// Parse a method from bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"GET" => Some(Self::Get),
            b"POST" => Some(Self::Post),
            b"PUT" => Some(Self::Put),
            b"DELETE" => Some(Self::Delete),
            b"PATCH" => Some(Self::Patch),
            b"OPTIONS" => Some(Self::Options),
            b"HEAD" => Some(Self::Head),
            b"TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Return the canonical uppercase method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Trace => "TRACE",
        }
    }

    /// True if routes for this method bind the request body to a handler
    /// parameter. Only POST and PUT carry a body in this system.
    #[must_use]
    pub const fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// True for GET, the one method dispatched without acquiring the
    /// owning controller's exclusion lock. Every other method is treated
    /// as mutating and serialized per controller.
    #[must_use]
    pub const fn is_get(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_canonical_uppercase_only() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("DELETE"), Some(Method::Delete));
        assert_eq!(Method::parse("get"), None);
        assert_eq!(Method::parse("Get"), None);
        assert_eq!(Method::parse(""), None);
        assert_eq!(Method::parse("FETCH"), None);
    }

    #[test]
    fn body_is_required_for_post_and_put_only() {
        assert!(Method::Post.requires_body());
        assert!(Method::Put.requires_body());
        assert!(!Method::Get.requires_body());
        assert!(!Method::Delete.requires_body());
        assert!(!Method::Patch.requires_body());
    }

    #[test]
    fn only_get_skips_the_exclusion_lock() {
        assert!(Method::Get.is_get());
        assert!(!Method::Post.is_get());
        assert!(!Method::Delete.is_get());
        assert!(!Method::Head.is_get());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for method in [
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Options,
            Method::Head,
            Method::Trace,
        ] {
            assert_eq!(Method::parse(method.as_str()), Some(method));
        }
    }
}
