//! Path template parsing and matching.
//!
//! A template is a `/`-delimited pattern whose segments are either literals
//! or named placeholders written `{name}`. A placeholder binds exactly one
//! path segment; there are no multi-segment wildcards, optional segments,
//! or regexes, so matching is a single O(segment count) pass with no
//! backtracking.
//!
//! Splitting preserves empty segments. A leading `/` yields a leading empty
//! segment on both the template and the request path, which keeps the two
//! aligned position-for-position, and it makes `/health` and `/health/`
//! structurally different paths (the latter has one more segment).

use std::fmt;

/// Split a path or template on `/`, preserving empty segments.
#[must_use]
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

/// True if a raw segment is a `{name}` placeholder.
///
/// The braces must enclose at least one character, so `{}` is a literal.
#[must_use]
pub fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// One parsed segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// A literal segment, compared case-sensitively. May be empty.
    Literal(String),
    /// A named placeholder, matching any single non-empty request segment.
    Placeholder(String),
}

/// A parsed, matchable path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    /// Parse a template string into its segments.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let segments = split_segments(template)
            .into_iter()
            .map(|seg| {
                if is_placeholder(seg) {
                    TemplateSegment::Placeholder(seg[1..seg.len() - 1].to_string())
                } else {
                    TemplateSegment::Literal(seg.to_string())
                }
            })
            .collect();
        Self {
            raw: template.to_string(),
            segments,
        }
    }

    /// The original template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Match this template against a pre-split request path.
    ///
    /// Segment counts must be equal. Literals compare exactly, including
    /// empty literals (an empty template segment only ever matches an empty
    /// request segment, never acts as a wildcard). Placeholders match any
    /// non-empty request segment; type validation happens at extraction
    /// time, not here.
    #[must_use]
    pub fn matches(&self, request_segments: &[&str]) -> bool {
        if self.segments.len() != request_segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(request_segments)
            .all(|(template_seg, request_seg)| match template_seg {
                TemplateSegment::Literal(lit) => lit == request_seg,
                TemplateSegment::Placeholder(_) => !request_seg.is_empty(),
            })
    }

    /// Position of the first placeholder with the given name, if any.
    #[must_use]
    pub fn placeholder_index(&self, name: &str) -> Option<usize> {
        self.segments.iter().position(|seg| {
            matches!(seg, TemplateSegment::Placeholder(n) if n == name)
        })
    }

    /// Names of all placeholders, in template order.
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|seg| match seg {
            TemplateSegment::Placeholder(name) => Some(name.as_str()),
            TemplateSegment::Literal(_) => None,
        })
    }

    /// Extract the raw request segment bound to a placeholder, by name.
    ///
    /// The lookup is positional against the first `{name}` segment of the
    /// template, so the order parameters are declared in need not follow
    /// the order placeholders appear in the path.
    #[must_use]
    pub fn extract_raw<'a>(&self, request_segments: &[&'a str], name: &str) -> Option<&'a str> {
        let index = self.placeholder_index(name)?;
        request_segments.get(index).copied()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
