//! Handler replies and the wire envelope.
//!
//! Handlers produce a [`Reply`] — a status code and an opaque payload. On
//! the wire every payload, success or failure, is wrapped in the fixed
//! envelope `{"serverCode": <status>, "response": "<payload>"}`. The
//! envelope is part of the wire contract with existing clients and is kept
//! byte-compatible; only the serializer changed (serde instead of string
//! concatenation).

use serde::{Deserialize, Serialize};

/// The fixed payload for requests no route matched.
pub const NOT_FOUND_PAYLOAD: &str = "Invalid request";

/// A handler's outcome: status code plus opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Opaque payload, produced by the handler.
    pub payload: String,
}

impl Reply {
    /// Create a reply.
    pub fn new(status: u16, payload: impl Into<String>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    /// A 200 reply.
    pub fn ok(payload: impl Into<String>) -> Self {
        Self::new(200, payload)
    }

    /// A 201 reply.
    pub fn created(payload: impl Into<String>) -> Self {
        Self::new(201, payload)
    }
}

/// The wire envelope wrapping every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// The status code, duplicated into the body for clients that do not
    /// inspect the status line.
    #[serde(rename = "serverCode")]
    pub server_code: u16,
    /// The payload, embedded as a JSON string.
    pub response: String,
}

impl Envelope {
    /// Wrap a reply.
    #[must_use]
    pub fn from_reply(reply: &Reply) -> Self {
        Self {
            server_code: reply.status,
            response: reply.payload.clone(),
        }
    }

    /// The fixed not-found envelope.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            server_code: 404,
            response: NOT_FOUND_PAYLOAD.to_string(),
        }
    }

    /// Serialize to the wire form.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Serialization of a two-field struct of primitives cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}
