//! Correlation types for request tracking
//!
//! Every HTTP request handled by ProspectFlow carries a `RequestId`; callers
//! may also propagate a `TraceId` from an upstream system. Both end up as
//! fields on the request span so that every log line of a multi-step
//! workflow (conversion, revert) can be grouped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying a caller-supplied request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying a caller-supplied trace id
pub const TRACE_ID_HEADER: &str = "x-trace-id";

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Accept an id supplied by a caller.
            ///
            /// Blank or oversized values are rejected so that a header can
            /// never inject an empty or unbounded field into the logs.
            pub fn parse(raw: &str) -> Option<Self> {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.len() > MAX_EXTERNAL_ID_LEN {
                    return None;
                }
                Some(Self(trimmed.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

const MAX_EXTERNAL_ID_LEN: usize = 128;

correlation_id!(
    /// Unique identifier for a single inbound request
    RequestId
);

correlation_id!(
    /// Identifier propagated from an upstream caller
    TraceId
);

/// Context carried through a request for correlation
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Build a context from optional header values.
    ///
    /// A missing or invalid request id is replaced by a generated one; a
    /// missing or invalid trace id is simply dropped.
    pub fn from_headers(request_id: Option<&str>, trace_id: Option<&str>) -> Self {
        Self {
            request_id: request_id
                .and_then(RequestId::parse)
                .unwrap_or_default(),
            trace_id: trace_id.and_then(TraceId::parse),
        }
    }

    /// Add a TraceId to the context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
