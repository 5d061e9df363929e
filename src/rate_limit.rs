//! Rate-limit introspection over completed responses.
//!
//! Read-through accessors only; quota enforcement belongs to the host.

use chrono::{DateTime, TimeZone, Utc};

use crate::transport::TransportResponse;

/// Remaining request quota reported by `x-ratelimit-remaining`, if present
/// and numeric.
pub fn remaining_requests(response: &TransportResponse) -> Option<u64> {
    response.header("x-ratelimit-remaining")?.parse().ok()
}

/// Point-in-time quota view derived from the `x-ratelimit-*` headers.
///
/// Recomputed per call; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// When the quota window resets, from the epoch-seconds reset header.
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitSnapshot {
    pub fn from_response(response: &TransportResponse) -> Self {
        Self {
            limit: header_u64(response, "x-ratelimit-limit"),
            remaining: remaining_requests(response),
            reset_at: header_u64(response, "x-ratelimit-reset")
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single()),
        }
    }
}

fn header_u64(response: &TransportResponse, name: &str) -> Option<u64> {
    response.header(name)?.parse().ok()
}
