// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to error reasons for control API failures.
//!
//! This module maps HTTP status codes returned by the nameserver control API
//! to a short machine-readable reason and a human-readable message. The
//! message ends up in the `msg` of an error result shown to the operator.
//!
//! # Usage
//!
//! ```rust
//! use zonesync::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "ZoneNotFound");
//! assert!(message.contains("404"));
//! ```

/// Request rejected as malformed (bad RRset, duplicate RRset in one PATCH, ...)
pub const REASON_BAD_REQUEST: &str = "ApiBadRequest";

/// API key missing or rejected
pub const REASON_AUTH_FAILED: &str = "ApiAuthFailed";

/// Zone or server id unknown to the nameserver
pub const REASON_ZONE_NOT_FOUND: &str = "ZoneNotFound";

/// Change rejected as semantically invalid
pub const REASON_UNPROCESSABLE: &str = "ApiUnprocessable";

/// Nameserver internal failure
pub const REASON_INTERNAL_ERROR: &str = "ApiInternalError";

/// Proxy or gateway in front of the API failed
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Anything else
pub const REASON_UNEXPECTED: &str = "ApiUnexpectedStatus";

/// Map HTTP status code to error reason and message.
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `ApiBadRequest` | Invalid request format |
/// | 401 | `ApiAuthFailed` | API key missing |
/// | 403 | `ApiAuthFailed` | API key rejected |
/// | 404 | `ZoneNotFound` | Zone not found |
/// | 422 | `ApiUnprocessable` | Change rejected |
/// | 500 | `ApiInternalError` | Internal server error |
/// | 502-504 | `GatewayError` | Gateway failure |
/// | Other | `ApiUnexpectedStatus` | Unexpected status |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_BAD_REQUEST,
            "Invalid request to control API (400)".into(),
        ),
        401 => (
            REASON_AUTH_FAILED,
            "Control API authentication required (401)".into(),
        ),
        403 => (
            REASON_AUTH_FAILED,
            "Control API authorization failed (403)".into(),
        ),
        404 => (
            REASON_ZONE_NOT_FOUND,
            "Zone not found on nameserver (404)".into(),
        ),
        422 => (
            REASON_UNPROCESSABLE,
            "Nameserver rejected the change (422)".into(),
        ),
        500 => (
            REASON_INTERNAL_ERROR,
            "Control API internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching control API (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "Control API unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching control API (504)".into(),
        ),
        _ => (
            REASON_UNEXPECTED,
            format!("Unexpected HTTP error from control API ({status_code})"),
        ),
    }
}

/// Message half of [`map_http_error_to_reason`].
#[must_use]
pub fn describe_http_status(status_code: u16) -> String {
    map_http_error_to_reason(status_code).1
}

#[cfg(test)]
#[path = "http_errors_tests.rs"]
mod http_errors_tests;
