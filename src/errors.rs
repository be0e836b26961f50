// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Control API and engine error types for zonesync.
//!
//! This module provides specialized error types for:
//! - Nameserver control API transport and response failures
//! - Optimistic-concurrency conflicts on zone serials
//! - Partially applied change batches
//! - Automatic PTR maintenance failures
//!
//! Every error here is an expected domain outcome. The engine converts them
//! into a tagged `{status, msg}` result at its boundary so callers can map
//! them to a user-facing response without inspecting raw faults.

use thiserror::Error;

/// Errors returned by the nameserver control API client.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// HTTP connection failed (network unreachable, connection refused, timeout)
    #[error("HTTP connection to {endpoint} failed: {reason}")]
    HttpConnectionFailed {
        /// The URL that couldn't be reached
        endpoint: String,
        /// Reason for the connection failure
        reason: String,
    },

    /// Non-success HTTP status from the control API
    #[error("Unexpected HTTP response from {endpoint}: {status_code} {reason}")]
    UnexpectedHttpResponse {
        /// The URL that returned the response
        endpoint: String,
        /// HTTP status code
        status_code: u16,
        /// Response body or error message
        reason: String,
    },

    /// A success status whose JSON body still carries an `error` member
    #[error("Control API at {endpoint} reported an error: {message}")]
    EmbeddedError {
        /// The URL that returned the payload
        endpoint: String,
        /// Content of the `error` member
        message: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response from {endpoint}: {reason}")]
    InvalidResponse {
        /// The URL that returned the payload
        endpoint: String,
        /// Decoder error
        reason: String,
    },
}

impl ApiError {
    /// HTTP status code, when the failure carried one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedHttpResponse { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Short category label of the control API error metric.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::HttpConnectionFailed { .. } => "connection",
            ApiError::UnexpectedHttpResponse { .. } => "http_status",
            ApiError::EmbeddedError { .. } => "embedded",
            ApiError::InvalidResponse { .. } => "decode",
        }
    }

    /// Machine-readable reason: the HTTP reason code for status failures,
    /// the category otherwise.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self.status_code() {
            Some(code) => crate::http_errors::map_http_error_to_reason(code).0,
            None => self.category(),
        }
    }
}

/// Errors surfaced by the reconciliation, apply and auto-PTR paths.
#[derive(Error, Debug, Clone)]
pub enum ZoneSyncError {
    /// Control API rejected a request; nothing from this step was applied
    #[error("Control API error for zone '{zone}': {message}")]
    RemoteApi {
        /// Zone being modified
        zone: String,
        /// Operator-readable message
        message: String,
    },

    /// Submitted serial no longer matches the zone's serial
    #[error("Zone '{zone}' changed since it was loaded (serial {submitted} != {current}); refresh and retry")]
    Conflict {
        /// Zone being modified
        zone: String,
        /// Serial the caller based its edit on
        submitted: u32,
        /// Serial currently served
        current: u32,
    },

    /// The delete batch was applied but the replace batch was not
    #[error("Zone '{zone}' partially updated: {applied} applied, {failed} failed: {message}")]
    PartialFailure {
        /// Zone being modified
        zone: String,
        /// Batch that went through
        applied: String,
        /// Batch that failed
        failed: String,
        /// Underlying failure
        message: String,
    },

    /// Reverse-zone maintenance failed after the forward change was applied
    #[error("Auto-PTR update failed for zone '{zone}': {message}")]
    AutoPtr {
        /// Forward zone that triggered the update
        zone: String,
        /// Underlying failure
        message: String,
    },

    /// Record input failed validation before anything was sent
    #[error("Invalid record data for '{name}': {reason}")]
    InvalidRecord {
        /// Record name (may be empty when the failure is type-level)
        name: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Audit history could not be written or read
    #[error("History store failure: {reason}")]
    History {
        /// Underlying failure
        reason: String,
    },
}

impl ZoneSyncError {
    /// Wrap a control API failure for `zone`.
    #[must_use]
    pub fn remote(zone: &str, err: &ApiError) -> Self {
        let message = match err.status_code() {
            Some(code) => format!(
                "{} ({err})",
                crate::http_errors::describe_http_status(code)
            ),
            None => err.to_string(),
        };
        ZoneSyncError::RemoteApi {
            zone: zone.to_string(),
            message,
        }
    }

    /// Stable label for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ZoneSyncError::RemoteApi { .. } => "remote_api",
            ZoneSyncError::Conflict { .. } => "conflict",
            ZoneSyncError::PartialFailure { .. } => "partial_failure",
            ZoneSyncError::AutoPtr { .. } => "auto_ptr",
            ZoneSyncError::InvalidRecord { .. } => "invalid_record",
            ZoneSyncError::History { .. } => "history",
        }
    }

    /// Whether the caller should reload the zone and resubmit.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ZoneSyncError::Conflict { .. })
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
