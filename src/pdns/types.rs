// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request and response bodies of the nameserver control API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/servers/{server_id}/zones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateZoneRequest {
    /// Absolute zone name
    pub name: String,
    pub kind: String,
    pub masters: Vec<String>,
    pub nameservers: Vec<String>,
}

/// Error payload; the API may send it with a success status too.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Extract the `error` member of a JSON object body, if present.
    #[must_use]
    pub fn parse(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error)
    }
}
