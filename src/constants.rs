// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for zonesync.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Control API Constants
// ============================================================================

/// Default base URL of the nameserver control API
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8081";

/// Default server identifier used in control API paths
pub const DEFAULT_SERVER_ID: &str = "localhost";

/// Header carrying the control API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Default HTTP timeout for control API requests
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Record Constants
// ============================================================================

/// TTL applied to a desired record row that carries none (1 hour)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 3600;

/// Record name meaning "the zone apex"
pub const APEX_LABEL: &str = "@";

/// Record types editable when no edit policy is configured
pub const DEFAULT_EDITABLE_TYPES: &[&str] = &[
    "A", "AAAA", "ALIAS", "CAA", "CNAME", "LOC", "MX", "NS", "PTR", "SPF", "SRV", "TXT",
];

// ============================================================================
// Reverse Zone Constants
// ============================================================================

/// Suffix of IPv4 reverse names
pub const IPV4_REVERSE_SUFFIX: &str = "in-addr.arpa";

/// Suffix of IPv6 reverse names
pub const IPV6_REVERSE_SUFFIX: &str = "ip6.arpa";

/// Deepest IPv4 boundary probed (labels stripped from the reverse name)
pub const IPV4_MAX_BOUNDARY: usize = 3;

/// Deepest IPv6 boundary probed (nibbles stripped from the reverse name)
pub const IPV6_MAX_BOUNDARY: usize = 31;

/// Zone kind used when a reverse zone has to be created
pub const DEFAULT_REVERSE_ZONE_KIND: &str = "Master";

// ============================================================================
// Setting Names
// ============================================================================

/// Boolean setting enabling automatic PTR maintenance
pub const SETTING_AUTO_PTR: &str = "auto_ptr";

/// Boolean setting enabling IPv6 literals as PTR owner names
pub const SETTING_PRETTY_IPV6_PTR: &str = "pretty_ipv6_ptr";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of tokio worker threads for the CLI runtime
pub const TOKIO_WORKER_THREADS: usize = 2;

/// Default location of the append-only history log
pub const DEFAULT_HISTORY_PATH: &str = "zonesync-history.jsonl";
