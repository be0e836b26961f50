// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reverse-name arithmetic for PTR maintenance.
//!
//! Reverse names are always absolute (`5.0.0.10.in-addr.arpa.`). Reverse zone
//! names are returned without the trailing dot, matching how zones are named
//! in the zone catalog.

use crate::constants::{
    IPV4_MAX_BOUNDARY, IPV4_REVERSE_SUFFIX, IPV6_MAX_BOUNDARY, IPV6_REVERSE_SUFFIX,
};
use std::net::{IpAddr, Ipv6Addr};

/// Reverse lookup name for an address.
///
/// # Example
///
/// ```rust
/// use zonesync::reverse::reverse_pointer;
///
/// let ip = "10.0.0.5".parse().unwrap();
/// assert_eq!(reverse_pointer(ip), "5.0.0.10.in-addr.arpa.");
/// ```
#[must_use]
pub fn reverse_pointer(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.{IPV4_REVERSE_SUFFIX}.",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let mut labels: Vec<String> = v6
                .octets()
                .iter()
                .flat_map(|byte| [byte >> 4, byte & 0x0f])
                .map(|nibble| format!("{nibble:x}"))
                .collect();
            labels.reverse();
            format!("{}.{IPV6_REVERSE_SUFFIX}.", labels.join("."))
        }
    }
}

/// Reverse lookup name for the content of an A or AAAA record.
///
/// Returns `None` when the content is not an address.
#[must_use]
pub fn reverse_pointer_for_content(content: &str) -> Option<String> {
    content.trim().parse::<IpAddr>().ok().map(reverse_pointer)
}

/// Convert a PTR owner written as an IPv6 literal back to `ip6.arpa` form.
///
/// Names already in reverse form, or that are not IPv6 literals, yield `None`.
#[must_use]
pub fn pretty_ipv6_to_reverse(name: &str) -> Option<String> {
    let literal = name.trim_end_matches('.');
    literal
        .parse::<Ipv6Addr>()
        .ok()
        .map(|v6| reverse_pointer(IpAddr::V6(v6)))
}

/// Reverse zone names that could hold `reverse_name`, narrowest first.
///
/// Each candidate strips `i` leading labels, for `i` in `1..=3` under
/// `in-addr.arpa` and `1..=31` under `ip6.arpa`. At least one address label
/// always remains above the suffix. Names outside both trees yield nothing.
#[must_use]
pub fn zone_candidates(reverse_name: &str) -> Vec<String> {
    let name = reverse_name.trim_end_matches('.').to_ascii_lowercase();
    let (suffix, max_boundary) = if name.ends_with(IPV6_REVERSE_SUFFIX) {
        (IPV6_REVERSE_SUFFIX, IPV6_MAX_BOUNDARY)
    } else if name.ends_with(IPV4_REVERSE_SUFFIX) {
        (IPV4_REVERSE_SUFFIX, IPV4_MAX_BOUNDARY)
    } else {
        return Vec::new();
    };

    let labels: Vec<&str> = name.split('.').collect();
    let suffix_labels = suffix.split('.').count();
    (1..=max_boundary)
        .take_while(|stripped| labels.len() > stripped + suffix_labels)
        .map(|stripped| labels[stripped..].join("."))
        .collect()
}

#[cfg(test)]
#[path = "reverse_tests.rs"]
mod reverse_tests;
