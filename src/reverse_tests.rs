// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `reverse.rs`

use super::*;

#[test]
fn test_reverse_pointer_ipv4() {
    assert_eq!(
        reverse_pointer_for_content("10.0.0.5").unwrap(),
        "5.0.0.10.in-addr.arpa."
    );
}

#[test]
fn test_reverse_pointer_ipv6_has_32_nibbles() {
    let name = reverse_pointer_for_content("2001:db8::1").unwrap();
    assert_eq!(
        name,
        "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa."
    );
    assert_eq!(name.trim_end_matches(".ip6.arpa.").split('.').count(), 32);
}

#[test]
fn test_reverse_pointer_rejects_non_address() {
    assert!(reverse_pointer_for_content("host.example.com.").is_none());
}

#[test]
fn test_pretty_ipv6_to_reverse() {
    assert_eq!(
        pretty_ipv6_to_reverse("2001:db8::1").unwrap(),
        reverse_pointer_for_content("2001:db8::1").unwrap()
    );
    assert!(pretty_ipv6_to_reverse("2001:db8::1.").is_some());
    assert!(pretty_ipv6_to_reverse("1.0.0.0.ip6.arpa.").is_none());
    assert!(pretty_ipv6_to_reverse("10.0.0.1").is_none());
}

#[test]
fn test_zone_candidates_ipv4_narrowest_first() {
    assert_eq!(
        zone_candidates("5.0.0.10.in-addr.arpa."),
        vec![
            "0.0.10.in-addr.arpa".to_string(),
            "0.10.in-addr.arpa".to_string(),
            "10.in-addr.arpa".to_string(),
        ]
    );
}

#[test]
fn test_zone_candidates_ipv6_probes_31_boundaries() {
    let reverse = reverse_pointer_for_content("2001:db8::1").unwrap();
    let candidates = zone_candidates(&reverse);
    assert_eq!(candidates.len(), 31);
    assert_eq!(candidates.last().unwrap(), "2.ip6.arpa");
    assert!(candidates[0].starts_with("0.0.0.0"));
    assert!(candidates.iter().all(|c| c.ends_with("ip6.arpa")));
}

#[test]
fn test_zone_candidates_short_name_keeps_one_label() {
    assert_eq!(
        zone_candidates("0.10.in-addr.arpa"),
        vec!["10.in-addr.arpa".to_string()]
    );
}

#[test]
fn test_zone_candidates_forward_name_is_empty() {
    assert!(zone_candidates("www.example.com.").is_empty());
}
