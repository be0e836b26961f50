// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-apply policy resolved once at the engine entry point.

use crate::collaborators::{EditPolicy, SettingsStore};
use crate::constants::{SETTING_AUTO_PTR, SETTING_PRETTY_IPV6_PTR};
use crate::records::RRType;
use std::collections::HashSet;

/// Feature switches and edit permissions for one apply call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyPolicy {
    /// PTR owners may be written as IPv6 literals
    pub pretty_ipv6_ptr: bool,
    /// Maintain PTR records from A/AAAA changes
    pub auto_ptr: bool,
    /// Types the caller may delete
    pub editable_types: HashSet<RRType>,
}

impl ApplyPolicy {
    /// Resolve settings and permissions for `zone`.
    pub async fn resolve(
        zone: &str,
        settings: &dyn SettingsStore,
        edit_policy: &dyn EditPolicy,
    ) -> Self {
        Self {
            pretty_ipv6_ptr: settings
                .get_boolean_setting(SETTING_PRETTY_IPV6_PTR, None)
                .await,
            auto_ptr: settings
                .get_boolean_setting(SETTING_AUTO_PTR, Some(zone))
                .await,
            editable_types: edit_policy.editable_types(zone).await,
        }
    }

    /// Whether a current RRset of `rtype` may be removed through this path.
    #[must_use]
    pub fn may_delete(&self, rtype: &RRType) -> bool {
        *rtype != RRType::SOA && self.editable_types.contains(rtype)
    }
}
