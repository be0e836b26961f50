// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-versus-current reconciliation at `(name, type)` granularity.
//!
//! Values are never diffed individually. A key whose desired RRset differs
//! from what the nameserver holds is recreated whole by a REPLACE; a key the
//! operator no longer lists is removed by a DELETE, provided its type is
//! editable and it is not the SOA.

use super::grouping::{group_changes, FlatRecord};
use super::policy::ApplyPolicy;
use crate::constants::{APEX_LABEL, DEFAULT_RECORD_TTL_SECS};
use crate::errors::ZoneSyncError;
use crate::records::{zone_fqdn, ChangeType, RRType, RRset, RRsetKey, RecordRow, RecordStatus};
use crate::reverse::pretty_ipv6_to_reverse;
use std::collections::{HashMap, HashSet};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, info, warn};

/// Result of comparing desired rows with the current zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One DELETE row per value of every RRset to remove
    pub deleted_records: Vec<FlatRecord>,
    /// Every desired row of every key to (re)create
    pub new_records: Vec<FlatRecord>,
    /// Current state of each deleted or replaced key, before the change
    pub prior_rrsets: Vec<RRset>,
}

impl Reconciliation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deleted_records.is_empty() && self.new_records.is_empty()
    }
}

/// Absolute owner name for a row label in `zone`.
///
/// `@` and the empty label are the apex; any other label is joined with
/// the zone name.
#[must_use]
pub fn resolve_record_name(zone: &str, record_name: &str) -> String {
    let label = record_name.trim();
    if label.is_empty() || label == APEX_LABEL {
        zone_fqdn(zone)
    } else {
        format!("{label}.{}", zone_fqdn(zone))
    }
}

/// Owner name of a desired row.
///
/// A PTR label written as an IPv6 literal becomes its `ip6.arpa` name when
/// pretty IPv6 PTRs are enabled. Every other label is resolved against the
/// zone.
fn owner_name(zone: &str, row: &RecordRow, policy: &ApplyPolicy) -> String {
    if policy.pretty_ipv6_ptr && row.record_type == RRType::PTR {
        if let Some(reverse) = pretty_ipv6_to_reverse(row.record_name.trim()) {
            return reverse;
        }
    }
    resolve_record_name(zone, &row.record_name)
}

fn resolve_record_data(zone: &str, row: &RecordRow) -> String {
    let data = row.record_data.trim();
    if row.record_type == RRType::CNAME && (data.is_empty() || data == APEX_LABEL) {
        zone_fqdn(zone)
    } else {
        data.to_string()
    }
}

fn validate_content(name: &str, rtype: &RRType, content: &str) -> Result<(), ZoneSyncError> {
    let invalid = |reason: String| ZoneSyncError::InvalidRecord {
        name: name.to_string(),
        reason,
    };
    match rtype {
        RRType::A => content
            .parse::<Ipv4Addr>()
            .map(|_| ())
            .map_err(|_| invalid(format!("'{content}' is not an IPv4 address"))),
        RRType::AAAA => content
            .parse::<Ipv6Addr>()
            .map(|_| ())
            .map_err(|_| invalid(format!("'{content}' is not an IPv6 address"))),
        _ if content.is_empty() => Err(invalid(format!("{rtype} record has no data"))),
        _ => Ok(()),
    }
}

/// Turn operator rows into REPLACE rows with absolute names and defaults applied.
///
/// # Errors
///
/// Returns [`ZoneSyncError::InvalidRecord`] when a row's data cannot be used.
pub fn desired_rows_to_flat(
    zone: &str,
    rows: &[RecordRow],
    policy: &ApplyPolicy,
) -> Result<Vec<FlatRecord>, ZoneSyncError> {
    let mut flat = Vec::with_capacity(rows.len());
    for row in rows {
        if row.record_type == RRType::SOA {
            warn!(zone = %zone, name = %row.record_name, "Ignoring submitted SOA row; SOA is not editable");
            continue;
        }
        let content = resolve_record_data(zone, row);
        let record = FlatRecord {
            name: owner_name(zone, row, policy),
            rtype: row.record_type.clone(),
            changetype: ChangeType::Replace,
            ttl: row.record_ttl.unwrap_or(DEFAULT_RECORD_TTL_SECS),
            content,
            disabled: row.record_status == RecordStatus::Disabled,
            comment: row.comment.clone(),
        };
        validate_content(&record.name, &record.rtype, &record.content)?;
        flat.push(record);
    }
    Ok(flat)
}

/// Compare desired rows with the zone's current RRsets.
///
/// # Errors
///
/// Returns [`ZoneSyncError::InvalidRecord`] when a desired row is unusable.
pub fn reconcile(
    zone: &str,
    desired: &[RecordRow],
    current: &[RRset],
    policy: &ApplyPolicy,
) -> Result<Reconciliation, ZoneSyncError> {
    let desired_flat = desired_rows_to_flat(zone, desired, policy)?;
    let desired_sets = group_changes(&desired_flat, policy).replaced_rrsets();

    let current_by_key: HashMap<RRsetKey, &RRset> =
        current.iter().map(|rrset| (rrset.key(), rrset)).collect();
    let desired_keys: HashSet<RRsetKey> = desired_sets.iter().map(RRset::key).collect();

    let mut reconciliation = Reconciliation::default();

    for rrset in current {
        if desired_keys.contains(&rrset.key()) {
            continue;
        }
        if !policy.may_delete(&rrset.rtype) {
            debug!(zone = %zone, rrset = %rrset.name, rtype = %rrset.rtype, "Keeping RRset outside edit policy");
            continue;
        }
        if rrset.records.is_empty() {
            reconciliation
                .deleted_records
                .push(FlatRecord::delete(&rrset.name, rrset.rtype.clone()));
        }
        for value in &rrset.records {
            reconciliation.deleted_records.push(FlatRecord {
                content: value.content.clone(),
                disabled: value.disabled,
                ttl: rrset.ttl,
                ..FlatRecord::delete(&rrset.name, rrset.rtype.clone())
            });
        }
        reconciliation.prior_rrsets.push(rrset.clone());
    }

    let mut changed_keys = HashSet::new();
    for rrset in &desired_sets {
        match current_by_key.get(&rrset.key()) {
            Some(existing) if existing.same_content(rrset) => {}
            Some(existing) => {
                changed_keys.insert(rrset.key());
                reconciliation.prior_rrsets.push((*existing).clone());
            }
            None => {
                changed_keys.insert(rrset.key());
            }
        }
    }

    reconciliation.new_records = desired_flat
        .into_iter()
        .filter(|row| {
            changed_keys.contains(&RRsetKey {
                name: row.name.clone(),
                rtype: row.rtype.clone(),
            })
        })
        .collect();

    info!(
        zone = %zone,
        deleted = reconciliation.deleted_records.len(),
        new = reconciliation.new_records.len(),
        unchanged = desired_sets.len() - changed_keys.len(),
        "Reconciled desired records against current zone"
    );
    Ok(reconciliation)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod reconcile_tests;
