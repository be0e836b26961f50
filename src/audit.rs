// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Change audit records and their per-value reconstruction.
//!
//! Every apply persists one [`HistoryRecord`]: the RRsets it wrote
//! (`add_rrsets`) and the state those keys had before (`del_rrsets`). This
//! module turns such a pair back into a readable changelog.
//!
//! Each `(name, type)` key appearing on either side yields one
//! [`HistoryRecordEntry`]:
//!
//! | Present in          | `change_type` |
//! |---------------------|---------------|
//! | `add_rrsets` only   | `+`           |
//! | `del_rrsets` only   | `-`           |
//! | both                | `*`           |
//!
//! Record values are matched across the two sides by content alone. A value
//! whose content survives with a different `disabled` flag is a single
//! `status` change, never a deletion plus an addition.
//!
//! # Example
//!
//! ```rust
//! use zonesync::audit::{reconstruct, ChangeKind, HistoryRecord, ValueChangeKind};
//! use zonesync::records::{RRType, RRset, ResourceRecordValue};
//!
//! let rrset = |disabled| RRset {
//!     name: "a.example.com.".into(),
//!     rtype: RRType::A,
//!     ttl: 3600,
//!     records: vec![ResourceRecordValue::new("1.1.1.1", disabled)],
//!     comments: vec![],
//! };
//! let record = HistoryRecord::new("example.com", vec![rrset(true)], vec![rrset(false)], "admin");
//!
//! let entries = reconstruct(&record);
//! assert_eq!(entries[0].change_type, ChangeKind::Edited);
//! assert_eq!(entries[0].value_changes[0].kind, ValueChangeKind::Status);
//! ```

use crate::records::{RRType, RRset, RRsetKey, ResourceRecordValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One persisted apply: what was written and what it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub zone: String,
    #[serde(default)]
    pub add_rrsets: Vec<RRset>,
    #[serde(default)]
    pub del_rrsets: Vec<RRset>,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Record stamped with the current time.
    #[must_use]
    pub fn new(
        zone: &str,
        add_rrsets: Vec<RRset>,
        del_rrsets: Vec<RRset>,
        actor: &str,
    ) -> Self {
        Self {
            zone: zone.to_string(),
            add_rrsets,
            del_rrsets,
            actor: actor.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// How a whole RRset changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    #[serde(rename = "+")]
    Added,
    #[serde(rename = "-")]
    Deleted,
    #[serde(rename = "*")]
    Edited,
}

impl ChangeKind {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Deleted => '-',
            ChangeKind::Edited => '*',
        }
    }
}

/// RRset attribute that differs between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangedField {
    Name,
    Type,
    Ttl,
}

/// How a single record value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueChangeKind {
    Addition,
    Deletion,
    Status,
    Unchanged,
}

/// Old and new form of one record value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    pub old: Option<ResourceRecordValue>,
    pub new: Option<ResourceRecordValue>,
    pub kind: ValueChangeKind,
}

/// Changelog line for one `(name, type)` key of a [`HistoryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecordEntry<'a> {
    #[serde(skip)]
    pub source: &'a HistoryRecord,
    pub del_rrset: Option<&'a RRset>,
    pub add_rrset: Option<&'a RRset>,
    pub change_type: ChangeKind,
    pub changed_fields: Vec<ChangedField>,
    pub value_changes: Vec<ValueChange>,
}

impl HistoryRecordEntry<'_> {
    /// Owner name of the key this entry describes.
    #[must_use]
    pub fn name(&self) -> &str {
        self.add_rrset
            .or(self.del_rrset)
            .map_or("", |rrset| rrset.name.as_str())
    }

    /// Type of the key this entry describes.
    #[must_use]
    pub fn rtype(&self) -> Option<&RRType> {
        self.add_rrset.or(self.del_rrset).map(|rrset| &rrset.rtype)
    }
}

/// Classify every record value of one key.
///
/// Output order is fixed: one pass over the old values (status changes and
/// deletions, in old order), then additions, then unchanged values (both in
/// new order). When several values share a content, the first one found on
/// the other side is its match.
#[must_use]
pub fn get_record_changes(
    del_rrset: Option<&RRset>,
    add_rrset: Option<&RRset>,
) -> Vec<ValueChange> {
    let del_set: &[ResourceRecordValue] = del_rrset.map_or(&[], |r| r.records.as_slice());
    let add_set: &[ResourceRecordValue] = add_rrset.map_or(&[], |r| r.records.as_slice());
    let mut changes = Vec::new();

    for old in del_set {
        match add_set.iter().find(|new| new.content == old.content) {
            Some(new) if new.disabled != old.disabled => changes.push(ValueChange {
                old: Some(old.clone()),
                new: Some(new.clone()),
                kind: ValueChangeKind::Status,
            }),
            Some(_) => {}
            None => changes.push(ValueChange {
                old: Some(old.clone()),
                new: None,
                kind: ValueChangeKind::Deletion,
            }),
        }
    }

    for new in add_set {
        if !del_set.iter().any(|old| old.content == new.content) {
            changes.push(ValueChange {
                old: None,
                new: Some(new.clone()),
                kind: ValueChangeKind::Addition,
            });
        }
    }

    for new in add_set {
        let already_listed = changes
            .iter()
            .any(|c| c.new.as_ref().is_some_and(|n| n.content == new.content));
        if !already_listed {
            changes.push(ValueChange {
                old: Some(new.clone()),
                new: Some(new.clone()),
                kind: ValueChangeKind::Unchanged,
            });
        }
    }

    changes
}

/// Rebuild the changelog of `record`, one entry per key, ordered by `(name, type)`.
#[must_use]
pub fn reconstruct(record: &HistoryRecord) -> Vec<HistoryRecordEntry<'_>> {
    let mut keys: BTreeMap<RRsetKey, (Option<&RRset>, Option<&RRset>)> = BTreeMap::new();
    for rrset in &record.del_rrsets {
        let slot = &mut keys.entry(rrset.key()).or_default().0;
        if slot.is_none() {
            *slot = Some(rrset);
        }
    }
    for rrset in &record.add_rrsets {
        let slot = &mut keys.entry(rrset.key()).or_default().1;
        if slot.is_none() {
            *slot = Some(rrset);
        }
    }

    keys.into_values()
        .filter_map(|(del_rrset, add_rrset)| {
            let (change_type, changed_fields) = match (del_rrset, add_rrset) {
                (None, Some(_)) => (ChangeKind::Added, all_fields()),
                (Some(_), None) => (ChangeKind::Deleted, all_fields()),
                (Some(old), Some(new)) => {
                    let fields = if old.ttl == new.ttl {
                        Vec::new()
                    } else {
                        vec![ChangedField::Ttl]
                    };
                    (ChangeKind::Edited, fields)
                }
                (None, None) => return None,
            };
            Some(HistoryRecordEntry {
                source: record,
                del_rrset,
                add_rrset,
                change_type,
                changed_fields,
                value_changes: get_record_changes(del_rrset, add_rrset),
            })
        })
        .collect()
}

/// Entries of `record` for a single `(name, type)` key.
///
/// `name` is compared ignoring case and a trailing dot.
#[must_use]
pub fn reconstruct_for<'a>(
    record: &'a HistoryRecord,
    name: &str,
    rtype: &RRType,
) -> Vec<HistoryRecordEntry<'a>> {
    let wanted = name.trim_end_matches('.');
    reconstruct(record)
        .into_iter()
        .filter(|entry| {
            entry.rtype() == Some(rtype)
                && entry
                    .name()
                    .trim_end_matches('.')
                    .eq_ignore_ascii_case(wanted)
        })
        .collect()
}

fn all_fields() -> Vec<ChangedField> {
    vec![ChangedField::Name, ChangedField::Type, ChangedField::Ttl]
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod audit_tests;
