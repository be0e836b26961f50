// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Grouping of flat record rows into wire-format RRset operations.
//!
//! Rows are stably sorted by `(name, type, changetype)` and folded in one
//! linear pass. Within a REPLACE group:
//!
//! - the TTL of the first row wins; later TTLs are dropped
//! - `MX`, `CNAME`, `SRV` and `NS` contents get a trailing dot
//! - the first non-empty comment becomes the RRset's only comment
//! - repeated contents collapse to the first occurrence
//!
//! With pretty IPv6 PTRs enabled, a PTR owner written as an IPv6 literal is
//! turned back into its `ip6.arpa` name before sorting.

use super::policy::ApplyPolicy;
use crate::records::{ChangeOperation, ChangeType, Comment, RRType, RRset, ResourceRecordValue};
use crate::reverse::pretty_ipv6_to_reverse;
use tracing::debug;

/// One record value tagged with the operation it takes part in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    /// Absolute owner name
    pub name: String,
    pub rtype: RRType,
    pub changetype: ChangeType,
    pub ttl: u32,
    pub content: String,
    pub disabled: bool,
    pub comment: Option<String>,
}

impl FlatRecord {
    /// DELETE row for an existing RRset.
    #[must_use]
    pub fn delete(name: &str, rtype: RRType) -> Self {
        Self {
            name: name.to_string(),
            rtype,
            changetype: ChangeType::Delete,
            ttl: 0,
            content: String::new(),
            disabled: false,
            comment: None,
        }
    }
}

/// Operations for one apply call, in send order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedChanges {
    /// Sent first
    pub deletes: Vec<ChangeOperation>,
    /// Sent second
    pub replaces: Vec<ChangeOperation>,
}

impl GroupedChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.replaces.is_empty()
    }

    /// RRsets written by the replace batch.
    #[must_use]
    pub fn replaced_rrsets(&self) -> Vec<RRset> {
        self.replaces.iter().map(|op| op.rrset.clone()).collect()
    }
}

/// Append the trailing dot a name-valued content needs.
#[must_use]
pub fn canonicalize_content(rtype: &RRType, content: &str) -> String {
    if rtype.requires_trailing_dot() && !content.is_empty() && !content.ends_with('.') {
        format!("{content}.")
    } else {
        content.to_string()
    }
}

/// Owner name after pretty IPv6 PTR inversion.
#[must_use]
pub fn normalize_owner(row: &FlatRecord, policy: &ApplyPolicy) -> String {
    if policy.pretty_ipv6_ptr && row.rtype == RRType::PTR {
        if let Some(reverse) = pretty_ipv6_to_reverse(&row.name) {
            return reverse;
        }
    }
    row.name.clone()
}

/// Group rows sharing `(name, type, changetype)` into RRset operations.
#[must_use]
pub fn group_changes(rows: &[FlatRecord], policy: &ApplyPolicy) -> GroupedChanges {
    let mut normalized: Vec<FlatRecord> = rows
        .iter()
        .map(|row| FlatRecord {
            name: normalize_owner(row, policy),
            ..row.clone()
        })
        .collect();

    // sort_by is stable: rows of one group keep their submission order
    normalized.sort_by(|a, b| {
        (&a.name, &a.rtype, a.changetype).cmp(&(&b.name, &b.rtype, b.changetype))
    });

    let mut grouped = GroupedChanges::default();
    let mut current: Option<(ChangeType, RRset)> = None;

    for row in normalized {
        let same_group = current.as_ref().is_some_and(|(changetype, rrset)| {
            *changetype == row.changetype && rrset.name == row.name && rrset.rtype == row.rtype
        });

        if !same_group {
            if let Some(done) = current.take() {
                push_group(&mut grouped, done);
            }
            current = Some((
                row.changetype,
                RRset {
                    name: row.name.clone(),
                    rtype: row.rtype.clone(),
                    ttl: row.ttl,
                    records: Vec::new(),
                    comments: Vec::new(),
                },
            ));
        }

        let Some((ChangeType::Replace, rrset)) = current.as_mut() else {
            continue;
        };

        let content = canonicalize_content(&row.rtype, &row.content);
        if rrset.records.iter().any(|r| r.content == content) {
            debug!(rrset = %rrset.name, rtype = %rrset.rtype, content = %content, "Dropping repeated record content");
        } else {
            rrset
                .records
                .push(ResourceRecordValue::new(content, row.disabled));
        }

        if rrset.comments.is_empty() {
            if let Some(comment) = row.comment.as_deref().filter(|c| !c.is_empty()) {
                rrset.comments.push(Comment {
                    content: comment.to_string(),
                    account: String::new(),
                });
            }
        }
    }

    if let Some(done) = current.take() {
        push_group(&mut grouped, done);
    }

    debug!(
        deletes = grouped.deletes.len(),
        replaces = grouped.replaces.len(),
        "Grouped record rows into RRset operations"
    );
    grouped
}

fn push_group(grouped: &mut GroupedChanges, (changetype, rrset): (ChangeType, RRset)) {
    match changetype {
        ChangeType::Delete => grouped
            .deletes
            .push(ChangeOperation::delete(rrset.name, rrset.rtype)),
        ChangeType::Replace => grouped.replaces.push(ChangeOperation::replace(rrset)),
    }
}

#[cfg(test)]
#[path = "grouping_tests.rs"]
mod grouping_tests;
