// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record data model shared by the engine, the audit reconstructor and the
//! control API client.
//!
//! The structs here mirror the JSON the nameserver control API speaks:
//!
//! ```text
//! add/replace: {"name":"www.example.com.","type":"A","changetype":"REPLACE","ttl":3600,
//!               "records":[{"content":"192.0.2.1","disabled":false}],
//!               "comments":[{"content":"web","account":""}]}
//! delete:      {"name":"www.example.com.","type":"A","changetype":"DELETE","records":[]}
//! ```

pub mod rrtype;

pub use rrtype::RRType;

use crate::errors::ZoneSyncError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One value within an RRset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRecordValue {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
}

impl ResourceRecordValue {
    #[must_use]
    pub fn new(content: impl Into<String>, disabled: bool) -> Self {
        Self {
            content: content.into(),
            disabled,
        }
    }
}

/// Comment attached to an RRset. `account` is the comment author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
    #[serde(default)]
    pub account: String,
}

/// A set of records sharing one owner name and type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RRset {
    /// Absolute owner name with trailing dot
    pub name: String,
    #[serde(rename = "type", deserialize_with = "rrtype::deserialize_lenient")]
    pub rtype: RRType,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub records: Vec<ResourceRecordValue>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl RRset {
    /// Identity of the RRset within a zone.
    #[must_use]
    pub fn key(&self) -> RRsetKey {
        RRsetKey {
            name: self.name.clone(),
            rtype: self.rtype.clone(),
        }
    }

    /// Same TTL, same values regardless of order, same comment text.
    #[must_use]
    pub fn same_content(&self, other: &RRset) -> bool {
        if self.ttl != other.ttl || self.records.len() != other.records.len() {
            return false;
        }
        let mut mine: Vec<&ResourceRecordValue> = self.records.iter().collect();
        let mut theirs: Vec<&ResourceRecordValue> = other.records.iter().collect();
        mine.sort_by(|a, b| (&a.content, a.disabled).cmp(&(&b.content, b.disabled)));
        theirs.sort_by(|a, b| (&a.content, a.disabled).cmp(&(&b.content, b.disabled)));
        if mine != theirs {
            return false;
        }
        let comment_text = |set: &RRset| set.comments.first().map(|c| c.content.clone());
        comment_text(self) == comment_text(other)
    }
}

/// `(name, type)` identity of an RRset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RRsetKey {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: RRType,
}

/// Wire-level operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

/// One RRset-level mutation for the control API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOperation {
    pub changetype: ChangeType,
    pub rrset: RRset,
}

impl ChangeOperation {
    #[must_use]
    pub fn replace(rrset: RRset) -> Self {
        Self {
            changetype: ChangeType::Replace,
            rrset,
        }
    }

    /// DELETE carries only the identity; the body is always empty.
    #[must_use]
    pub fn delete(name: impl Into<String>, rtype: RRType) -> Self {
        Self {
            changetype: ChangeType::Delete,
            rrset: RRset {
                name: name.into(),
                rtype,
                ttl: 0,
                records: Vec::new(),
                comments: Vec::new(),
            },
        }
    }
}

#[derive(Serialize)]
struct WireRRset<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    rtype: &'a RRType,
    changetype: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    records: &'a [ResourceRecordValue],
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<&'a [Comment]>,
}

impl Serialize for ChangeOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self.changetype {
            ChangeType::Replace => WireRRset {
                name: &self.rrset.name,
                rtype: &self.rrset.rtype,
                changetype: ChangeType::Replace,
                ttl: Some(self.rrset.ttl),
                records: &self.rrset.records,
                comments: Some(&self.rrset.comments),
            },
            ChangeType::Delete => WireRRset {
                name: &self.rrset.name,
                rtype: &self.rrset.rtype,
                changetype: ChangeType::Delete,
                ttl: None,
                records: &[],
                comments: None,
            },
        };
        wire.serialize(serializer)
    }
}

/// PATCH body for the zone endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PatchBody<'a> {
    pub rrsets: &'a [ChangeOperation],
}

/// Status of a desired record row as submitted by the operator.
///
/// Parsed case-insensitively; serialized as `Active` or `Disabled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordStatus {
    #[default]
    Active,
    Disabled,
}

impl RecordStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "Active",
            RecordStatus::Disabled => "Disabled",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = ZoneSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("active") {
            Ok(RecordStatus::Active)
        } else if value.eq_ignore_ascii_case("disabled") {
            Ok(RecordStatus::Disabled)
        } else {
            Err(ZoneSyncError::InvalidRecord {
                name: String::new(),
                reason: format!("unsupported record status '{s}', expected Active or Disabled"),
            })
        }
    }
}

impl TryFrom<String> for RecordStatus {
    type Error = ZoneSyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordStatus> for String {
    fn from(value: RecordStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One desired record value for a zone, as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    /// Label relative to the zone; `@` or empty means the apex
    #[serde(default)]
    pub record_name: String,
    pub record_type: RRType,
    #[serde(default)]
    pub record_data: String,
    #[serde(default)]
    pub record_ttl: Option<u32>,
    #[serde(default)]
    pub record_status: RecordStatus,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RecordRow {
    #[must_use]
    pub fn new(name: &str, rtype: RRType, data: &str) -> Self {
        Self {
            record_name: name.to_string(),
            record_type: rtype,
            record_data: data.to_string(),
            record_ttl: None,
            record_status: RecordStatus::Active,
            comment: None,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.record_ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.record_status = RecordStatus::Disabled;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Absolute form of a zone name (`example.com` -> `example.com.`).
#[must_use]
pub fn zone_fqdn(zone: &str) -> String {
    format!("{}.", zone.trim_end_matches('.'))
}
