// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `audit.rs`

use super::*;
use crate::engine::grouping::group_changes;
use crate::engine::policy::ApplyPolicy;
use crate::engine::reconcile::reconcile;
use crate::records::RecordRow;
use std::collections::HashSet;

fn value(content: &str, disabled: bool) -> ResourceRecordValue {
    ResourceRecordValue::new(content, disabled)
}

fn rrset(name: &str, rtype: RRType, ttl: u32, records: Vec<ResourceRecordValue>) -> RRset {
    RRset {
        name: name.to_string(),
        rtype,
        ttl,
        records,
        comments: Vec::new(),
    }
}

fn record(add: Vec<RRset>, del: Vec<RRset>) -> HistoryRecord {
    HistoryRecord::new("example.com", add, del, "tester")
}

#[test]
fn test_status_only_change_is_single_status_entry() {
    let history = record(
        vec![rrset("a.example.com.", RRType::A, 3600, vec![value("1.1.1.1", true)])],
        vec![rrset("a.example.com.", RRType::A, 3600, vec![value("1.1.1.1", false)])],
    );

    let entries = reconstruct(&history);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].change_type, ChangeKind::Edited);
    assert!(entries[0].changed_fields.is_empty());
    assert_eq!(
        entries[0].value_changes,
        vec![ValueChange {
            old: Some(value("1.1.1.1", false)),
            new: Some(value("1.1.1.1", true)),
            kind: ValueChangeKind::Status,
        }]
    );
}

#[test]
fn test_status_flip_among_other_values_never_splits() {
    let del = rrset(
        "a.example.com.",
        RRType::A,
        300,
        vec![value("1.1.1.1", false), value("2.2.2.2", false)],
    );
    let add = rrset(
        "a.example.com.",
        RRType::A,
        300,
        vec![value("2.2.2.2", true), value("3.3.3.3", false), value("1.1.1.1", false)],
    );

    let changes = get_record_changes(Some(&del), Some(&add));
    let kinds: Vec<ValueChangeKind> = changes.iter().map(|c| c.kind).collect();

    assert_eq!(
        kinds,
        vec![
            ValueChangeKind::Status,
            ValueChangeKind::Addition,
            ValueChangeKind::Unchanged,
        ]
    );
    assert_eq!(changes[0].old.as_ref().unwrap().content, "2.2.2.2");
    assert_eq!(changes[1].new.as_ref().unwrap().content, "3.3.3.3");
    assert_eq!(changes[2].new.as_ref().unwrap().content, "1.1.1.1");
}

#[test]
fn test_deletion_and_addition_ordering() {
    let del = rrset(
        "mx.example.com.",
        RRType::MX,
        3600,
        vec![value("10 a.example.com.", false), value("20 b.example.com.", false)],
    );
    let add = rrset(
        "mx.example.com.",
        RRType::MX,
        600,
        vec![value("30 c.example.com.", false)],
    );

    let changes = get_record_changes(Some(&del), Some(&add));
    let kinds: Vec<ValueChangeKind> = changes.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ValueChangeKind::Deletion,
            ValueChangeKind::Deletion,
            ValueChangeKind::Addition,
        ]
    );
    assert!(changes[0].new.is_none());
    assert!(changes[2].old.is_none());
}

#[test]
fn test_added_and_deleted_keys() {
    let history = record(
        vec![rrset("new.example.com.", RRType::TXT, 60, vec![value("\"hi\"", false)])],
        vec![rrset("old.example.com.", RRType::A, 60, vec![value("192.0.2.1", false)])],
    );

    let entries = reconstruct(&history);
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].name(), "new.example.com.");
    assert_eq!(entries[0].change_type, ChangeKind::Added);
    assert_eq!(entries[0].change_type.symbol(), '+');
    assert!(entries[0].del_rrset.is_none());
    assert_eq!(
        entries[0].changed_fields,
        vec![ChangedField::Name, ChangedField::Type, ChangedField::Ttl]
    );
    assert_eq!(entries[0].value_changes[0].kind, ValueChangeKind::Addition);

    assert_eq!(entries[1].name(), "old.example.com.");
    assert_eq!(entries[1].change_type, ChangeKind::Deleted);
    assert_eq!(entries[1].value_changes[0].kind, ValueChangeKind::Deletion);
}

#[test]
fn test_ttl_change_is_recorded_for_edits() {
    let history = record(
        vec![rrset("www.example.com.", RRType::A, 60, vec![value("192.0.2.1", false)])],
        vec![rrset("www.example.com.", RRType::A, 300, vec![value("192.0.2.1", false)])],
    );

    let entries = reconstruct(&history);
    assert_eq!(entries[0].changed_fields, vec![ChangedField::Ttl]);
    assert_eq!(entries[0].value_changes[0].kind, ValueChangeKind::Unchanged);
}

#[test]
fn test_entries_sorted_by_name_and_type() {
    let history = record(
        vec![
            rrset("b.example.com.", RRType::TXT, 60, vec![value("\"b\"", false)]),
            rrset("a.example.com.", RRType::TXT, 60, vec![value("\"a\"", false)]),
            rrset("a.example.com.", RRType::A, 60, vec![value("192.0.2.1", false)]),
        ],
        Vec::new(),
    );

    let keys: Vec<(String, RRType)> = reconstruct(&history)
        .iter()
        .map(|e| (e.name().to_string(), e.rtype().cloned().unwrap()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("a.example.com.".to_string(), RRType::A),
            ("a.example.com.".to_string(), RRType::TXT),
            ("b.example.com.".to_string(), RRType::TXT),
        ]
    );
}

#[test]
fn test_reconstruct_for_filters_one_key() {
    let history = record(
        vec![
            rrset("www.example.com.", RRType::A, 60, vec![value("192.0.2.1", false)]),
            rrset("www.example.com.", RRType::AAAA, 60, vec![value("2001:db8::1", false)]),
        ],
        Vec::new(),
    );

    let entries = reconstruct_for(&history, "WWW.example.com", &RRType::AAAA);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].rtype(), Some(&RRType::AAAA));
    assert!(std::ptr::eq(entries[0].source, &history));

    assert!(reconstruct_for(&history, "mail.example.com.", &RRType::A).is_empty());
}

#[test]
fn test_entry_serializes_with_symbols() {
    let history = record(
        vec![rrset("a.example.com.", RRType::A, 3600, vec![value("1.1.1.1", true)])],
        vec![rrset("a.example.com.", RRType::A, 3600, vec![value("1.1.1.1", false)])],
    );
    let entries = reconstruct(&history);
    let json = serde_json::to_value(&entries[0]).unwrap();

    assert_eq!(json["change_type"], "*");
    assert_eq!(json["value_changes"][0]["kind"], "status");
    assert_eq!(json["value_changes"][0]["old"]["disabled"], false);
    assert_eq!(json["value_changes"][0]["new"]["disabled"], true);
    assert!(json.get("source").is_none());
}

#[test]
fn test_history_record_json_roundtrip_keeps_timestamp() {
    let history = record(
        vec![rrset("a.example.com.", RRType::A, 3600, vec![value("1.1.1.1", false)])],
        Vec::new(),
    );
    let line = serde_json::to_string(&history).unwrap();
    let parsed: HistoryRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed, history);
}

/// Values present after the change, per key: additions, status targets and
/// unchanged values.
fn surviving_values(entry: &HistoryRecordEntry<'_>) -> HashSet<ResourceRecordValue> {
    entry
        .value_changes
        .iter()
        .filter(|c| c.kind != ValueChangeKind::Deletion)
        .filter_map(|c| c.new.clone())
        .collect()
}

#[test]
fn test_reconstruction_reproduces_written_rrsets() {
    let policy = ApplyPolicy {
        editable_types: [RRType::A, RRType::MX, RRType::TXT].into_iter().collect(),
        ..ApplyPolicy::default()
    };
    let current = vec![
        rrset(
            "www.example.com.",
            RRType::A,
            300,
            vec![value("192.0.2.1", false), value("192.0.2.2", false)],
        ),
        rrset("gone.example.com.", RRType::TXT, 300, vec![value("\"x\"", false)]),
        rrset("mail.example.com.", RRType::A, 300, vec![value("192.0.2.25", false)]),
    ];
    let desired = vec![
        RecordRow::new("www", RRType::A, "192.0.2.2").with_ttl(300),
        RecordRow::new("www", RRType::A, "192.0.2.3").with_ttl(300),
        RecordRow::new("mail", RRType::A, "192.0.2.25").with_ttl(300).disabled(),
        RecordRow::new("@", RRType::MX, "10 mail"),
    ];

    let reconciliation = reconcile("example.com", &desired, &current, &policy).unwrap();
    let mut rows = reconciliation.deleted_records.clone();
    rows.extend(reconciliation.new_records.clone());
    let written = group_changes(&rows, &policy).replaced_rrsets();

    let history = record(written.clone(), reconciliation.prior_rrsets.clone());
    let entries = reconstruct(&history);

    for rrset in &written {
        let entry = entries
            .iter()
            .find(|e| e.add_rrset.map(RRset::key) == Some(rrset.key()))
            .unwrap();
        let expected: HashSet<ResourceRecordValue> = rrset.records.iter().cloned().collect();
        assert_eq!(surviving_values(entry), expected, "key {}", rrset.name);
    }

    let mail = entries.iter().find(|e| e.name() == "mail.example.com.").unwrap();
    assert_eq!(mail.value_changes.len(), 1);
    assert_eq!(mail.value_changes[0].kind, ValueChangeKind::Status);

    let gone = entries.iter().find(|e| e.name() == "gone.example.com.").unwrap();
    assert_eq!(gone.change_type, ChangeKind::Deleted);
}

#[test]
fn test_additions_and_unchanged_rebuild_add_side_without_status_flips() {
    let del = rrset(
        "www.example.com.",
        RRType::A,
        300,
        vec![value("192.0.2.1", false), value("192.0.2.9", false)],
    );
    let add = rrset(
        "www.example.com.",
        RRType::A,
        300,
        vec![value("192.0.2.1", false), value("192.0.2.2", false)],
    );

    let rebuilt: Vec<ResourceRecordValue> = get_record_changes(Some(&del), Some(&add))
        .into_iter()
        .filter(|c| matches!(c.kind, ValueChangeKind::Addition | ValueChangeKind::Unchanged))
        .filter_map(|c| c.new)
        .collect();
    let rebuilt: HashSet<_> = rebuilt.into_iter().collect();
    let expected: HashSet<_> = add.records.iter().cloned().collect();
    assert_eq!(rebuilt, expected);
}
