// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `history.rs`

use super::*;
use crate::records::{RRType, RRset, ResourceRecordValue};
use tempfile::TempDir;

fn sample(zone: &str, actor: &str) -> HistoryRecord {
    HistoryRecord::new(
        zone,
        vec![RRset {
            name: format!("www.{zone}."),
            rtype: RRType::A,
            ttl: 300,
            records: vec![ResourceRecordValue::new("192.0.2.1", false)],
            comments: Vec::new(),
        }],
        Vec::new(),
        actor,
    )
}

#[tokio::test]
async fn test_missing_file_is_empty_history() {
    let dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::new(dir.path().join("history.jsonl"));
    assert!(store.load(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persist_appends_one_line_per_record() {
    let dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::new(dir.path().join("history.jsonl"));

    let first = sample("example.com", "alice");
    let second = sample("example.org", "bob");
    store.persist_history(&first).await.unwrap();
    store.persist_history(&second).await.unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw.lines().count(), 2);

    let all = store.load(None).await.unwrap();
    assert_eq!(all, vec![first.clone(), second]);

    let only = store.load(Some("example.com.")).await.unwrap();
    assert_eq!(only, vec![first]);
}

#[tokio::test]
async fn test_unreadable_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.jsonl");
    let good = sample("example.com", "alice");
    let contents = format!(
        "{}\nnot json\n\n{}\n",
        serde_json::to_string(&good).unwrap(),
        serde_json::to_string(&good).unwrap()
    );
    std::fs::write(&path, contents).unwrap();

    let store = JsonlHistoryStore::new(&path);
    assert_eq!(store.load(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_unwritable_path_is_history_error() {
    let dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::new(dir.path().join("missing").join("history.jsonl"));
    let err = store
        .persist_history(&sample("example.com", "alice"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "history");
}
