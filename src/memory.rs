// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory implementations of the collaborator traits.
//!
//! [`InMemoryNameserver`] behaves like the control API closely enough to
//! drive the engine end to end without a network: RRsets are replaced and
//! deleted whole, every accepted PATCH bumps the zone serial, and a PATCH
//! naming the same RRset twice is rejected the way the real API rejects it.
//! Failures can be injected per PATCH call.
//!
//! [`InMemoryHistory`] keeps audit records in a vector.
//!
//! State lives behind `tokio::sync::RwLock`; nothing here is durable.

use crate::audit::HistoryRecord;
use crate::collaborators::{ControlApi, HistoryStore, ZoneCatalog, ZoneSnapshot};
use crate::errors::{ApiError, ZoneSyncError};
use crate::records::{zone_fqdn, ChangeOperation, ChangeType, RRset};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

/// One PATCH accepted or refused by the fake nameserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCall {
    pub zone: String,
    pub changes: Vec<ChangeOperation>,
}

/// Fake nameserver holding zones keyed by name without trailing dot.
#[derive(Debug, Default)]
pub struct InMemoryNameserver {
    zones: RwLock<BTreeMap<String, ZoneSnapshot>>,
    patches: RwLock<Vec<PatchCall>>,
    created: RwLock<Vec<(String, String)>>,
    failing_patch_calls: RwLock<HashSet<usize>>,
}

fn zone_key(zone: &str) -> String {
    zone.trim_end_matches('.').to_string()
}

fn not_found(zone: &str) -> ApiError {
    ApiError::UnexpectedHttpResponse {
        endpoint: format!("memory://zones/{}", zone_fqdn(zone)),
        status_code: 404,
        reason: "Could not find domain".to_string(),
    }
}

impl InMemoryNameserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a zone with the given serial and RRsets.
    pub async fn insert_zone(&self, zone: &str, serial: u32, rrsets: Vec<RRset>) {
        self.zones.write().await.insert(
            zone_key(zone),
            ZoneSnapshot {
                name: zone_fqdn(zone),
                serial,
                rrsets,
            },
        );
    }

    /// Make the `nth` PATCH call (0-based, counting all zones) fail with HTTP 500.
    pub async fn fail_patch_call(&self, nth: usize) {
        self.failing_patch_calls.write().await.insert(nth);
    }

    /// RRsets of `zone`, if it exists.
    pub async fn rrsets(&self, zone: &str) -> Option<Vec<RRset>> {
        self.zones
            .read()
            .await
            .get(&zone_key(zone))
            .map(|z| z.rrsets.clone())
    }

    /// Every PATCH call seen so far, including refused ones.
    pub async fn patch_calls(&self) -> Vec<PatchCall> {
        self.patches.read().await.clone()
    }

    /// `(name, kind)` of every zone created through the catalog.
    pub async fn created_zones(&self) -> Vec<(String, String)> {
        self.created.read().await.clone()
    }
}

#[async_trait]
impl ControlApi for InMemoryNameserver {
    async fn fetch_zone(&self, zone: &str) -> Result<ZoneSnapshot, ApiError> {
        self.zones
            .read()
            .await
            .get(&zone_key(zone))
            .cloned()
            .ok_or_else(|| not_found(zone))
    }

    async fn patch_rrsets(&self, zone: &str, changes: &[ChangeOperation]) -> Result<(), ApiError> {
        let call_index = {
            let mut patches = self.patches.write().await;
            patches.push(PatchCall {
                zone: zone_key(zone),
                changes: changes.to_vec(),
            });
            patches.len() - 1
        };

        if self.failing_patch_calls.read().await.contains(&call_index) {
            return Err(ApiError::UnexpectedHttpResponse {
                endpoint: format!("memory://zones/{}", zone_fqdn(zone)),
                status_code: 500,
                reason: "injected failure".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for change in changes {
            if !seen.insert(change.rrset.key()) {
                return Err(ApiError::UnexpectedHttpResponse {
                    endpoint: format!("memory://zones/{}", zone_fqdn(zone)),
                    status_code: 422,
                    reason: format!(
                        "Duplicate RRset {} IN {}",
                        change.rrset.name, change.rrset.rtype
                    ),
                });
            }
        }

        let mut zones = self.zones.write().await;
        let snapshot = zones.get_mut(&zone_key(zone)).ok_or_else(|| not_found(zone))?;
        for change in changes {
            let key = change.rrset.key();
            snapshot.rrsets.retain(|existing| existing.key() != key);
            if change.changetype == ChangeType::Replace && !change.rrset.records.is_empty() {
                snapshot.rrsets.push(change.rrset.clone());
            }
        }
        snapshot.serial += 1;
        Ok(())
    }
}

#[async_trait]
impl ZoneCatalog for InMemoryNameserver {
    async fn zone_exists(&self, name: &str) -> Result<bool, ApiError> {
        Ok(self.zones.read().await.contains_key(&zone_key(name)))
    }

    async fn create_zone(
        &self,
        name: &str,
        kind: &str,
        _masters: &[String],
    ) -> Result<(), ApiError> {
        let mut zones = self.zones.write().await;
        if zones.contains_key(&zone_key(name)) {
            return Err(ApiError::UnexpectedHttpResponse {
                endpoint: "memory://zones".to_string(),
                status_code: 409,
                reason: format!("Domain '{}' already exists", zone_fqdn(name)),
            });
        }
        zones.insert(
            zone_key(name),
            ZoneSnapshot {
                name: zone_fqdn(name),
                serial: 1,
                rrsets: Vec::new(),
            },
        );
        self.created
            .write()
            .await
            .push((zone_key(name), kind.to_string()));
        Ok(())
    }
}

/// Audit log kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<HistoryRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn persist_history(&self, record: &HistoryRecord) -> Result<(), ZoneSyncError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
