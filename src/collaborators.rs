// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Seams to the systems the engine depends on.
//!
//! The engine never reaches for global state. Everything it reads or writes
//! outside its own inputs goes through one of these traits:
//!
//! - [`ControlApi`] - current zone state and RRset mutations on the nameserver
//! - [`ZoneCatalog`] - zone existence and creation (used for reverse zones)
//! - [`SettingsStore`] - boolean feature switches, optionally zone-scoped
//! - [`EditPolicy`] - record types the caller may modify in a zone
//! - [`HistoryStore`] - append-only audit log

use crate::audit::HistoryRecord;
use crate::errors::{ApiError, ZoneSyncError};
use crate::records::{ChangeOperation, RRType, RRset};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current state of a zone as served by the nameserver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub serial: u32,
    #[serde(default)]
    pub rrsets: Vec<RRset>,
}

/// Nameserver control API.
#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Fetch the zone's serial and full RRset list.
    async fn fetch_zone(&self, zone: &str) -> Result<ZoneSnapshot, ApiError>;

    /// Apply one batch of RRset operations in a single request.
    async fn patch_rrsets(&self, zone: &str, changes: &[ChangeOperation]) -> Result<(), ApiError>;
}

/// Zone lifecycle operations.
#[async_trait]
pub trait ZoneCatalog: Send + Sync {
    /// Whether a zone with exactly this name exists.
    async fn zone_exists(&self, name: &str) -> Result<bool, ApiError>;

    /// Create an empty zone.
    async fn create_zone(&self, name: &str, kind: &str, masters: &[String])
        -> Result<(), ApiError>;
}

/// Boolean settings lookup.
///
/// Implementations resolve zone-scoped values first and fall back to the
/// global value when the zone has none.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_boolean_setting(&self, name: &str, zone: Option<&str>) -> bool;
}

/// Record types the caller is allowed to modify.
#[async_trait]
pub trait EditPolicy: Send + Sync {
    async fn editable_types(&self, zone: &str) -> HashSet<RRType>;
}

/// Append-only audit log.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn persist_history(&self, record: &HistoryRecord) -> Result<(), ZoneSyncError>;
}
