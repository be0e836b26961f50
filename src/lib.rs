// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # zonesync - Zone record reconciliation and change audit
//!
//! zonesync turns an operator's desired DNS record state into the RRset
//! operations a PowerDNS-compatible control API accepts, keeps PTR records in
//! step with forward A/AAAA changes, and rebuilds per-value changelogs from
//! the audit history it writes.
//!
//! ## Modules
//!
//! - [`records`] - RRset data model and wire shapes
//! - [`engine`] - Reconciliation, grouping, auto-PTR and apply orchestration
//! - [`audit`] - History records and change reconstruction
//! - [`collaborators`] - Traits for the control API, settings and history
//! - [`pdns`] - HTTP control API client
//! - [`memory`] - In-memory collaborators
//! - [`history`] - JSONL history store
//! - [`config`] - Environment and YAML configuration
//! - [`reverse`] - Reverse-name arithmetic
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zonesync::config::{Config, StaticSettings};
//! use zonesync::engine::{ApplyRequest, ZoneApplier};
//! use zonesync::history::JsonlHistoryStore;
//! use zonesync::pdns::PdnsClient;
//! use zonesync::records::{RRType, RecordRow};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env_or_yaml()?;
//! let client = Arc::new(PdnsClient::new(
//!     &config.api_url,
//!     &config.server_id,
//!     &config.api_key,
//!     config.timeout,
//! )?);
//! let settings = Arc::new(StaticSettings::new(config.clone()));
//! let history = Arc::new(JsonlHistoryStore::new(&config.history_path));
//! let applier = ZoneApplier::new(client.clone(), client, settings.clone(), settings, history);
//!
//! let outcome = applier
//!     .apply(&ApplyRequest {
//!         zone: "example.com".into(),
//!         records: vec![RecordRow::new("@", RRType::A, "192.0.2.1").with_ttl(3600)],
//!         actor: "admin".into(),
//!         serial: None,
//!     })
//!     .await;
//! println!("{}: {}", outcome.is_ok(), outcome.msg);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod history;
pub mod http_errors;
pub mod memory;
pub mod metrics;
pub mod pdns;
pub mod records;
pub mod reverse;
