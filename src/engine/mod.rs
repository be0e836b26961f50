// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone apply orchestration.
//!
//! [`ZoneApplier`] drives one apply from desired rows to nameserver state:
//!
//! 1. Resolve the [`ApplyPolicy`] for the zone once
//! 2. Fetch the zone; reject a stale caller serial with a conflict
//! 3. Reconcile desired rows against current RRsets and group them
//! 4. PATCH the delete batch, then the replace batch (empty batches are skipped)
//! 5. Maintain PTR records when auto-PTR is enabled
//! 6. Persist the change to the audit history
//!
//! Nothing is transactional. A replace batch failing after the delete batch
//! went through is reported as [`ZoneSyncError::PartialFailure`] and left as
//! is; reverse-zone changes are never rolled back.
//!
//! [`ZoneApplier::apply`] is the boundary: every failure becomes an
//! [`ApplyOutcome`] with `status: "error"`.

pub mod auto_ptr;
pub mod grouping;
pub mod policy;
pub mod reconcile;

use crate::audit::HistoryRecord;
use crate::collaborators::{ControlApi, EditPolicy, HistoryStore, SettingsStore, ZoneCatalog};
use crate::errors::ZoneSyncError;
use crate::metrics;
use crate::records::{ChangeOperation, RecordRow};
use auto_ptr::{AutoPtrReport, AutoPtrSynchronizer, PtrChanges, ReverseZoneTemplate};
use grouping::{group_changes, GroupedChanges};
use policy::ApplyPolicy;
use reconcile::{reconcile, Reconciliation};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// One apply call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRequest {
    pub zone: String,
    /// Complete desired record state of the zone
    pub records: Vec<RecordRow>,
    /// Recorded in the audit history
    pub actor: String,
    /// Zone serial the caller based its edit on, if it wants the guard
    pub serial: Option<u32>,
}

/// What a successful apply did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub zone: String,
    /// RRsets removed by the delete batch
    pub deleted: usize,
    /// RRsets written by the replace batch
    pub replaced: usize,
    pub auto_ptr: Option<AutoPtrReport>,
}

impl ApplySummary {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.deleted == 0 && self.replaced == 0
    }

    #[must_use]
    pub fn message(&self) -> String {
        if self.is_noop() {
            return format!("No changes to apply to zone {}", self.zone);
        }
        let mut msg = format!(
            "Applied changes to zone {}: {} RRset(s) deleted, {} RRset(s) replaced",
            self.zone, self.deleted, self.replaced
        );
        if let Some(report) = &self.auto_ptr {
            msg.push_str(&format!(
                "; {} PTR(s) added, {} PTR(s) deleted",
                report.ptr_added, report.ptr_deleted
            ));
        }
        msg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyStatus {
    Ok,
    Error,
}

/// Tagged result returned to callers of [`ZoneApplier::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub status: ApplyStatus,
    pub msg: String,
}

impl ApplyOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ApplyStatus::Ok
    }
}

impl From<Result<ApplySummary, ZoneSyncError>> for ApplyOutcome {
    fn from(result: Result<ApplySummary, ZoneSyncError>) -> Self {
        match result {
            Ok(summary) => Self {
                status: ApplyStatus::Ok,
                msg: summary.message(),
            },
            Err(e) => Self {
                status: ApplyStatus::Error,
                msg: e.to_string(),
            },
        }
    }
}

/// Batches an apply would send, computed without touching the nameserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyPlan {
    pub zone: String,
    /// Serial of the zone the plan was computed against
    pub serial: u32,
    pub deletes: Vec<ChangeOperation>,
    pub replaces: Vec<ChangeOperation>,
    /// PTRs that would be written; zero unless auto-PTR is enabled
    pub ptr_additions: usize,
    /// PTRs that would be removed; zero unless auto-PTR is enabled
    pub ptr_removals: usize,
}

impl ApplyPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.replaces.is_empty()
    }
}

/// State computed before anything is sent.
struct Prepared {
    policy: ApplyPolicy,
    serial: u32,
    reconciliation: Reconciliation,
    grouped: GroupedChanges,
}

/// Applies desired record state to zones through the collaborator seams.
#[derive(Clone)]
pub struct ZoneApplier {
    api: Arc<dyn ControlApi>,
    catalog: Arc<dyn ZoneCatalog>,
    settings: Arc<dyn SettingsStore>,
    edit_policy: Arc<dyn EditPolicy>,
    history: Arc<dyn HistoryStore>,
    reverse_zone: ReverseZoneTemplate,
}

impl ZoneApplier {
    #[must_use]
    pub fn new(
        api: Arc<dyn ControlApi>,
        catalog: Arc<dyn ZoneCatalog>,
        settings: Arc<dyn SettingsStore>,
        edit_policy: Arc<dyn EditPolicy>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            api,
            catalog,
            settings,
            edit_policy,
            history,
            reverse_zone: ReverseZoneTemplate::default(),
        }
    }

    /// Use `template` when auto-PTR has to create a reverse zone.
    #[must_use]
    pub fn with_reverse_zone(mut self, template: ReverseZoneTemplate) -> Self {
        self.reverse_zone = template;
        self
    }

    /// Apply `request` and report the result as `{status, msg}`.
    pub async fn apply(&self, request: &ApplyRequest) -> ApplyOutcome {
        self.try_apply(request).await.into()
    }

    /// Apply `request`.
    ///
    /// # Errors
    ///
    /// - [`ZoneSyncError::Conflict`] when `request.serial` is stale
    /// - [`ZoneSyncError::InvalidRecord`] when a desired row is unusable
    /// - [`ZoneSyncError::RemoteApi`] when fetching or the first batch fails
    /// - [`ZoneSyncError::PartialFailure`] when the replace batch fails after deletes
    /// - [`ZoneSyncError::AutoPtr`] when PTR maintenance fails
    /// - [`ZoneSyncError::History`] when the audit record cannot be written
    pub async fn try_apply(&self, request: &ApplyRequest) -> Result<ApplySummary, ZoneSyncError> {
        let start = Instant::now();
        let result = self.apply_inner(request).await;
        let outcome = match &result {
            Ok(summary) if summary.is_noop() => "noop",
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_apply(outcome, start.elapsed());
        match &result {
            Ok(summary) => info!(
                zone = %request.zone,
                actor = %request.actor,
                deleted = summary.deleted,
                replaced = summary.replaced,
                duration_ms = start.elapsed().as_millis(),
                "Zone apply finished"
            ),
            Err(e) => {
                metrics::record_error(e.kind());
                error!(zone = %request.zone, actor = %request.actor, error = %e, "Zone apply failed");
            }
        }
        result
    }

    /// Compute the batches `request` would send, without sending them.
    ///
    /// # Errors
    ///
    /// Same as [`ZoneApplier::try_apply`] up to the first PATCH.
    pub async fn plan(&self, request: &ApplyRequest) -> Result<ApplyPlan, ZoneSyncError> {
        let prepared = self.prepare(request).await?;
        let (ptr_additions, ptr_removals) = if prepared.policy.auto_ptr {
            let changes = PtrChanges::from_apply(
                &prepared.grouped.replaced_rrsets(),
                &prepared.reconciliation.prior_rrsets,
            );
            (changes.additions.len(), changes.removals.len())
        } else {
            (0, 0)
        };
        Ok(ApplyPlan {
            zone: request.zone.clone(),
            serial: prepared.serial,
            deletes: prepared.grouped.deletes,
            replaces: prepared.grouped.replaces,
            ptr_additions,
            ptr_removals,
        })
    }

    async fn prepare(&self, request: &ApplyRequest) -> Result<Prepared, ZoneSyncError> {
        let zone = request.zone.as_str();
        let policy =
            ApplyPolicy::resolve(zone, self.settings.as_ref(), self.edit_policy.as_ref()).await;

        let snapshot = self
            .api
            .fetch_zone(zone)
            .await
            .map_err(|e| ZoneSyncError::remote(zone, &e))?;

        if let Some(submitted) = request.serial {
            if submitted != snapshot.serial {
                warn!(zone = %zone, submitted, current = snapshot.serial, "Zone serial changed since it was loaded");
                return Err(ZoneSyncError::Conflict {
                    zone: zone.to_string(),
                    submitted,
                    current: snapshot.serial,
                });
            }
        }

        let reconciliation = reconcile(zone, &request.records, &snapshot.rrsets, &policy)?;
        let mut rows = reconciliation.deleted_records.clone();
        rows.extend(reconciliation.new_records.iter().cloned());
        let grouped = group_changes(&rows, &policy);

        Ok(Prepared {
            policy,
            serial: snapshot.serial,
            reconciliation,
            grouped,
        })
    }

    async fn apply_inner(&self, request: &ApplyRequest) -> Result<ApplySummary, ZoneSyncError> {
        let zone = request.zone.as_str();
        let Prepared {
            policy,
            reconciliation,
            grouped,
            ..
        } = self.prepare(request).await?;

        let mut summary = ApplySummary {
            zone: zone.to_string(),
            ..ApplySummary::default()
        };
        if grouped.is_empty() {
            info!(zone = %zone, "Desired state matches the zone; nothing to apply");
            return Ok(summary);
        }

        if !grouped.deletes.is_empty() {
            self.api
                .patch_rrsets(zone, &grouped.deletes)
                .await
                .map_err(|e| ZoneSyncError::remote(zone, &e))?;
            metrics::record_rrsets_patched("DELETE", grouped.deletes.len());
            summary.deleted = grouped.deletes.len();
        }

        if !grouped.replaces.is_empty() {
            if let Err(e) = self.api.patch_rrsets(zone, &grouped.replaces).await {
                if summary.deleted > 0 {
                    return Err(ZoneSyncError::PartialFailure {
                        zone: zone.to_string(),
                        applied: "delete batch".to_string(),
                        failed: "replace batch".to_string(),
                        message: ZoneSyncError::remote(zone, &e).to_string(),
                    });
                }
                return Err(ZoneSyncError::remote(zone, &e));
            }
            metrics::record_rrsets_patched("REPLACE", grouped.replaces.len());
            summary.replaced = grouped.replaces.len();
        }

        let written = grouped.replaced_rrsets();

        let ptr_result = if policy.auto_ptr {
            let changes = PtrChanges::from_apply(&written, &reconciliation.prior_rrsets);
            if changes.is_empty() {
                Ok(None)
            } else {
                let mut synchronizer = AutoPtrSynchronizer::new(
                    self.api.as_ref(),
                    self.catalog.as_ref(),
                    &self.reverse_zone,
                );
                synchronizer.sync(zone, &changes).await.map(Some)
            }
        } else {
            Ok(None)
        };

        let record = HistoryRecord::new(zone, written, reconciliation.prior_rrsets, &request.actor);
        self.history.persist_history(&record).await?;

        summary.auto_ptr = ptr_result?;
        Ok(summary)
    }
}
