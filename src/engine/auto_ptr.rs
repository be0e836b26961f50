// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Automatic PTR maintenance driven by forward A/AAAA changes.
//!
//! For every address added to a forward zone a PTR pointing back at the
//! forward owner is written into the narrowest existing reverse zone; if no
//! reverse zone exists at any probed boundary, one is created at the
//! narrowest boundary first. For every address removed, the PTR is deleted.
//!
//! Nothing here is transactional. A failure part-way leaves already created
//! zones and already written PTRs in place.

use crate::collaborators::{ControlApi, ZoneCatalog};
use crate::errors::{ApiError, ZoneSyncError};
use crate::metrics;
use crate::records::{ChangeOperation, RRType, RRset, ResourceRecordValue};
use crate::reverse::{reverse_pointer_for_content, zone_candidates};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// How reverse zones are created when none exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseZoneTemplate {
    /// Zone kind passed to the zone catalog (e.g. `Master`, `Native`)
    pub kind: String,
    /// Masters for slave-kind zones; usually empty
    pub masters: Vec<String>,
}

impl Default for ReverseZoneTemplate {
    fn default() -> Self {
        Self {
            kind: crate::constants::DEFAULT_REVERSE_ZONE_KIND.to_string(),
            masters: Vec::new(),
        }
    }
}

/// One forward address whose PTR must be written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrTarget {
    /// Forward owner name, absolute
    pub forward_name: String,
    /// Address as written in the A/AAAA content
    pub address: String,
    /// TTL of the forward RRset
    pub ttl: u32,
}

/// Address changes extracted from one forward apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PtrChanges {
    pub additions: Vec<PtrTarget>,
    pub removals: Vec<PtrTarget>,
}

impl PtrChanges {
    /// Collect address changes from the written RRsets and the state they replaced.
    ///
    /// Every value of a written A/AAAA RRset is an addition. A prior value is a
    /// removal when its content is absent from the RRset that replaced it, or
    /// when its key was deleted outright.
    #[must_use]
    pub fn from_apply(written: &[RRset], prior: &[RRset]) -> Self {
        let mut changes = PtrChanges::default();

        for rrset in written.iter().filter(|r| r.rtype.is_address()) {
            for value in &rrset.records {
                changes.additions.push(PtrTarget {
                    forward_name: rrset.name.clone(),
                    address: value.content.clone(),
                    ttl: rrset.ttl,
                });
            }
        }

        for rrset in prior.iter().filter(|r| r.rtype.is_address()) {
            let replacement = written.iter().find(|w| w.key() == rrset.key());
            for value in &rrset.records {
                let still_present = replacement
                    .is_some_and(|w| w.records.iter().any(|r| r.content == value.content));
                if !still_present {
                    changes.removals.push(PtrTarget {
                        forward_name: rrset.name.clone(),
                        address: value.content.clone(),
                        ttl: rrset.ttl,
                    });
                }
            }
        }

        changes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// What one synchronization pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AutoPtrReport {
    pub zones_created: Vec<String>,
    pub ptr_added: usize,
    pub ptr_deleted: usize,
}

/// Derives and applies PTR changes for one forward zone.
pub struct AutoPtrSynchronizer<'a> {
    api: &'a dyn ControlApi,
    catalog: &'a dyn ZoneCatalog,
    template: &'a ReverseZoneTemplate,
    located: HashMap<String, Option<String>>,
}

impl<'a> AutoPtrSynchronizer<'a> {
    #[must_use]
    pub fn new(
        api: &'a dyn ControlApi,
        catalog: &'a dyn ZoneCatalog,
        template: &'a ReverseZoneTemplate,
    ) -> Self {
        Self {
            api,
            catalog,
            template,
            located: HashMap::new(),
        }
    }

    /// Narrowest existing reverse zone for `reverse_name`, if any.
    ///
    /// # Errors
    ///
    /// Returns the catalog's error when an existence probe fails.
    pub async fn find_reverse_zone(
        &mut self,
        reverse_name: &str,
    ) -> Result<Option<String>, ApiError> {
        let candidates = zone_candidates(reverse_name);
        // Names with the same narrowest candidate share every candidate.
        let Some(narrowest) = candidates.first().cloned() else {
            return Ok(None);
        };
        if let Some(found) = self.located.get(&narrowest) {
            return Ok(found.clone());
        }

        let mut found = None;
        for candidate in &candidates {
            debug!(reverse_name = %reverse_name, candidate = %candidate, "Probing reverse zone boundary");
            if self.catalog.zone_exists(candidate).await? {
                found = Some(candidate.clone());
                break;
            }
        }
        self.located.insert(narrowest, found.clone());
        Ok(found)
    }

    /// Apply PTR changes for `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneSyncError::AutoPtr`] on the first failure; earlier side
    /// effects are kept.
    pub async fn sync(
        &mut self,
        zone: &str,
        changes: &PtrChanges,
    ) -> Result<AutoPtrReport, ZoneSyncError> {
        match self.sync_inner(zone, changes).await {
            Ok(report) => {
                info!(
                    zone = %zone,
                    zones_created = report.zones_created.len(),
                    ptr_added = report.ptr_added,
                    ptr_deleted = report.ptr_deleted,
                    "Auto-PTR records updated"
                );
                Ok(report)
            }
            Err(message) => {
                error!(zone = %zone, error = %message, "Auto-PTR update failed");
                Err(ZoneSyncError::AutoPtr {
                    zone: zone.to_string(),
                    message,
                })
            }
        }
    }

    async fn sync_inner(
        &mut self,
        zone: &str,
        changes: &PtrChanges,
    ) -> Result<AutoPtrReport, String> {
        let mut report = AutoPtrReport::default();
        let mut batches: BTreeMap<String, BTreeMap<String, ChangeOperation>> = BTreeMap::new();
        let mut written: HashSet<String> = HashSet::new();

        for target in &changes.additions {
            let reverse = reverse_name(target)?;
            if !written.insert(reverse.clone()) {
                warn!(
                    zone = %zone,
                    reverse_name = %reverse,
                    forward = %target.forward_name,
                    "Address already claimed by another PTR in this change; keeping the first"
                );
                continue;
            }
            let located = self
                .find_reverse_zone(&reverse)
                .await
                .map_err(|e| format!("locating reverse zone for {reverse}: {e}"))?;
            let reverse_zone = match located {
                Some(existing) => existing,
                None => {
                    let created = self.create_default_zone(&reverse).await?;
                    report.zones_created.push(created.clone());
                    created
                }
            };
            let ptr = RRset {
                name: reverse.clone(),
                rtype: RRType::PTR,
                ttl: target.ttl,
                records: vec![ResourceRecordValue::new(target.forward_name.clone(), false)],
                comments: Vec::new(),
            };
            batches
                .entry(reverse_zone)
                .or_default()
                .insert(reverse, ChangeOperation::replace(ptr));
            report.ptr_added += 1;
        }

        for target in &changes.removals {
            let reverse = reverse_name(target)?;
            if written.contains(&reverse) {
                debug!(reverse_name = %reverse, "PTR rewritten in this change; not deleting");
                continue;
            }
            let located = self
                .find_reverse_zone(&reverse)
                .await
                .map_err(|e| format!("locating reverse zone for {reverse}: {e}"))?;
            let Some(reverse_zone) = located else {
                debug!(reverse_name = %reverse, "No reverse zone holds this PTR; nothing to delete");
                continue;
            };
            let slot = batches.entry(reverse_zone).or_default();
            if !slot.contains_key(&reverse) {
                slot.insert(reverse.clone(), ChangeOperation::delete(reverse, RRType::PTR));
                report.ptr_deleted += 1;
            }
        }

        for (reverse_zone, operations) in batches {
            let operations: Vec<ChangeOperation> = operations.into_values().collect();
            debug!(reverse_zone = %reverse_zone, operations = operations.len(), "Patching reverse zone");
            self.api
                .patch_rrsets(&reverse_zone, &operations)
                .await
                .map_err(|e| format!("reverse zone {reverse_zone}: {e}"))?;
        }

        metrics::record_ptr_operations("add", report.ptr_added);
        metrics::record_ptr_operations("delete", report.ptr_deleted);
        Ok(report)
    }

    async fn create_default_zone(&mut self, reverse: &str) -> Result<String, String> {
        let zone = default_boundary(reverse)?;
        info!(reverse_zone = %zone, kind = %self.template.kind, "Creating reverse zone");
        self.catalog
            .create_zone(&zone, &self.template.kind, &self.template.masters)
            .await
            .map_err(|e| format!("creating reverse zone {zone}: {e}"))?;
        metrics::record_reverse_zone_created();
        if let Some(narrowest) = zone_candidates(reverse).first() {
            self.located.insert(narrowest.clone(), Some(zone.clone()));
        }
        Ok(zone)
    }
}

fn reverse_name(target: &PtrTarget) -> Result<String, String> {
    reverse_pointer_for_content(&target.address).ok_or_else(|| {
        format!(
            "'{}' of {} is not an IP address",
            target.address, target.forward_name
        )
    })
}

fn default_boundary(reverse: &str) -> Result<String, String> {
    zone_candidates(reverse)
        .into_iter()
        .next()
        .ok_or_else(|| format!("no reverse zone boundary for {reverse}"))
}

#[cfg(test)]
#[path = "auto_ptr_tests.rs"]
mod auto_ptr_tests;
