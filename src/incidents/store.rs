//! In-memory incident collection and draft queue
//!
//! The collection mirrors the backend; the draft queue holds offline-born
//! incidents awaiting a successful remote creation and is the only part of
//! this store that survives a restart. One write lock guards both, so
//! readers never observe a half-applied update.

use super::types::{DraftQueueStats, Incident, IncidentUpdate, IncidentsSnapshot};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct IncidentState {
    incidents: Vec<Incident>,
    drafts: Vec<Incident>,
    selected: Option<Incident>,
    error: Option<String>,
}

/// Incident store instance
#[derive(Default)]
pub struct IncidentStore {
    inner: RwLock<IncidentState>,
}

impl IncidentStore {
    // ========================================
    // Reads
    // ========================================

    pub fn incidents(&self) -> Vec<Incident> {
        self.inner
            .read()
            .expect("incident store poisoned")
            .incidents
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Incident> {
        self.inner
            .read()
            .expect("incident store poisoned")
            .incidents
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Draft queue, in submission order
    pub fn drafts(&self) -> Vec<Incident> {
        self.inner
            .read()
            .expect("incident store poisoned")
            .drafts
            .clone()
    }

    pub fn draft_stats(&self) -> DraftQueueStats {
        DraftQueueStats {
            queued: self
                .inner
                .read()
                .expect("incident store poisoned")
                .drafts
                .len(),
        }
    }

    pub fn selected(&self) -> Option<Incident> {
        self.inner
            .read()
            .expect("incident store poisoned")
            .selected
            .clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner
            .read()
            .expect("incident store poisoned")
            .error
            .clone()
    }

    // ========================================
    // Collection mutators
    // ========================================

    /// Replace the collection
    pub fn set_all(&self, incidents: Vec<Incident>) {
        let mut inner = self.inner.write().expect("incident store poisoned");
        inner.incidents = incidents;
        inner.error = None;
    }

    /// Append an incident; an already-present id is a no-op
    pub fn add(&self, incident: Incident) {
        let mut inner = self.inner.write().expect("incident store poisoned");
        if inner.incidents.iter().any(|i| i.id == incident.id) {
            debug!(incident_id = %incident.id, "Duplicate incident id ignored");
            return;
        }
        inner.incidents.push(incident);
        inner.error = None;
    }

    /// Merge fields into the matching incident; unknown ids change nothing
    pub fn update(&self, id: &str, update: &IncidentUpdate) {
        let mut inner = self.inner.write().expect("incident store poisoned");
        if let Some(incident) = inner.incidents.iter_mut().find(|i| i.id == id) {
            update.apply(incident);
            inner.error = None;
        }
    }

    /// Evict the matching incident from the local cache
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write().expect("incident store poisoned");
        let before = inner.incidents.len();
        inner.incidents.retain(|i| i.id != id);
        if inner.incidents.len() != before {
            inner.error = None;
        }
    }

    pub fn set_selected(&self, incident: Option<Incident>) {
        self.inner.write().expect("incident store poisoned").selected = incident;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().expect("incident store poisoned").error = Some(message.into());
    }

    // ========================================
    // Draft queue
    // ========================================

    /// Insert a draft, or replace the one already carrying its id
    ///
    /// Replacement happens in place so the queue keeps its original order.
    pub fn upsert_draft(&self, draft: Incident) {
        let mut inner = self.inner.write().expect("incident store poisoned");
        match inner.drafts.iter_mut().find(|d| d.id == draft.id) {
            Some(existing) => *existing = draft,
            None => inner.drafts.push(draft),
        }
    }

    /// Drop a draft once its remote creation succeeded (or on explicit
    /// user deletion); idempotent
    pub fn remove_draft(&self, id: &str) {
        self.inner
            .write()
            .expect("incident store poisoned")
            .drafts
            .retain(|d| d.id != id);
    }

    /// Replace the queue wholesale (snapshot restore)
    pub fn set_drafts(&self, drafts: Vec<Incident>) {
        self.inner.write().expect("incident store poisoned").drafts = drafts;
    }

    /// Persisted subset: the draft queue, nothing else
    pub fn snapshot(&self) -> IncidentsSnapshot {
        IncidentsSnapshot {
            draft_incidents: self.drafts(),
        }
    }

    /// Drop everything (tests, context disposal)
    pub fn reset(&self) {
        *self.inner.write().expect("incident store poisoned") = IncidentState::default();
    }
}
