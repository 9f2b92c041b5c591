//! In-memory report collection

use super::types::{Report, ReportUpdate};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct ReportState {
    reports: Vec<Report>,
    selected: Option<Report>,
    error: Option<String>,
}

/// Report store instance
#[derive(Default)]
pub struct ReportStore {
    inner: RwLock<ReportState>,
}

impl ReportStore {
    pub fn reports(&self) -> Vec<Report> {
        self.inner.read().expect("report store poisoned").reports.clone()
    }

    pub fn get(&self, id: &str) -> Option<Report> {
        self.inner
            .read()
            .expect("report store poisoned")
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn selected(&self) -> Option<Report> {
        self.inner.read().expect("report store poisoned").selected.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().expect("report store poisoned").error.clone()
    }

    /// Replace the collection
    pub fn set_all(&self, reports: Vec<Report>) {
        let mut inner = self.inner.write().expect("report store poisoned");
        inner.reports = reports;
        inner.error = None;
    }

    /// Append a report; an already-present id is a no-op
    pub fn add(&self, report: Report) {
        let mut inner = self.inner.write().expect("report store poisoned");
        if inner.reports.iter().any(|r| r.id == report.id) {
            debug!(report_id = %report.id, "Duplicate report id ignored");
            return;
        }
        inner.reports.push(report);
        inner.error = None;
    }

    /// Merge fields into the matching report; unknown ids change nothing
    pub fn update(&self, id: &str, update: &ReportUpdate) {
        let mut inner = self.inner.write().expect("report store poisoned");
        if let Some(report) = inner.reports.iter_mut().find(|r| r.id == id) {
            update.apply(report);
            inner.error = None;
        }
    }

    /// Evict the matching report from the local cache
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write().expect("report store poisoned");
        let before = inner.reports.len();
        inner.reports.retain(|r| r.id != id);
        if inner.reports.len() != before {
            inner.error = None;
        }
    }

    pub fn set_selected(&self, report: Option<Report>) {
        self.inner.write().expect("report store poisoned").selected = report;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().expect("report store poisoned").error = Some(message.into());
    }

    /// Drop everything (tests, context disposal)
    pub fn reset(&self) {
        *self.inner.write().expect("report store poisoned") = ReportState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::types::ReportKind;

    fn report(id: &str) -> Report {
        Report {
            id: id.to_string(),
            kind: ReportKind::General,
            subject_id: None,
            title: "Rapport journalier".to_string(),
            content: "RAS".to_string(),
            pdf_path: None,
            generated_by: "S-0007".to_string(),
            generated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let store = ReportStore::default();
        store.set_all(vec![report("rep-1")]);

        let before = store.reports();
        store.update(
            "rep-404",
            &ReportUpdate {
                title: Some("Autre".to_string()),
                ..ReportUpdate::default()
            },
        );
        assert_eq!(store.reports(), before);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = ReportStore::default();
        store.set_all(vec![report("rep-1")]);
        store.remove("rep-1");
        store.remove("rep-1");
        assert!(store.reports().is_empty());
    }

    #[test]
    fn test_selected_holds_at_most_one() {
        let store = ReportStore::default();
        store.set_selected(Some(report("rep-1")));
        store.set_selected(Some(report("rep-2")));
        assert_eq!(store.selected().unwrap().id, "rep-2");
        store.set_selected(None);
        assert!(store.selected().is_none());
    }
}
