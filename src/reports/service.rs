//! Report generation actions
//!
//! Rendering happens on the backend; the client sends the request and
//! keeps the returned metadata (including the PDF reference, when one
//! was produced).

use super::store::ReportStore;
use super::types::{NewReport, Report};
use crate::api_client::{surface_message, ReportApi};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

const MSG_LOAD: &str = "Impossible de charger les rapports";
const MSG_GENERATE: &str = "Impossible de générer le rapport";

/// Report service instance
pub struct ReportService {
    api: Arc<dyn ReportApi>,
    store: Arc<ReportStore>,
}

impl ReportService {
    pub fn new(api: Arc<dyn ReportApi>, store: Arc<ReportStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Reload the report list from the backend
    pub async fn refresh(&self) -> Result<usize> {
        match self.api.list_reports().await {
            Ok(reports) => {
                let count = reports.len();
                self.store.set_all(reports);
                Ok(count)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_LOAD));
                Err(e.into())
            }
        }
    }

    /// Generate a report remotely and keep its metadata
    pub async fn generate(&self, new: NewReport) -> Result<Report> {
        if new.title.trim().is_empty() {
            return Err(Error::Validation("Le titre est requis".to_string()));
        }

        match self.api.generate_report(&new).await {
            Ok(report) => {
                info!(report_id = %report.id, kind = %report.kind, "Report generated");
                self.store.add(report.clone());
                Ok(report)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_GENERATE));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiError;
    use crate::reports::types::ReportKind;
    use async_trait::async_trait;

    struct MockReportApi;

    #[async_trait]
    impl ReportApi for MockReportApi {
        async fn list_reports(&self) -> std::result::Result<Vec<Report>, ApiError> {
            Err(ApiError::Network("unreachable".to_string()))
        }

        async fn generate_report(&self, new: &NewReport) -> std::result::Result<Report, ApiError> {
            Ok(Report {
                id: "rep-1".to_string(),
                kind: new.kind,
                subject_id: new.subject_id.clone(),
                title: new.title.clone(),
                content: new.content.clone(),
                pdf_path: Some("rapports/rep-1.pdf".to_string()),
                generated_by: "S-0007".to_string(),
                generated_at: chrono::Utc::now(),
            })
        }
    }

    fn service() -> ReportService {
        ReportService::new(Arc::new(MockReportApi), Arc::new(ReportStore::default()))
    }

    #[tokio::test]
    async fn test_generate_keeps_pdf_reference() {
        let service = service();
        let report = service
            .generate(NewReport {
                kind: ReportKind::Incident,
                subject_id: Some("inc-1".to_string()),
                title: "Incident quai 4".to_string(),
                content: "Synthèse".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(report.pdf_path.as_deref(), Some("rapports/rep-1.pdf"));
        assert_eq!(service.store().reports().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_connectivity_message() {
        let service = service();
        assert!(service.refresh().await.is_err());
        assert_eq!(
            service.store().error().as_deref(),
            Some("Erreur de connexion au serveur")
        );
    }
}
