//! Incident submission and draft synchronization
//!
//! A field report must never be silently lost: when the backend rejects a
//! creation or the network is down, the submission is converted into a
//! locally persisted draft and the caller sees a "saved offline" outcome.
//! An explicit sync pass later replays the queue in order.

use super::store::IncidentStore;
use super::types::{
    Incident, IncidentPayload, IncidentStatus, IncidentUpdate, NewIncident, PhotoUpload,
    SubmissionOutcome, SyncReport, ValidationRequest, STORE_KEY,
};
use crate::api_client::{surface_message, IncidentApi};
use crate::error::{Error, Result};
use crate::local_store::LocalStore;
use crate::session::SessionState;
use base64::Engine;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MSG_LOAD: &str = "Impossible de charger les incidents";
const MSG_VALIDATE: &str = "Impossible d'enregistrer la décision";
const MSG_DELETE: &str = "Impossible de supprimer l'incident";
const MSG_RESTORE: &str = "Impossible de restaurer l'incident";

/// Incident service instance
pub struct IncidentService {
    api: Arc<dyn IncidentApi>,
    store: Arc<IncidentStore>,
    session: Arc<SessionState>,
    local: Arc<LocalStore>,
    max_photos: usize,
}

impl IncidentService {
    pub fn new(
        api: Arc<dyn IncidentApi>,
        store: Arc<IncidentStore>,
        session: Arc<SessionState>,
        local: Arc<LocalStore>,
        max_photos: usize,
    ) -> Self {
        Self {
            api,
            store,
            session,
            local,
            max_photos,
        }
    }

    pub fn store(&self) -> &IncidentStore {
        &self.store
    }

    // ========================================
    // Submission
    // ========================================

    /// Submit a new incident; the outcome is either published or drafted,
    /// never lost
    pub async fn submit(&self, form: NewIncident) -> Result<SubmissionOutcome> {
        self.validate_form(&form)?;

        let reporter = self
            .session
            .current_user()
            .map(|u| u.matricule)
            .ok_or_else(|| Error::Unauthorized("session requise".to_string()))?;

        let draft_id = uuid::Uuid::new_v4().to_string();
        self.attempt(form, reporter, draft_id, None).await
    }

    /// Replay a single queued draft, keeping its client-generated id
    pub async fn retry_draft(&self, draft_id: &str) -> Result<SubmissionOutcome> {
        let draft = self
            .store
            .drafts()
            .into_iter()
            .find(|d| d.id == draft_id)
            .ok_or_else(|| Error::NotFound(format!("draft {draft_id}")))?;

        let form = NewIncident {
            incident_type: draft.incident_type.clone(),
            description: draft.description.clone(),
            occurred_at: Some(draft.occurred_at),
            zone: draft.zone.clone(),
            photos: draft.photos.clone(),
        };

        self.attempt(
            form,
            draft.agent_matricule.clone(),
            draft.id.clone(),
            Some(draft.id.clone()),
        )
        .await
    }

    /// One remote creation attempt with the draft fallback
    ///
    /// Explicit rejection and transport failure take the same path: the
    /// record is upserted into the persisted draft queue under
    /// `client_id`, replacing any previous attempt with that id.
    async fn attempt(
        &self,
        form: NewIncident,
        reporter: String,
        client_id: String,
        client_ref: Option<String>,
    ) -> Result<SubmissionOutcome> {
        let occurred_at = form.occurred_at.unwrap_or_else(chrono::Utc::now);
        let attachments = self.load_attachments(&form.photos).await;
        let payload = IncidentPayload {
            incident_type: form.incident_type.clone(),
            description: form.description.clone(),
            occurred_at,
            zone: form.zone.clone(),
            photos: form.photos.clone(),
            attachments,
            client_ref,
        };

        let replaying = payload.client_ref.is_some();
        match self.api.create_incident(&payload).await {
            Ok(incident) => {
                info!(incident_id = %incident.id, "Incident published");
                self.store.add(incident.clone());
                if replaying {
                    self.store.remove_draft(&client_id);
                    self.persist_drafts().await;
                }
                Ok(SubmissionOutcome::Published(incident))
            }
            Err(e) => {
                let draft = Incident {
                    id: client_id.clone(),
                    incident_type: form.incident_type,
                    description: form.description,
                    occurred_at,
                    zone: form.zone,
                    agent_matricule: reporter,
                    photos: form.photos,
                    status: IncidentStatus::Pending,
                    deleted: false,
                    validation: None,
                };
                self.store.upsert_draft(draft);
                self.persist_drafts().await;
                info!(draft_id = %client_id, error = %e, "Incident saved offline");
                Ok(SubmissionOutcome::SavedOffline { draft_id: client_id })
            }
        }
    }

    fn validate_form(&self, form: &NewIncident) -> Result<()> {
        if form.incident_type.trim().is_empty() {
            return Err(Error::Validation("Le type d'incident est requis".to_string()));
        }
        if form.description.trim().is_empty() {
            return Err(Error::Validation("La description est requise".to_string()));
        }
        if form.zone.trim().is_empty() {
            return Err(Error::Validation("La zone est requise".to_string()));
        }
        if form.photos.len() > self.max_photos {
            return Err(Error::Validation(format!(
                "Au plus {} photos par incident",
                self.max_photos
            )));
        }
        Ok(())
    }

    /// Read stored photo files into inline attachments; unreadable files
    /// are skipped (the path reference still travels with the payload)
    async fn load_attachments(&self, photos: &[String]) -> Vec<PhotoUpload> {
        let mut attachments = Vec::with_capacity(photos.len());
        for path in photos {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let file_name = std::path::Path::new(path)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.clone());
                    let mime_type = if path.to_lowercase().ends_with(".png") {
                        "image/png"
                    } else {
                        "image/jpeg"
                    };
                    attachments.push(PhotoUpload {
                        file_name,
                        mime_type: mime_type.to_string(),
                        data_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
                    });
                }
                Err(e) => debug!(path = %path, error = %e, "Photo unreadable, sent as reference only"),
            }
        }
        attachments
    }

    // ========================================
    // Draft queue synchronization
    // ========================================

    /// Replay every queued draft, in original order
    ///
    /// A draft leaves the queue only once its remote creation succeeded;
    /// the rest stay queued for the next explicit pass. Never fails: a
    /// fully failed pass is just a report with nothing published.
    pub async fn sync_drafts(&self) -> SyncReport {
        let drafts = self.store.drafts();
        if drafts.is_empty() {
            return SyncReport::default();
        }

        let mut published = 0;
        for draft in drafts {
            let attachments = self.load_attachments(&draft.photos).await;
            let payload = IncidentPayload {
                incident_type: draft.incident_type.clone(),
                description: draft.description.clone(),
                occurred_at: draft.occurred_at,
                zone: draft.zone.clone(),
                photos: draft.photos.clone(),
                attachments,
                client_ref: Some(draft.id.clone()),
            };

            match self.api.create_incident(&payload).await {
                Ok(incident) => {
                    self.store.remove_draft(&draft.id);
                    self.store.add(incident);
                    published += 1;
                }
                Err(e) => {
                    debug!(draft_id = %draft.id, error = %e, "Draft retry failed, kept in queue");
                }
            }
        }

        self.persist_drafts().await;
        let remaining = self.store.draft_stats().queued;
        info!(published, remaining, "Draft synchronization finished");
        SyncReport {
            published,
            remaining,
        }
    }

    /// User-initiated permanent deletion of a queued draft
    pub async fn discard_draft(&self, draft_id: &str) {
        self.store.remove_draft(draft_id);
        self.persist_drafts().await;
    }

    /// Write the persisted subset (the draft queue) to the general partition
    pub async fn persist_drafts(&self) {
        match serde_json::to_value(self.store.snapshot()) {
            Ok(payload) => self.local.snapshot_set(STORE_KEY, &payload).await,
            Err(e) => warn!(error = %e, "Draft snapshot serialization failed"),
        }
    }

    /// Reload the draft queue at process start
    pub async fn restore_drafts(&self) {
        if let Some(value) = self.local.snapshot_get(STORE_KEY).await {
            match serde_json::from_value::<super::types::IncidentsSnapshot>(value) {
                Ok(snapshot) => {
                    debug!(count = snapshot.draft_incidents.len(), "Drafts restored");
                    self.store.set_drafts(snapshot.draft_incidents);
                }
                Err(e) => warn!(error = %e, "Draft snapshot undecodable, starting empty"),
            }
        }
    }

    // ========================================
    // Collection actions
    // ========================================

    /// Reload the incident list from the backend
    pub async fn refresh(&self) -> Result<usize> {
        match self.api.list_incidents().await {
            Ok(incidents) => {
                let count = incidents.len();
                self.store.set_all(incidents);
                Ok(count)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_LOAD));
                Err(e.into())
            }
        }
    }

    /// Record a supervisor ruling
    pub async fn validate(&self, id: &str, verdict: ValidationRequest) -> Result<Incident> {
        match self.api.validate_incident(id, &verdict).await {
            Ok(incident) => {
                self.store.update(
                    id,
                    &IncidentUpdate {
                        status: Some(incident.status),
                        validation: incident.validation.clone(),
                        ..IncidentUpdate::default()
                    },
                );
                Ok(incident)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_VALIDATE));
                Err(e.into())
            }
        }
    }

    /// Soft delete: the record stays in the collection, flagged
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        match self.api.soft_delete_incident(id).await {
            Ok(()) => {
                self.store.update(
                    id,
                    &IncidentUpdate {
                        deleted: Some(true),
                        ..IncidentUpdate::default()
                    },
                );
                Ok(())
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_DELETE));
                Err(e.into())
            }
        }
    }

    /// Undo a soft delete
    pub async fn restore(&self, id: &str) -> Result<Incident> {
        match self.api.restore_incident(id).await {
            Ok(incident) => {
                self.store.update(
                    id,
                    &IncidentUpdate {
                        deleted: Some(false),
                        ..IncidentUpdate::default()
                    },
                );
                Ok(incident)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_RESTORE));
                Err(e.into())
            }
        }
    }

    /// Permanent, API-mediated deletion; only then does the record leave
    /// the local collection
    pub async fn purge(&self, id: &str) -> Result<()> {
        match self.api.purge_incident(id).await {
            Ok(()) => {
                self.store.remove(id);
                Ok(())
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_DELETE));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{ApiError, AuthApi, LoginData};
    use crate::session::{Credentials, Role, SessionState, TokenCell, User};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StubAuth;

    #[async_trait]
    impl AuthApi for StubAuth {
        async fn login(&self, _c: &Credentials) -> std::result::Result<LoginData, ApiError> {
            Err(ApiError::Unauthenticated)
        }
        async fn logout(&self) -> std::result::Result<(), ApiError> {
            Ok(())
        }
        async fn current_user(&self) -> std::result::Result<User, ApiError> {
            Err(ApiError::Unauthenticated)
        }
    }

    /// IncidentApi double whose connectivity can be flipped mid-test
    struct MockIncidentApi {
        online: AtomicBool,
        created: AtomicUsize,
    }

    impl MockIncidentApi {
        fn new(online: bool) -> Arc<Self> {
            Arc::new(Self {
                online: AtomicBool::new(online),
                created: AtomicUsize::new(0),
            })
        }

        fn set_online(&self, online: bool) {
            self.online.store(online, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl IncidentApi for MockIncidentApi {
        async fn list_incidents(&self) -> std::result::Result<Vec<Incident>, ApiError> {
            Ok(vec![])
        }

        async fn create_incident(
            &self,
            payload: &IncidentPayload,
        ) -> std::result::Result<Incident, ApiError> {
            if !self.online.load(Ordering::SeqCst) {
                return Err(ApiError::Network("unreachable".to_string()));
            }
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Incident {
                id: format!("srv-{n}"),
                incident_type: payload.incident_type.clone(),
                description: payload.description.clone(),
                occurred_at: payload.occurred_at,
                zone: payload.zone.clone(),
                agent_matricule: "A-0042".to_string(),
                photos: payload.photos.clone(),
                status: IncidentStatus::Pending,
                deleted: false,
                validation: None,
            })
        }

        async fn validate_incident(
            &self,
            _id: &str,
            _verdict: &ValidationRequest,
        ) -> std::result::Result<Incident, ApiError> {
            Err(ApiError::Network("unreachable".to_string()))
        }

        async fn soft_delete_incident(&self, _id: &str) -> std::result::Result<(), ApiError> {
            Ok(())
        }

        async fn restore_incident(&self, _id: &str) -> std::result::Result<Incident, ApiError> {
            Err(ApiError::Network("unreachable".to_string()))
        }

        async fn purge_incident(&self, _id: &str) -> std::result::Result<(), ApiError> {
            Ok(())
        }
    }

    fn agent() -> User {
        User {
            matricule: "A-0042".to_string(),
            nom: "Rakoto".to_string(),
            prenom: None,
            email: None,
            telephone: None,
            role: Role::FieldAgent,
            actif: true,
            dernier_login: None,
        }
    }

    fn form(description: &str) -> NewIncident {
        NewIncident {
            incident_type: "intrusion".to_string(),
            description: description.to_string(),
            occurred_at: None,
            zone: "quai 4".to_string(),
            photos: vec![],
        }
    }

    async fn service_with(api: Arc<MockIncidentApi>) -> (IncidentService, Arc<LocalStore>) {
        let local = Arc::new(LocalStore::open_in_memory().await.unwrap());
        let session = Arc::new(SessionState::new(
            Arc::new(StubAuth),
            local.clone(),
            Arc::new(TokenCell::default()),
        ));
        session.set_user(agent());

        let service = IncidentService::new(
            api,
            Arc::new(IncidentStore::default()),
            session,
            local.clone(),
            6,
        );
        (service, local)
    }

    #[tokio::test]
    async fn test_submit_online_publishes_without_draft() {
        let api = MockIncidentApi::new(true);
        let (service, _local) = service_with(api).await;

        let outcome = service.submit(form("portail forcé")).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Published(_)));
        assert_eq!(service.store().incidents().len(), 1);
        assert!(service.store().drafts().is_empty());
    }

    #[tokio::test]
    async fn test_submit_offline_drafts_and_persists() {
        let api = MockIncidentApi::new(false);
        let (service, local) = service_with(api).await;

        let outcome = service.submit(form("portail forcé")).await.unwrap();
        let draft_id = match outcome {
            SubmissionOutcome::SavedOffline { draft_id } => draft_id,
            other => panic!("expected offline outcome, got {other:?}"),
        };

        let drafts = service.store().drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft_id);
        assert_eq!(drafts[0].agent_matricule, "A-0042");

        // the queue reached the general partition
        let persisted = local.snapshot_get(STORE_KEY).await.unwrap();
        assert_eq!(persisted["draftIncidents"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_same_draft_replaces_not_duplicates() {
        let api = MockIncidentApi::new(false);
        let (service, _local) = service_with(api).await;

        service.submit(form("portail forcé")).await.unwrap();
        let draft_id = service.store().drafts()[0].id.clone();

        // still offline: the retry re-queues under the same id
        service.retry_draft(&draft_id).await.unwrap();

        let drafts = service.store().drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft_id);
    }

    #[tokio::test]
    async fn test_sync_drafts_publishes_in_order_and_drains() {
        let api = MockIncidentApi::new(false);
        let (service, local) = service_with(api.clone()).await;

        service.submit(form("premier")).await.unwrap();
        service.submit(form("second")).await.unwrap();
        assert_eq!(service.store().draft_stats().queued, 2);

        api.set_online(true);
        let report = service.sync_drafts().await;

        assert_eq!(report, SyncReport { published: 2, remaining: 0 });
        assert!(service.store().drafts().is_empty());
        let incidents = service.store().incidents();
        assert_eq!(incidents.len(), 2);
        assert_eq!(incidents[0].description, "premier");
        assert_eq!(incidents[1].description, "second");

        // the emptied queue is persisted too
        let persisted = local.snapshot_get(STORE_KEY).await.unwrap();
        assert!(persisted["draftIncidents"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_drafts_keeps_failures_queued() {
        let api = MockIncidentApi::new(false);
        let (service, _local) = service_with(api).await;

        service.submit(form("premier")).await.unwrap();
        let report = service.sync_drafts().await;

        assert_eq!(report, SyncReport { published: 0, remaining: 1 });
        assert_eq!(service.store().drafts().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_never_reaches_network() {
        let api = MockIncidentApi::new(true);
        let (service, _local) = service_with(api.clone()).await;

        let mut empty_type = form("desc");
        empty_type.incident_type = "  ".to_string();
        assert!(matches!(
            service.submit(empty_type).await,
            Err(Error::Validation(_))
        ));

        let mut too_many_photos = form("desc");
        too_many_photos.photos = (0..7).map(|i| format!("/img/{i}.jpg")).collect();
        assert!(matches!(
            service.submit(too_many_photos).await,
            Err(Error::Validation(_))
        ));

        assert_eq!(api.created.load(Ordering::SeqCst), 0);
        assert!(service.store().drafts().is_empty());
    }

    #[tokio::test]
    async fn test_restore_drafts_reloads_queue() {
        let api = MockIncidentApi::new(false);
        let (service, local) = service_with(api.clone()).await;
        service.submit(form("portail forcé")).await.unwrap();

        // a second service over the same local store simulates a restart
        let (fresh, _) = service_with(api).await;
        let fresh = IncidentService::new(
            fresh.api.clone(),
            Arc::new(IncidentStore::default()),
            fresh.session.clone(),
            local,
            6,
        );
        assert!(fresh.store().drafts().is_empty());
        fresh.restore_drafts().await;
        assert_eq!(fresh.store().drafts().len(), 1);
    }

    #[tokio::test]
    async fn test_discard_draft_is_terminal() {
        let api = MockIncidentApi::new(false);
        let (service, local) = service_with(api).await;
        service.submit(form("portail forcé")).await.unwrap();
        let draft_id = service.store().drafts()[0].id.clone();

        service.discard_draft(&draft_id).await;

        assert!(service.store().drafts().is_empty());
        let persisted = local.snapshot_get(STORE_KEY).await.unwrap();
        assert!(persisted["draftIncidents"].as_array().unwrap().is_empty());
    }
}
