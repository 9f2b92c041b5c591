//! End-to-end offline incident scenario
//!
//! A field agent submits an incident while the backend is unreachable,
//! the app restarts, connectivity returns, and an explicit sync publishes
//! the queued draft.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use vigie_client::api_client::{ApiError, AuthApi, IncidentApi, LoginData};
use vigie_client::incidents::{
    Incident, IncidentPayload, IncidentService, IncidentStatus, IncidentStore, NewIncident,
    SubmissionOutcome, ValidationRequest,
};
use vigie_client::local_store::LocalStore;
use vigie_client::session::{Credentials, Role, SessionState, TokenCell, User};

struct StubAuth;

#[async_trait]
impl AuthApi for StubAuth {
    async fn login(&self, _c: &Credentials) -> Result<LoginData, ApiError> {
        Err(ApiError::Unauthenticated)
    }
    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
    async fn current_user(&self) -> Result<User, ApiError> {
        Err(ApiError::Unauthenticated)
    }
}

/// Backend double whose connectivity can be flipped mid-scenario
struct FlakyBackend {
    online: AtomicBool,
    next_id: AtomicUsize,
}

impl FlakyBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(false),
            next_id: AtomicUsize::new(1),
        })
    }
}

#[async_trait]
impl IncidentApi for FlakyBackend {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        Ok(vec![])
    }

    async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, ApiError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
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
    ) -> Result<Incident, ApiError> {
        Err(ApiError::Network("connection refused".to_string()))
    }

    async fn soft_delete_incident(&self, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn restore_incident(&self, _id: &str) -> Result<Incident, ApiError> {
        Err(ApiError::Network("connection refused".to_string()))
    }

    async fn purge_incident(&self, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

fn agent() -> User {
    User {
        matricule: "A-0042".to_string(),
        nom: "Rakoto".to_string(),
        prenom: Some("Jean".to_string()),
        email: None,
        telephone: None,
        role: Role::FieldAgent,
        actif: true,
        dernier_login: None,
    }
}

fn incident_service(backend: Arc<FlakyBackend>, local: Arc<LocalStore>) -> IncidentService {
    let session = Arc::new(SessionState::new(
        Arc::new(StubAuth),
        local.clone(),
        Arc::new(TokenCell::default()),
    ));
    session.set_user(agent());

    IncidentService::new(
        backend,
        Arc::new(IncidentStore::default()),
        session,
        local,
        6,
    )
}

#[tokio::test]
async fn offline_submission_survives_restart_and_syncs() {
    let backend = FlakyBackend::new();
    let local = Arc::new(LocalStore::open_in_memory().await.unwrap());

    // --- offline: submission becomes a persisted draft -----------------
    let service = incident_service(backend.clone(), local.clone());

    let outcome = service
        .submit(NewIncident {
            incident_type: "intrusion".to_string(),
            description: "portail forcé côté quai 4".to_string(),
            occurred_at: None,
            zone: "quai 4".to_string(),
            photos: vec![],
        })
        .await
        .unwrap();

    let draft_id = match outcome {
        SubmissionOutcome::SavedOffline { draft_id } => draft_id,
        SubmissionOutcome::Published(_) => panic!("backend was supposed to be offline"),
    };
    assert_eq!(service.store().drafts().len(), 1);
    assert!(service.store().incidents().is_empty());

    // --- restart: a fresh service over the same local store ------------
    let service = incident_service(backend.clone(), local.clone());
    assert!(service.store().drafts().is_empty());

    service.restore_drafts().await;
    let restored = service.store().drafts();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id, draft_id);
    assert_eq!(restored[0].agent_matricule, "A-0042");

    // --- connectivity returns: explicit sync publishes the draft -------
    backend.online.store(true, Ordering::SeqCst);
    let report = service.sync_drafts().await;

    assert_eq!(report.published, 1);
    assert_eq!(report.remaining, 0);
    assert!(service.store().drafts().is_empty());

    let incidents = service.store().incidents();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].id, "srv-1");
    assert_eq!(incidents[0].description, "portail forcé côté quai 4");

    // the emptied queue is what the next restart will see
    let service = incident_service(backend, local);
    service.restore_drafts().await;
    assert!(service.store().drafts().is_empty());
}
