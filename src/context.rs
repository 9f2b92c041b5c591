//! Application context
//!
//! Explicit composition root: built once at app start, handed to screens,
//! disposed (or reset) in tests. Nothing in this crate lives in a
//! module-level singleton.

use crate::api_client::ApiClient;
use crate::cameras::{CameraService, CameraStore};
use crate::config::AppConfig;
use crate::error::Result;
use crate::images::ImageService;
use crate::incidents::{IncidentService, IncidentStore};
use crate::local_store::LocalStore;
use crate::personnes::{PersonneService, PersonneStore};
use crate::reports::{ReportService, ReportStore};
use crate::session::{SessionState, TokenCell};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How often the background image sweep runs
const IMAGE_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Application context shared with every screen
pub struct AppContext {
    pub config: AppConfig,
    pub local: Arc<LocalStore>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionState>,
    pub cameras: Arc<CameraService>,
    pub incidents: Arc<IncidentService>,
    pub personnes: Arc<PersonneService>,
    pub reports: Arc<ReportService>,
    pub images: Arc<ImageService>,
}

impl AppContext {
    /// Build the full component graph and restore persisted state
    ///
    /// Session revalidation and draft restoration happen here, so by the
    /// time this returns the caller can trust `session.is_initialized()`.
    pub async fn init(config: AppConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let local = Arc::new(LocalStore::open(&config.database_url()).await?);
        let tokens = Arc::new(TokenCell::default());
        let api = Arc::new(ApiClient::new(&config, tokens.clone()));
        let session = Arc::new(SessionState::new(api.clone(), local.clone(), tokens));
        let images = Arc::new(ImageService::new(config.images_dir()).await?);

        let cameras = Arc::new(CameraService::new(
            api.clone(),
            Arc::new(CameraStore::default()),
        ));
        let incidents = Arc::new(IncidentService::new(
            api.clone(),
            Arc::new(IncidentStore::default()),
            session.clone(),
            local.clone(),
            config.max_photos_per_incident,
        ));
        let personnes = Arc::new(PersonneService::new(
            api.clone(),
            Arc::new(PersonneStore::default()),
        ));
        let reports = Arc::new(ReportService::new(
            api.clone(),
            Arc::new(ReportStore::default()),
        ));

        session.initialize().await;
        incidents.restore_drafts().await;

        info!(
            data_dir = %config.data_dir.display(),
            authenticated = session.is_authenticated(),
            drafts = incidents.store().draft_stats().queued,
            "Application context initialized"
        );

        Ok(Self {
            config,
            local,
            api,
            session,
            cameras,
            incidents,
            personnes,
            reports,
            images,
        })
    }

    /// Build from environment configuration
    pub async fn init_from_env() -> Result<Self> {
        Self::init(AppConfig::from_env()).await
    }

    /// Start the periodic image sweep for the configured retention
    pub fn start_image_sweeper(&self) -> tokio::task::JoinHandle<()> {
        Arc::clone(&self.images)
            .spawn_cleanup_task(IMAGE_SWEEP_INTERVAL, self.config.image_retention_days)
    }

    /// Flush persisted subsets and clear every in-memory collection
    ///
    /// Used by tests between scenarios and by hosts on shutdown; the
    /// persisted state (session, drafts) survives for the next `init`.
    pub async fn dispose(&self) {
        self.incidents.persist_drafts().await;
        self.session.persist_session().await;
        self.reset_stores();
    }

    /// Clear the in-memory collections only
    pub fn reset_stores(&self) {
        self.cameras.store().reset();
        self.incidents.store().reset();
        self.personnes.store().reset();
        self.reports.store().reset();
    }
}
