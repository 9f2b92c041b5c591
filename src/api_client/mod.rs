//! API client - the only component permitted to talk to the network
//!
//! ## Responsibilities
//!
//! - One `reqwest` client with boundary timeouts
//! - Envelope interpretation (`{success, data, message, errors}`)
//! - Bearer-token attachment from the session token cell; domain stores
//!   never see tokens
//!
//! Per-domain traits form the seam the stores program against; `ApiClient`
//! implements all of them.

mod types;

pub use types::*;

use crate::cameras::{Camera, CameraUpdate, Mutation, NewCamera, NewMutation, NewPanne, Panne};
use crate::config::AppConfig;
use crate::incidents::{Incident, IncidentPayload, ValidationRequest};
use crate::personnes::{Interpellation, NewInterpellation, NewPersonne, Personne};
use crate::reports::{NewReport, Report};
use crate::session::{Credentials, TokenCell, User};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

// ============================================================
// Seam traits
// ============================================================

/// Authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginData, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    /// Lightweight authenticated probe of the "current user" endpoint
    async fn current_user(&self) -> Result<User, ApiError>;
}

/// Camera fleet endpoints
#[async_trait]
pub trait CameraApi: Send + Sync {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ApiError>;
    async fn create_camera(&self, new: &NewCamera) -> Result<Camera, ApiError>;
    async fn update_camera(&self, id: &str, update: &CameraUpdate) -> Result<Camera, ApiError>;
    async fn declare_panne(&self, camera_id: &str, panne: &NewPanne) -> Result<Panne, ApiError>;
    async fn declare_mutation(
        &self,
        camera_id: &str,
        mutation: &NewMutation,
    ) -> Result<Mutation, ApiError>;
}

/// Incident endpoints
#[async_trait]
pub trait IncidentApi: Send + Sync {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError>;
    async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, ApiError>;
    async fn validate_incident(
        &self,
        id: &str,
        verdict: &ValidationRequest,
    ) -> Result<Incident, ApiError>;
    async fn soft_delete_incident(&self, id: &str) -> Result<(), ApiError>;
    async fn restore_incident(&self, id: &str) -> Result<Incident, ApiError>;
    async fn purge_incident(&self, id: &str) -> Result<(), ApiError>;
}

/// Personne (Efa Tratra) endpoints
#[async_trait]
pub trait PersonneApi: Send + Sync {
    async fn list_personnes(&self) -> Result<Vec<Personne>, ApiError>;
    async fn create_personne(&self, new: &NewPersonne) -> Result<Personne, ApiError>;
    async fn add_interpellation(
        &self,
        personne_id: &str,
        interpellation: &NewInterpellation,
    ) -> Result<Interpellation, ApiError>;
    async fn soft_delete_personne(&self, id: &str) -> Result<(), ApiError>;
    async fn restore_personne(&self, id: &str) -> Result<Personne, ApiError>;
}

/// Report endpoints
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn list_reports(&self) -> Result<Vec<Report>, ApiError>;
    async fn generate_report(&self, new: &NewReport) -> Result<Report, ApiError>;
}

// ============================================================
// HTTP implementation
// ============================================================

/// REST client against the Vigie backend
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<TokenCell>,
}

impl ApiClient {
    /// Create the client; timeouts live here, at the boundary
    pub fn new(config: &AppConfig, tokens: Arc<TokenCell>) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.tokens.access_token().ok_or(ApiError::Unauthenticated)
    }

    /// One request/response cycle, always yielding an envelope
    ///
    /// Non-2xx responses without a decodable envelope become a rejection
    /// carrying the HTTP status; transport failures become `Network`.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authed: bool,
    ) -> Result<ApiEnvelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let mut req = self.http.request(method.clone(), self.url(path));
        if authed {
            req = req.bearer_auth(self.bearer()?);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        debug!(method = %method, path = %path, "API request");

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();

        match resp.json::<ApiEnvelope<T>>().await {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Ok(ApiEnvelope {
                success: false,
                data: None,
                message: Some(format!("HTTP {}", status.as_u16())),
                errors: None,
            }),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, ApiError> {
        self.request(Method::GET, path, None::<&()>, true).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.request(Method::POST, path, Some(body), true).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, ApiError> {
        self.request(Method::POST, path, None::<&()>, true).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiEnvelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), true).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiEnvelope<T>, ApiError> {
        self.request(Method::DELETE, path, None::<&()>, true).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginData, ApiError> {
        self.request::<LoginData, _>(Method::POST, "/auth/login", Some(credentials), false)
            .await?
            .into_result()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty::<serde_json::Value>("/auth/logout")
            .await?
            .into_empty_result()
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get::<User>("/auth/me").await?.into_result()
    }
}

#[async_trait]
impl CameraApi for ApiClient {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ApiError> {
        self.get::<Vec<Camera>>("/cameras").await?.into_result()
    }

    async fn create_camera(&self, new: &NewCamera) -> Result<Camera, ApiError> {
        self.post::<Camera, _>("/cameras", new).await?.into_result()
    }

    async fn update_camera(&self, id: &str, update: &CameraUpdate) -> Result<Camera, ApiError> {
        self.put::<Camera, _>(&format!("/cameras/{id}"), update)
            .await?
            .into_result()
    }

    async fn declare_panne(&self, camera_id: &str, panne: &NewPanne) -> Result<Panne, ApiError> {
        self.post::<Panne, _>(&format!("/cameras/{camera_id}/pannes"), panne)
            .await?
            .into_result()
    }

    async fn declare_mutation(
        &self,
        camera_id: &str,
        mutation: &NewMutation,
    ) -> Result<Mutation, ApiError> {
        self.post::<Mutation, _>(&format!("/cameras/{camera_id}/mutations"), mutation)
            .await?
            .into_result()
    }
}

#[async_trait]
impl IncidentApi for ApiClient {
    async fn list_incidents(&self) -> Result<Vec<Incident>, ApiError> {
        self.get::<Vec<Incident>>("/incidents").await?.into_result()
    }

    async fn create_incident(&self, payload: &IncidentPayload) -> Result<Incident, ApiError> {
        self.post::<Incident, _>("/incidents", payload)
            .await?
            .into_result()
    }

    async fn validate_incident(
        &self,
        id: &str,
        verdict: &ValidationRequest,
    ) -> Result<Incident, ApiError> {
        self.post::<Incident, _>(&format!("/incidents/{id}/validation"), verdict)
            .await?
            .into_result()
    }

    async fn soft_delete_incident(&self, id: &str) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("/incidents/{id}"))
            .await?
            .into_empty_result()
    }

    async fn restore_incident(&self, id: &str) -> Result<Incident, ApiError> {
        self.post_empty::<Incident>(&format!("/incidents/{id}/restore"))
            .await?
            .into_result()
    }

    async fn purge_incident(&self, id: &str) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("/incidents/{id}/definitif"))
            .await?
            .into_empty_result()
    }
}

#[async_trait]
impl PersonneApi for ApiClient {
    async fn list_personnes(&self) -> Result<Vec<Personne>, ApiError> {
        self.get::<Vec<Personne>>("/personnes").await?.into_result()
    }

    async fn create_personne(&self, new: &NewPersonne) -> Result<Personne, ApiError> {
        self.post::<Personne, _>("/personnes", new)
            .await?
            .into_result()
    }

    async fn add_interpellation(
        &self,
        personne_id: &str,
        interpellation: &NewInterpellation,
    ) -> Result<Interpellation, ApiError> {
        self.post::<Interpellation, _>(
            &format!("/personnes/{personne_id}/interpellations"),
            interpellation,
        )
        .await?
        .into_result()
    }

    async fn soft_delete_personne(&self, id: &str) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("/personnes/{id}"))
            .await?
            .into_empty_result()
    }

    async fn restore_personne(&self, id: &str) -> Result<Personne, ApiError> {
        self.post_empty::<Personne>(&format!("/personnes/{id}/restore"))
            .await?
            .into_result()
    }
}

#[async_trait]
impl ReportApi for ApiClient {
    async fn list_reports(&self) -> Result<Vec<Report>, ApiError> {
        self.get::<Vec<Report>>("/rapports").await?.into_result()
    }

    async fn generate_report(&self, new: &NewReport) -> Result<Report, ApiError> {
        self.post::<Report, _>("/rapports", new).await?.into_result()
    }
}
