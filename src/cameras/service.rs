//! Camera fleet actions
//!
//! Screen-facing operations: each one calls the API client and, on
//! success, applies the backend's answer to the store. Rejections and
//! network failures land on the store's error field for the screen to
//! render.

use super::store::CameraStore;
use super::types::{is_valid_ipv4, Camera, CameraUpdate, Mutation, NewCamera, NewMutation, NewPanne, Panne};
use crate::api_client::{surface_message, CameraApi};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

const MSG_LOAD: &str = "Impossible de charger les caméras";
const MSG_SAVE: &str = "Impossible d'enregistrer la caméra";
const MSG_PANNE: &str = "Impossible de déclarer la panne";
const MSG_MUTATION: &str = "Impossible de déclarer la mutation";

/// Camera service instance
pub struct CameraService {
    api: Arc<dyn CameraApi>,
    store: Arc<CameraStore>,
}

impl CameraService {
    pub fn new(api: Arc<dyn CameraApi>, store: Arc<CameraStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &CameraStore {
        &self.store
    }

    /// Reload the fleet from the backend
    pub async fn refresh(&self) -> Result<usize> {
        match self.api.list_cameras().await {
            Ok(cameras) => {
                let count = cameras.len();
                self.store.set_all(cameras);
                Ok(count)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_LOAD));
                Err(e.into())
            }
        }
    }

    /// Register a camera
    pub async fn create(&self, new: NewCamera) -> Result<Camera> {
        if !is_valid_ipv4(&new.ip_address) {
            return Err(Error::Validation(format!(
                "Adresse IP invalide: {}",
                new.ip_address
            )));
        }

        match self.api.create_camera(&new).await {
            Ok(camera) => {
                info!(camera_id = %camera.id, zone = %camera.zone, "Camera registered");
                self.store.add(camera.clone());
                Ok(camera)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_SAVE));
                Err(e.into())
            }
        }
    }

    /// Update a camera
    pub async fn update(&self, id: &str, update: CameraUpdate) -> Result<Camera> {
        if let Some(ref ip) = update.ip_address {
            if !is_valid_ipv4(ip) {
                return Err(Error::Validation(format!("Adresse IP invalide: {ip}")));
            }
        }

        match self.api.update_camera(id, &update).await {
            Ok(camera) => {
                self.store.update(id, &update);
                Ok(camera)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_SAVE));
                Err(e.into())
            }
        }
    }

    /// Declare a fault on a camera
    pub async fn declare_panne(&self, camera_id: &str, panne: NewPanne) -> Result<Panne> {
        if panne.description.trim().is_empty() {
            return Err(Error::Validation(
                "La description de la panne est requise".to_string(),
            ));
        }

        match self.api.declare_panne(camera_id, &panne).await {
            Ok(recorded) => {
                info!(camera_id = %camera_id, panne_id = %recorded.id, "Panne declared");
                self.store.add_panne(recorded.clone());
                Ok(recorded)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_PANNE));
                Err(e.into())
            }
        }
    }

    /// Declare a relocation of a camera
    pub async fn declare_mutation(
        &self,
        camera_id: &str,
        mutation: NewMutation,
    ) -> Result<Mutation> {
        match self.api.declare_mutation(camera_id, &mutation).await {
            Ok(recorded) => {
                info!(
                    camera_id = %camera_id,
                    to_zone = %recorded.to_zone,
                    "Mutation declared"
                );
                self.store.add_mutation(recorded.clone());
                Ok(recorded)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_MUTATION));
                Err(e.into())
            }
        }
    }
}
