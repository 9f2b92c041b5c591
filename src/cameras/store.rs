//! In-memory camera collection
//!
//! One write lock guards the whole state: every mutator is an atomic
//! snapshot replacement and readers never observe a half-applied update.
//! Mutators that locate an entry by id are silent no-ops when it is
//! absent, and clear the recorded error only when they actually applied.

use super::types::{Camera, CameraUpdate, Mutation, Panne};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct CameraState {
    cameras: Vec<Camera>,
    pannes: Vec<Panne>,
    mutations: Vec<Mutation>,
    selected: Option<Camera>,
    error: Option<String>,
}

/// Camera store instance
#[derive(Default)]
pub struct CameraStore {
    inner: RwLock<CameraState>,
}

impl CameraStore {
    // ========================================
    // Reads
    // ========================================

    pub fn cameras(&self) -> Vec<Camera> {
        self.inner.read().expect("camera store poisoned").cameras.clone()
    }

    pub fn get(&self, id: &str) -> Option<Camera> {
        self.inner
            .read()
            .expect("camera store poisoned")
            .cameras
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Flat fault history across the fleet
    pub fn pannes(&self) -> Vec<Panne> {
        self.inner.read().expect("camera store poisoned").pannes.clone()
    }

    /// Flat relocation history across the fleet
    pub fn mutations(&self) -> Vec<Mutation> {
        self.inner.read().expect("camera store poisoned").mutations.clone()
    }

    pub fn selected(&self) -> Option<Camera> {
        self.inner.read().expect("camera store poisoned").selected.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.read().expect("camera store poisoned").error.clone()
    }

    // ========================================
    // Mutators
    // ========================================

    /// Replace the collection; flat histories are rebuilt from the
    /// embedded ones so both views agree
    pub fn set_all(&self, cameras: Vec<Camera>) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        inner.pannes = cameras
            .iter()
            .flat_map(|c| c.historique_pannes.iter().cloned())
            .collect();
        inner.mutations = cameras
            .iter()
            .flat_map(|c| c.historique_mutations.iter().cloned())
            .collect();
        inner.cameras = cameras;
        inner.error = None;
    }

    /// Append a camera; an already-present id is a no-op
    pub fn add(&self, camera: Camera) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        if inner.cameras.iter().any(|c| c.id == camera.id) {
            debug!(camera_id = %camera.id, "Duplicate camera id ignored");
            return;
        }
        inner.pannes.extend(camera.historique_pannes.iter().cloned());
        inner
            .mutations
            .extend(camera.historique_mutations.iter().cloned());
        inner.cameras.push(camera);
        inner.error = None;
    }

    /// Merge fields into the matching camera; unknown ids change nothing
    pub fn update(&self, id: &str, update: &CameraUpdate) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        if let Some(camera) = inner.cameras.iter_mut().find(|c| c.id == id) {
            update.apply(camera);
            inner.error = None;
        }
    }

    /// Evict the matching camera from the local cache (not a backend delete)
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        let before = inner.cameras.len();
        inner.cameras.retain(|c| c.id != id);
        if inner.cameras.len() != before {
            inner.error = None;
        }
    }

    /// Hold at most one camera for screen handoff
    pub fn set_selected(&self, camera: Option<Camera>) {
        self.inner.write().expect("camera store poisoned").selected = camera;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().expect("camera store poisoned").error = Some(message.into());
    }

    /// Append a fault record to the flat list and to the owning camera's
    /// embedded history in the same update; unknown camera ids change nothing
    pub fn add_panne(&self, panne: Panne) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        match inner.cameras.iter_mut().find(|c| c.id == panne.camera_id) {
            Some(camera) => {
                camera.historique_pannes.push(panne.clone());
                inner.pannes.push(panne);
                inner.error = None;
            }
            None => debug!(camera_id = %panne.camera_id, "Panne for unknown camera ignored"),
        }
    }

    /// Append a relocation record to both views and move the camera to its
    /// new zone/location, all under the same write
    pub fn add_mutation(&self, mutation: Mutation) {
        let mut inner = self.inner.write().expect("camera store poisoned");
        match inner
            .cameras
            .iter_mut()
            .find(|c| c.id == mutation.camera_id)
        {
            Some(camera) => {
                camera.zone = mutation.to_zone.clone();
                camera.location = mutation.to_location.clone();
                camera.historique_mutations.push(mutation.clone());
                inner.mutations.push(mutation);
                inner.error = None;
            }
            None => {
                debug!(camera_id = %mutation.camera_id, "Mutation for unknown camera ignored")
            }
        }
    }

    /// Drop everything (tests, context disposal)
    pub fn reset(&self) {
        *self.inner.write().expect("camera store poisoned") = CameraState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cameras::types::CameraStatus;
    use chrono::NaiveDate;

    fn camera(id: &str) -> Camera {
        Camera {
            id: id.to_string(),
            serial_number: format!("SN-{id}"),
            zone: "A".to_string(),
            location: "portique 1".to_string(),
            ip_address: "10.0.0.1".to_string(),
            status: CameraStatus::Online,
            installed_on: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
            position: None,
            historique_pannes: vec![],
            historique_mutations: vec![],
        }
    }

    fn panne(id: &str, camera_id: &str) -> Panne {
        Panne {
            id: id.to_string(),
            camera_id: camera_id.to_string(),
            description: "image figée".to_string(),
            reported_at: chrono::Utc::now(),
            reported_by: "T-0009".to_string(),
            resolved: false,
        }
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1")]);

        let before = store.cameras();
        store.update(
            "cam-404",
            &CameraUpdate {
                zone: Some("Z".to_string()),
                ..CameraUpdate::default()
            },
        );

        assert_eq!(store.cameras(), before);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1"), camera("cam-2")]);

        store.remove("cam-1");
        assert_eq!(store.cameras().len(), 1);

        store.remove("cam-1");
        assert_eq!(store.cameras().len(), 1);
        assert_eq!(store.cameras()[0].id, "cam-2");
    }

    #[test]
    fn test_add_duplicate_id_ignored() {
        let store = CameraStore::default();
        store.add(camera("cam-1"));
        store.add(camera("cam-1"));
        assert_eq!(store.cameras().len(), 1);
    }

    #[test]
    fn test_add_panne_updates_both_views() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1"), camera("cam-2")]);

        store.add_panne(panne("p-1", "cam-1"));

        let flat = store.pannes();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].id, "p-1");

        let embedded = &store.get("cam-1").unwrap().historique_pannes;
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].id, "p-1");
        assert!(store.get("cam-2").unwrap().historique_pannes.is_empty());
    }

    #[test]
    fn test_add_panne_unknown_camera_is_noop() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1")]);

        store.add_panne(panne("p-1", "cam-404"));

        assert!(store.pannes().is_empty());
        assert!(store.get("cam-1").unwrap().historique_pannes.is_empty());
    }

    #[test]
    fn test_add_mutation_moves_camera() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1")]);

        store.add_mutation(Mutation {
            id: "m-1".to_string(),
            camera_id: "cam-1".to_string(),
            from_zone: "A".to_string(),
            to_zone: "B".to_string(),
            from_location: "portique 1".to_string(),
            to_location: "magasin 7".to_string(),
            moved_at: chrono::Utc::now(),
            moved_by: "T-0009".to_string(),
        });

        let moved = store.get("cam-1").unwrap();
        assert_eq!(moved.zone, "B");
        assert_eq!(moved.location, "magasin 7");
        assert_eq!(moved.historique_mutations.len(), 1);
        assert_eq!(store.mutations().len(), 1);
    }

    #[test]
    fn test_set_all_rebuilds_flat_histories() {
        let store = CameraStore::default();
        let mut with_history = camera("cam-1");
        with_history.historique_pannes.push(panne("p-9", "cam-1"));

        store.set_all(vec![with_history, camera("cam-2")]);

        assert_eq!(store.pannes().len(), 1);
        assert_eq!(store.pannes()[0].id, "p-9");
    }

    #[test]
    fn test_successful_mutator_clears_error() {
        let store = CameraStore::default();
        store.set_all(vec![camera("cam-1")]);
        store.set_error("Impossible de charger les caméras");

        store.update(
            "cam-1",
            &CameraUpdate {
                zone: Some("C".to_string()),
                ..CameraUpdate::default()
            },
        );

        assert!(store.error().is_none());
    }
}
