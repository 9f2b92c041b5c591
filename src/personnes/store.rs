//! In-memory personne collection
//!
//! Same locking discipline as the other stores: one write lock, atomic
//! snapshot replacements, silent no-ops on unknown ids.

use super::types::{Interpellation, Personne, PersonneUpdate};
use std::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct PersonneState {
    personnes: Vec<Personne>,
    selected: Option<Personne>,
    error: Option<String>,
}

/// Personne store instance
#[derive(Default)]
pub struct PersonneStore {
    inner: RwLock<PersonneState>,
}

impl PersonneStore {
    // ========================================
    // Reads
    // ========================================

    pub fn personnes(&self) -> Vec<Personne> {
        self.inner
            .read()
            .expect("personne store poisoned")
            .personnes
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Personne> {
        self.inner
            .read()
            .expect("personne store poisoned")
            .personnes
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn selected(&self) -> Option<Personne> {
        self.inner
            .read()
            .expect("personne store poisoned")
            .selected
            .clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner
            .read()
            .expect("personne store poisoned")
            .error
            .clone()
    }

    // ========================================
    // Mutators
    // ========================================

    /// Replace the collection
    pub fn set_all(&self, personnes: Vec<Personne>) {
        let mut inner = self.inner.write().expect("personne store poisoned");
        inner.personnes = personnes;
        inner.error = None;
    }

    /// Append a personne; an already-present id is a no-op
    pub fn add(&self, personne: Personne) {
        let mut inner = self.inner.write().expect("personne store poisoned");
        if inner.personnes.iter().any(|p| p.id == personne.id) {
            debug!(personne_id = %personne.id, "Duplicate personne id ignored");
            return;
        }
        inner.personnes.push(personne);
        inner.error = None;
    }

    /// Merge fields into the matching personne; unknown ids change nothing
    pub fn update(&self, id: &str, update: &PersonneUpdate) {
        let mut inner = self.inner.write().expect("personne store poisoned");
        if let Some(personne) = inner.personnes.iter_mut().find(|p| p.id == id) {
            update.apply(personne);
            inner.error = None;
        }
    }

    /// Evict the matching personne from the local cache
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.write().expect("personne store poisoned");
        let before = inner.personnes.len();
        inner.personnes.retain(|p| p.id != id);
        if inner.personnes.len() != before {
            inner.error = None;
        }
    }

    pub fn set_selected(&self, personne: Option<Personne>) {
        self.inner.write().expect("personne store poisoned").selected = personne;
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().expect("personne store poisoned").error = Some(message.into());
    }

    /// Append an interpellation record to the owning personne; unknown
    /// personne ids change nothing
    pub fn add_interpellation(&self, interpellation: Interpellation) {
        let mut inner = self.inner.write().expect("personne store poisoned");
        match inner
            .personnes
            .iter_mut()
            .find(|p| p.id == interpellation.personne_id)
        {
            Some(personne) => {
                personne.interpellations.push(interpellation);
                inner.error = None;
            }
            None => debug!(
                personne_id = %interpellation.personne_id,
                "Interpellation for unknown personne ignored"
            ),
        }
    }

    /// Drop everything (tests, context disposal)
    pub fn reset(&self) {
        *self.inner.write().expect("personne store poisoned") = PersonneState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personnes::types::{InterpellationStatus, PersonneStatut};

    fn personne(id: &str) -> Personne {
        Personne {
            id: id.to_string(),
            nom: "Rabe".to_string(),
            prenom: None,
            cin: "101231456789".to_string(),
            statut: PersonneStatut::Externe,
            photo: None,
            interpellations: vec![],
            deleted: false,
        }
    }

    #[test]
    fn test_update_unknown_id_changes_nothing() {
        let store = PersonneStore::default();
        store.set_all(vec![personne("per-1")]);

        let before = store.personnes();
        store.update(
            "per-404",
            &PersonneUpdate {
                nom: Some("Autre".to_string()),
                ..PersonneUpdate::default()
            },
        );
        assert_eq!(store.personnes(), before);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = PersonneStore::default();
        store.set_all(vec![personne("per-1")]);
        store.remove("per-1");
        store.remove("per-1");
        assert!(store.personnes().is_empty());
    }

    #[test]
    fn test_add_interpellation_reaches_owner_only() {
        let store = PersonneStore::default();
        store.set_all(vec![personne("per-1"), personne("per-2")]);

        store.add_interpellation(Interpellation {
            id: "int-1".to_string(),
            personne_id: "per-1".to_string(),
            fait: "vol de marchandise".to_string(),
            statut: InterpellationStatus::EnGarde,
            recorded_at: chrono::Utc::now(),
            recorded_by: "A-0042".to_string(),
        });

        assert_eq!(store.get("per-1").unwrap().interpellations.len(), 1);
        assert!(store.get("per-2").unwrap().interpellations.is_empty());
    }
}
