//! Personne record actions (Efa Tratra register)

use super::store::PersonneStore;
use super::types::{
    is_valid_cin, Interpellation, NewInterpellation, NewPersonne, Personne, PersonneUpdate,
};
use crate::api_client::{surface_message, PersonneApi};
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::info;

const MSG_LOAD: &str = "Impossible de charger les personnes";
const MSG_SAVE: &str = "Impossible d'enregistrer la personne";
const MSG_INTERPELLATION: &str = "Impossible d'enregistrer l'interpellation";
const MSG_DELETE: &str = "Impossible de supprimer la fiche";
const MSG_RESTORE: &str = "Impossible de restaurer la fiche";

/// Personne service instance
pub struct PersonneService {
    api: Arc<dyn PersonneApi>,
    store: Arc<PersonneStore>,
}

impl PersonneService {
    pub fn new(api: Arc<dyn PersonneApi>, store: Arc<PersonneStore>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &PersonneStore {
        &self.store
    }

    /// Reload the register from the backend
    pub async fn refresh(&self) -> Result<usize> {
        match self.api.list_personnes().await {
            Ok(personnes) => {
                let count = personnes.len();
                self.store.set_all(personnes);
                Ok(count)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_LOAD));
                Err(e.into())
            }
        }
    }

    /// Register an interpellated individual
    pub async fn register(&self, new: NewPersonne) -> Result<Personne> {
        if new.nom.trim().is_empty() {
            return Err(Error::Validation("Le nom est requis".to_string()));
        }
        if !is_valid_cin(&new.cin) {
            return Err(Error::Validation(
                "Le CIN doit comporter 12 chiffres".to_string(),
            ));
        }

        match self.api.create_personne(&new).await {
            Ok(personne) => {
                info!(personne_id = %personne.id, "Personne registered");
                self.store.add(personne.clone());
                Ok(personne)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_SAVE));
                Err(e.into())
            }
        }
    }

    /// Record an interpellation against an existing personne
    pub async fn register_interpellation(
        &self,
        personne_id: &str,
        interpellation: NewInterpellation,
    ) -> Result<Interpellation> {
        if interpellation.fait.trim().is_empty() {
            return Err(Error::Validation("Le fait associé est requis".to_string()));
        }

        match self
            .api
            .add_interpellation(personne_id, &interpellation)
            .await
        {
            Ok(recorded) => {
                info!(
                    personne_id = %personne_id,
                    interpellation_id = %recorded.id,
                    "Interpellation recorded"
                );
                self.store.add_interpellation(recorded.clone());
                Ok(recorded)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_INTERPELLATION));
                Err(e.into())
            }
        }
    }

    /// Soft delete: the record stays in the collection, flagged
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        match self.api.soft_delete_personne(id).await {
            Ok(()) => {
                self.store.update(
                    id,
                    &PersonneUpdate {
                        deleted: Some(true),
                        ..PersonneUpdate::default()
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
    pub async fn restore(&self, id: &str) -> Result<Personne> {
        match self.api.restore_personne(id).await {
            Ok(personne) => {
                self.store.update(
                    id,
                    &PersonneUpdate {
                        deleted: Some(false),
                        ..PersonneUpdate::default()
                    },
                );
                Ok(personne)
            }
            Err(e) => {
                self.store.set_error(surface_message(&e, MSG_RESTORE));
                Err(e.into())
            }
        }
    }
}
