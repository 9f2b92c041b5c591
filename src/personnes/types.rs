//! Personne domain types (Efa Tratra records)
//!
//! A personne is an interpellated individual; each carries the full list of
//! interpellation records made against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal (port worker) or external individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonneStatut {
    Interne,
    Externe,
}

impl Default for PersonneStatut {
    fn default() -> Self {
        Self::Externe
    }
}

impl std::fmt::Display for PersonneStatut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interne => write!(f, "interne"),
            Self::Externe => write!(f, "externe"),
        }
    }
}

impl From<&str> for PersonneStatut {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "interne" => Self::Interne,
            _ => Self::Externe,
        }
    }
}

/// Custody outcome of one interpellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpellationStatus {
    EnGarde,
    Libere,
    Transfere,
}

impl std::fmt::Display for InterpellationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnGarde => write!(f, "en_garde"),
            Self::Libere => write!(f, "libere"),
            Self::Transfere => write!(f, "transfere"),
        }
    }
}

impl From<&str> for InterpellationStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "libere" => Self::Libere,
            "transfere" => Self::Transfere,
            _ => Self::EnGarde,
        }
    }
}

/// Interpellation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpellation {
    pub id: String,
    pub personne_id: String,
    /// Fact the interpellation is associated with
    pub fait: String,
    pub statut: InterpellationStatus,
    pub recorded_at: DateTime<Utc>,
    /// Matricule of the recording agent
    pub recorded_by: String,
}

/// Personne entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personne {
    pub id: String,
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    /// National identity card number, 12 digits
    pub cin: String,
    #[serde(default)]
    pub statut: PersonneStatut,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub interpellations: Vec<Interpellation>,
    #[serde(default)]
    pub deleted: bool,
}

/// Personne creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonne {
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    pub cin: String,
    pub statut: PersonneStatut,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Partial personne update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statut: Option<PersonneStatut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl PersonneUpdate {
    /// Merge the set fields into an existing personne
    pub fn apply(&self, personne: &mut Personne) {
        if let Some(ref nom) = self.nom {
            personne.nom = nom.clone();
        }
        if let Some(ref prenom) = self.prenom {
            personne.prenom = Some(prenom.clone());
        }
        if let Some(statut) = self.statut {
            personne.statut = statut;
        }
        if let Some(ref photo) = self.photo {
            personne.photo = Some(photo.clone());
        }
        if let Some(deleted) = self.deleted {
            personne.deleted = deleted;
        }
    }
}

/// Interpellation declaration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterpellation {
    pub fait: String,
    pub statut: InterpellationStatus,
}

/// CIN format check: exactly 12 ASCII digits
pub fn is_valid_cin(s: &str) -> bool {
    s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cin_validation() {
        assert!(is_valid_cin("101231456789"));
        assert!(!is_valid_cin("10123145678"));
        assert!(!is_valid_cin("1012314567890"));
        assert!(!is_valid_cin("10123145678a"));
    }

    #[test]
    fn test_statut_wire_forms() {
        assert_eq!(PersonneStatut::from("interne"), PersonneStatut::Interne);
        assert_eq!(PersonneStatut::from("autre"), PersonneStatut::Externe);
        assert_eq!(
            InterpellationStatus::from("transfere"),
            InterpellationStatus::Transfere
        );
        assert_eq!(
            InterpellationStatus::from("?"),
            InterpellationStatus::EnGarde
        );
    }
}
