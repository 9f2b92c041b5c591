//! Incident domain types
//!
//! An incident either comes back from the backend (backend-issued id) or is
//! built locally with a client-generated id when the submission could not
//! reach the server; the latter lives in the draft queue until a retry
//! succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted store key for the drafts snapshot (general partition)
pub const STORE_KEY: &str = "incidents";

/// Review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    Validated,
    Rejected,
}

impl Default for IncidentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Validated => write!(f, "validated"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl From<&str> for IncidentStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "validated" => Self::Validated,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }
}

/// Review metadata, present once a supervisor has ruled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationInfo {
    /// Matricule of the validating supervisor
    pub validated_by: String,
    pub validated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Incident entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub zone: String,
    /// Matricule of the reporting agent
    pub agent_matricule: String,
    /// Local paths or remote paths, at most the configured maximum
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Incident form input (from a report screen)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncident {
    #[serde(rename = "type")]
    pub incident_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub zone: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Partial incident update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

impl IncidentUpdate {
    /// Merge the set fields into an existing incident
    pub fn apply(&self, incident: &mut Incident) {
        if let Some(ref description) = self.description {
            incident.description = description.clone();
        }
        if let Some(ref zone) = self.zone {
            incident.zone = zone.clone();
        }
        if let Some(status) = self.status {
            incident.status = status;
        }
        if let Some(deleted) = self.deleted {
            incident.deleted = deleted;
        }
        if let Some(ref validation) = self.validation {
            incident.validation = Some(validation.clone());
        }
    }
}

/// Supervisor ruling payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub status: IncidentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Photo attachment shipped inline with a creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data_base64: String,
}

/// Wire payload for remote incident creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPayload {
    #[serde(rename = "type")]
    pub incident_type: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub zone: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<PhotoUpload>,
    /// Client-generated id of the draft being replayed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
}

/// Persisted subset of the incidents store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsSnapshot {
    pub draft_incidents: Vec<Incident>,
}

/// Caller-visible result of one submission attempt
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The backend accepted the incident
    Published(Incident),
    /// The incident is queued locally awaiting connectivity
    SavedOffline { draft_id: String },
}

/// Result of one explicit draft synchronization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub published: usize,
    pub remaining: usize,
}

/// Draft queue counters for screen display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftQueueStats {
    pub queued: usize,
}
