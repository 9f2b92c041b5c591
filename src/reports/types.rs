//! Report domain types
//!
//! Reports are backend-generated artifacts; the client keeps the metadata
//! and an optional reference to the rendered PDF.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a report is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Incident,
    Camera,
    Personne,
    General,
}

impl Default for ReportKind {
    fn default() -> Self {
        Self::General
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incident => write!(f, "incident"),
            Self::Camera => write!(f, "camera"),
            Self::Personne => write!(f, "personne"),
            Self::General => write!(f, "general"),
        }
    }
}

impl From<&str> for ReportKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "incident" => Self::Incident,
            "camera" => Self::Camera,
            "personne" => Self::Personne,
            _ => Self::General,
        }
    }
}

/// Report entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub kind: ReportKind,
    /// Id of the referenced incident/camera/personne, absent for general reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    /// Matricule of the generating user
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
}

/// Report generation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    pub title: String,
    pub content: String,
}

/// Partial report update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
}

impl ReportUpdate {
    /// Merge the set fields into an existing report
    pub fn apply(&self, report: &mut Report) {
        if let Some(ref title) = self.title {
            report.title = title.clone();
        }
        if let Some(ref content) = self.content {
            report.content = content.clone();
        }
        if let Some(ref pdf_path) = self.pdf_path {
            report.pdf_path = Some(pdf_path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_forms() {
        assert_eq!(ReportKind::from("camera"), ReportKind::Camera);
        assert_eq!(ReportKind::from("inconnu"), ReportKind::General);
        assert_eq!(ReportKind::Personne.to_string(), "personne");
    }
}
