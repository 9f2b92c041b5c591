//! Session type definitions
//!
//! Identity and token types for the authenticated agent session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted store key for the session snapshot (general partition)
pub const STORE_KEY: &str = "session";

/// Secure partition keys
pub mod keys {
    pub const TOKEN: &str = "session.token";
    pub const REFRESH_TOKEN: &str = "session.refresh_token";
}

/// Agent role
///
/// Wire forms follow the backend's French labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "agent")]
    FieldAgent,
    #[serde(rename = "technicien")]
    Technician,
    #[serde(rename = "superviseur")]
    Supervisor,
    #[serde(rename = "administrateur")]
    Administrator,
}

impl Default for Role {
    fn default() -> Self {
        Self::FieldAgent
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldAgent => write!(f, "agent"),
            Self::Technician => write!(f, "technicien"),
            Self::Supervisor => write!(f, "superviseur"),
            Self::Administrator => write!(f, "administrateur"),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "technicien" => Self::Technician,
            "superviseur" => Self::Supervisor,
            "administrateur" => Self::Administrator,
            _ => Self::FieldAgent,
        }
    }
}

/// Authenticated agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Service number, unique per agent
    pub matricule: String,
    pub nom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_actif")]
    pub actif: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dernier_login: Option<DateTime<Utc>>,
}

fn default_actif() -> bool {
    true
}

/// Access/refresh token pair, opaque strings issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub token: String,
    pub refresh_token: String,
}

/// Login form payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub matricule: String,
    pub password: String,
}

/// Persisted subset of the session state
///
/// The authentication flag is deliberately absent: every cold start
/// revalidates the token instead of trusting stale state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_forms() {
        assert_eq!(Role::FieldAgent.to_string(), "agent");
        assert_eq!(Role::from("superviseur"), Role::Supervisor);
        assert_eq!(Role::from("ADMINISTRATEUR"), Role::Administrator);
        // unknown labels fall back to the least-privileged role
        assert_eq!(Role::from("autre"), Role::FieldAgent);
    }

    #[test]
    fn test_user_defaults_on_sparse_payload() {
        let user: User = serde_json::from_str(r#"{"matricule":"A-0042","nom":"Rakoto"}"#).unwrap();
        assert_eq!(user.role, Role::FieldAgent);
        assert!(user.actif);
        assert!(user.dernier_login.is_none());
    }
}
