//! API client type definitions
//!
//! Every remote call answers with the same envelope shape; the client
//! folds it, together with transport failures, into `ApiError`.

use crate::session::User;
use serde::{Deserialize, Serialize};

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload of a data-carrying call
    pub fn into_result(self) -> Result<T, ApiError> {
        if self.success {
            self.data
                .ok_or_else(|| ApiError::Decode("success envelope without data".to_string()))
        } else {
            Err(ApiError::Rejected {
                message: self.message,
                errors: self.errors.unwrap_or_default(),
            })
        }
    }

    /// Check a call whose payload, if any, is irrelevant
    pub fn into_empty_result(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: self.message,
                errors: self.errors.unwrap_or_default(),
            })
        }
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: User,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// ============================================================
// Error type
// ============================================================

/// API boundary error
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Backend answered with `success: false`
    Rejected {
        message: Option<String>,
        errors: Vec<String>,
    },
    /// Transport failure, no usable response
    Network(String),
    /// Response body could not be decoded
    Decode(String),
    /// No access token available for an authenticated call
    Unauthenticated,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { message, .. } => write!(
                f,
                "Rejected: {}",
                message.as_deref().unwrap_or("no message")
            ),
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Decode(e) => write!(f, "Decode error: {}", e),
            Self::Unauthenticated => write!(f, "No access token"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// True for transport-level failures (the offline/draft trigger)
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<ApiError> for crate::Error {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected { message, .. } => crate::Error::Rejected(
                message.unwrap_or_else(|| messages::DEFAULT_REJECTION.to_string()),
            ),
            ApiError::Network(msg) => crate::Error::Network(msg),
            ApiError::Decode(msg) => crate::Error::Internal(msg),
            ApiError::Unauthenticated => {
                crate::Error::Unauthorized("no access token".to_string())
            }
        }
    }
}

/// Default user-facing messages (French, matching the backend locale)
pub mod messages {
    pub const NETWORK: &str = "Erreur de connexion au serveur";
    pub const DEFAULT_REJECTION: &str = "La requête a été refusée";
}

/// Message to surface on a store's error field
///
/// Backend-supplied messages are shown verbatim; rejections without one use
/// the per-action fallback; transport failures always get the generic
/// connectivity wording.
pub fn surface_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Rejected {
            message: Some(m), ..
        } => m.clone(),
        ApiError::Rejected { message: None, .. } => fallback.to_string(),
        ApiError::Network(_) => messages::NETWORK.to_string(),
        ApiError::Decode(_) => fallback.to_string(),
        ApiError::Unauthenticated => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_unwraps_data() {
        let env: ApiEnvelope<i32> =
            serde_json::from_str(r#"{"success": true, "data": 7}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), 7);
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let env: ApiEnvelope<i32> =
            serde_json::from_str(r#"{"success": false, "message": "Zone inconnue"}"#).unwrap();
        match env.into_result() {
            Err(ApiError::Rejected { message, .. }) => {
                assert_eq!(message.as_deref(), Some("Zone inconnue"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_success_without_data_is_decode_error() {
        let env: ApiEnvelope<i32> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(env.into_result(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_surface_message_priorities() {
        let rejected = ApiError::Rejected {
            message: Some("Caméra introuvable".to_string()),
            errors: vec![],
        };
        assert_eq!(surface_message(&rejected, "fallback"), "Caméra introuvable");

        let bare = ApiError::Rejected {
            message: None,
            errors: vec![],
        };
        assert_eq!(surface_message(&bare, "fallback"), "fallback");

        let network = ApiError::Network("timeout".to_string());
        assert_eq!(surface_message(&network, "fallback"), messages::NETWORK);
    }
}
