//! Camera domain types
//!
//! A camera carries its own append-only fault (panne) and relocation
//! (mutation) history alongside the flat lists kept by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Operational status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    Online,
    Offline,
    Maintenance,
}

impl Default for CameraStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl std::fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

impl From<&str> for CameraStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "online" => Self::Online,
            "maintenance" => Self::Maintenance,
            _ => Self::Offline,
        }
    }
}

/// WGS84 position of a fixed installation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fault record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panne {
    pub id: String,
    pub camera_id: String,
    pub description: String,
    pub reported_at: DateTime<Utc>,
    /// Matricule of the reporting agent
    pub reported_by: String,
    #[serde(default)]
    pub resolved: bool,
}

/// Relocation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    pub id: String,
    pub camera_id: String,
    pub from_zone: String,
    pub to_zone: String,
    pub from_location: String,
    pub to_location: String,
    pub moved_at: DateTime<Utc>,
    pub moved_by: String,
}

/// Camera entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: String,
    pub serial_number: String,
    pub zone: String,
    /// Physical location description ("portique 3, quai nord")
    pub location: String,
    /// Dotted-quad IPv4 address
    pub ip_address: String,
    #[serde(default)]
    pub status: CameraStatus,
    pub installed_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,
    #[serde(default)]
    pub historique_pannes: Vec<Panne>,
    #[serde(default)]
    pub historique_mutations: Vec<Mutation>,
}

/// Camera creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCamera {
    pub serial_number: String,
    pub zone: String,
    pub location: String,
    pub ip_address: String,
    pub installed_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,
}

/// Partial camera update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CameraStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,
}

impl CameraUpdate {
    /// Merge the set fields into an existing camera
    pub fn apply(&self, camera: &mut Camera) {
        if let Some(ref zone) = self.zone {
            camera.zone = zone.clone();
        }
        if let Some(ref location) = self.location {
            camera.location = location.clone();
        }
        if let Some(ref ip) = self.ip_address {
            camera.ip_address = ip.clone();
        }
        if let Some(status) = self.status {
            camera.status = status;
        }
        if let Some(position) = self.position {
            camera.position = Some(position);
        }
    }
}

/// Fault declaration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPanne {
    pub description: String,
}

/// Relocation declaration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMutation {
    pub to_zone: String,
    pub to_location: String,
}

/// Dotted-quad IPv4 format check
pub fn is_valid_ipv4(s: &str) -> bool {
    s.parse::<std::net::Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_forms() {
        assert_eq!(CameraStatus::from("online"), CameraStatus::Online);
        assert_eq!(CameraStatus::from("MAINTENANCE"), CameraStatus::Maintenance);
        assert_eq!(CameraStatus::from("unknown"), CameraStatus::Offline);
        assert_eq!(CameraStatus::Online.to_string(), "online");
    }

    #[test]
    fn test_ipv4_validation() {
        assert!(is_valid_ipv4("192.168.10.21"));
        assert!(!is_valid_ipv4("192.168.10"));
        assert!(!is_valid_ipv4("192.168.10.256"));
        assert!(!is_valid_ipv4("quai-nord"));
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut camera = Camera {
            id: "cam-1".to_string(),
            serial_number: "SN-001".to_string(),
            zone: "A".to_string(),
            location: "portique 1".to_string(),
            ip_address: "10.0.0.1".to_string(),
            status: CameraStatus::Online,
            installed_on: NaiveDate::from_ymd_opt(2023, 4, 12).unwrap(),
            position: None,
            historique_pannes: vec![],
            historique_mutations: vec![],
        };

        let update = CameraUpdate {
            zone: Some("B".to_string()),
            status: Some(CameraStatus::Maintenance),
            ..CameraUpdate::default()
        };
        update.apply(&mut camera);

        assert_eq!(camera.zone, "B");
        assert_eq!(camera.status, CameraStatus::Maintenance);
        assert_eq!(camera.location, "portique 1");
        assert_eq!(camera.ip_address, "10.0.0.1");
    }
}
