//! Vigie Client Core
//!
//! Client data and state layer for the Vigie port security operations
//! system: camera fleet tracking, incident reporting, and personnel
//! interpellation record-keeping (Efa Tratra).
//!
//! ## Architecture
//!
//! 1. LocalStore - SQLite key-value partitions (secure + general)
//! 2. ApiClient - REST boundary, the only networked component
//! 3. SessionState - user/tokens, cold-start token revalidation
//! 4. Domain stores - cameras, incidents, personnes, reports
//! 5. IncidentService draft queue - offline-born reports, never lost
//! 6. ImageService - photo validation, compression, durable storage
//! 7. Policy - role-based permitted actions
//! 8. AppContext - explicit composition root
//!
//! ## Design Principles
//!
//! - Stores own their collections; cross-entity updates go through the
//!   owning store's mutator
//! - Store mutations are synchronous atomic snapshot replacements
//! - Only the session subset and the incident draft queue are persisted;
//!   everything else reloads from the backend
//!
//! Screens, navigation and styling live in the host applications; the
//! backend is an external REST collaborator.

pub mod api_client;
pub mod cameras;
pub mod config;
pub mod context;
pub mod error;
pub mod images;
pub mod incidents;
pub mod local_store;
pub mod logging;
pub mod personnes;
pub mod policy;
pub mod reports;
pub mod session;

pub use config::AppConfig;
pub use context::AppContext;
pub use error::{Error, Result};
