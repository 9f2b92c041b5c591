//! Incident reporting with the offline draft queue
//!
//! ## Responsibilities
//!
//! - In-memory incident collection with the uniform mutator contract
//! - Draft queue for offline-born incidents, the only persisted subset
//! - Submission protocol: publish remotely, or draft locally on any
//!   rejection or transport failure; explicit sync replays the queue

mod service;
mod store;
mod types;

pub use service::IncidentService;
pub use store::IncidentStore;
pub use types::*;
