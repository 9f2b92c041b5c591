//! Camera fleet tracking
//!
//! ## Responsibilities
//!
//! - In-memory fleet collection with the uniform mutator contract
//! - Append-only panne (fault) and mutation (relocation) histories, kept
//!   consistent between the flat lists and each camera's embedded history
//! - Remote actions through the camera API

mod service;
mod store;
mod types;

pub use service::CameraService;
pub use store::CameraStore;
pub use types::*;
