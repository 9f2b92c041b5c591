//! Personnel interpellation record-keeping (Efa Tratra)
//!
//! ## Responsibilities
//!
//! - In-memory personne collection with the uniform mutator contract
//! - Interpellation records attached through the owning store's mutator
//! - Remote actions through the personne API

mod service;
mod store;
mod types;

pub use service::PersonneService;
pub use store::PersonneStore;
pub use types::*;
