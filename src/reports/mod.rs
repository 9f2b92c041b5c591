//! Generated report tracking
//!
//! ## Responsibilities
//!
//! - In-memory report collection with the uniform mutator contract
//! - Remote generation through the report API

mod service;
mod store;
mod types;

pub use service::ReportService;
pub use store::ReportStore;
pub use types::*;
