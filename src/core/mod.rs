//! Core business logic - framework-agnostic record services.

/// Referential-integrity guard for deletes
pub mod integrity;
/// Demo data seeding
pub mod seed;
/// Generic CRUD service and the per-entity bundle
pub mod service;

pub use seed::{SeedReport, seed_demo_data};
pub use service::{CrmServices, RecordService};
