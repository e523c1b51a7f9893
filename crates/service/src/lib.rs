//! Service layer for the service configuration / selection engine.
//! - Repository traits isolate persistence; SeaORM and in-memory implementations ship side by side.
//! - `ConfigurationService` owns option type validation and the version bump policy.
//! - `SelectionService` owns default synthesis, history, locking and cross-version migration.

pub mod errors;
pub mod metrics;
pub mod catalog;
pub mod configuration;
pub mod selection;
#[cfg(test)]
pub mod test_support;
