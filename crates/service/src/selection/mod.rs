//! Selection Manager: per-version selections, history, advisory locking and migration.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::SelectionService;
