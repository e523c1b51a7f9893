//! Configuration Manager: the per-service option type schema and its version counter.
//!
//! Layout mirrors the other modules: domain types, repository trait, SeaORM repository, service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ConfigurationService;
