//! Catalog collaborator: service existence and menu item lookup.
//!
//! The catalog is owned elsewhere; the selection engine only reads from it.

pub mod domain;
pub mod repository;
pub mod repo;

pub use repository::CatalogRepository;
