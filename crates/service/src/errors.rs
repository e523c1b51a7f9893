use chrono::{DateTime, Utc};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("selection is already locked")]
    Locked {
        locked_by: Option<String>,
        locked_at: Option<DateTime<Utc>>,
    },
    #[error("stale revision: {0}")]
    StaleRevision(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Map a SeaORM error, surfacing constraint violations as client faults.
    pub fn from_db(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::not_found("service"),
            _ => Self::Db(e.to_string()),
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::Conflict(_) => 2003,
            ServiceError::Locked { .. } => 2004,
            ServiceError::StaleRevision(_) => 2005,
            ServiceError::Db(_) => 2100,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => Self::Validation(msg),
            models::errors::ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_validation_maps_to_validation() {
        let e: ServiceError = models::errors::ModelError::Validation("bad key".into()).into();
        assert!(matches!(e, ServiceError::Validation(ref m) if m == "bad key"));
        assert_eq!(e.code(), 2001);
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(ServiceError::not_found("selection").to_string(), "not found: selection not found");
    }
}
