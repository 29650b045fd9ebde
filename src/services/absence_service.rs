//! Domain service for out-of-office windows.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::absence::Absence;

#[derive(Debug, Error)]
pub enum AbsenceError {
    #[error("Invalid absence window: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AbsenceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<sea_orm::DbErr> for AbsenceError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Creates, updates and clears absence windows and keeps the one-shot
/// start/end jobs in line with the window's instants.
#[async_trait]
pub trait AbsenceService: Send + Sync {
    /// Upsert the user's window. The first call for a user creates the
    /// record; later calls mutate it in place, preserving the id. Both
    /// paths re-dispatch the lifecycle event and re-evaluate job
    /// scheduling against the current time, without deduplicating jobs
    /// that are already queued.
    async fn create_or_update(
        &self,
        user_id: &str,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence, AbsenceError>;

    async fn get(&self, user_id: &str) -> Result<Option<Absence>, AbsenceError>;

    /// Remove the user's window and its pending jobs. Returns false when
    /// there was nothing to clear.
    async fn clear(&self, user_id: &str) -> Result<bool, AbsenceError>;
}
