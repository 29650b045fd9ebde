use crate::domain::AbsenceEventKind;
use crate::entities::{prelude::*, scheduled_jobs};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

/// Repository for persisted one-shot jobs.
///
/// Scheduling the same (absence, event) pair twice creates two rows; the
/// runner fires and deletes each independently.
pub struct JobRepository {
    conn: DatabaseConnection,
}

impl JobRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn schedule_after(
        &self,
        absence_id: i32,
        user_id: &str,
        event: AbsenceEventKind,
        run_at: i64,
    ) -> Result<scheduled_jobs::Model> {
        let job = scheduled_jobs::ActiveModel {
            id: NotSet,
            absence_id: Set(absence_id),
            user_id: Set(user_id.to_string()),
            event: Set(event.as_str().to_string()),
            run_at: Set(run_at),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&self.conn)
        .await?;

        Ok(job)
    }

    /// All jobs whose due time has passed, oldest first.
    pub async fn due(&self, now: i64) -> Result<Vec<scheduled_jobs::Model>> {
        let jobs = ScheduledJobs::find()
            .filter(scheduled_jobs::Column::RunAt.lte(now))
            .order_by_asc(scheduled_jobs::Column::RunAt)
            .all(&self.conn)
            .await?;

        Ok(jobs)
    }

    pub async fn list_pending(&self) -> Result<Vec<scheduled_jobs::Model>> {
        let jobs = ScheduledJobs::find()
            .order_by_asc(scheduled_jobs::Column::RunAt)
            .all(&self.conn)
            .await?;

        Ok(jobs)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        ScheduledJobs::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn delete_for_absence(&self, absence_id: i32) -> Result<u64> {
        let result = ScheduledJobs::delete_many()
            .filter(scheduled_jobs::Column::AbsenceId.eq(absence_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
