use crate::entities::{absences, prelude::*};
use crate::models::absence::Absence;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};

/// Repository for per-user absence windows.
pub struct AbsenceRepository {
    conn: DatabaseConnection,
}

impl AbsenceRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The missing row is the caller's signal to create, not an error.
    pub async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Absence>> {
        let row = Absences::find()
            .filter(absences::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?;

        row.map(|m| Absence::try_from(m).context("Malformed absence row"))
            .transpose()
    }

    pub async fn insert(
        &self,
        user_id: &str,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = absences::ActiveModel {
            id: NotSet,
            user_id: Set(user_id.to_string()),
            first_day: Set(first_day.format("%Y-%m-%d").to_string()),
            last_day: Set(last_day.format("%Y-%m-%d").to_string()),
            short_message: Set(short_message.to_string()),
            message: Set(message.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&self.conn)
        .await?;

        Absence::try_from(model).context("Malformed absence row")
    }

    /// Update in place, preserving the row id.
    pub async fn update(
        &self,
        id: i32,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence> {
        let existing = Absences::find_by_id(id)
            .one(&self.conn)
            .await?
            .with_context(|| format!("Absence {id} disappeared during update"))?;

        let mut active: absences::ActiveModel = existing.into();
        active.first_day = Set(first_day.format("%Y-%m-%d").to_string());
        active.last_day = Set(last_day.format("%Y-%m-%d").to_string());
        active.short_message = Set(short_message.to_string());
        active.message = Set(message.to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;

        Absence::try_from(model).context("Malformed absence row")
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        Absences::delete_by_id(id).exec(&self.conn).await?;
        Ok(())
    }
}
