use sea_orm::entity::prelude::*;

/// A persisted one-shot job. Rows are deleted after their event fires.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub absence_id: i32,

    pub user_id: String,

    /// "start" or "end".
    pub event: String,

    /// Epoch seconds at which the job becomes due.
    pub run_at: i64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
