use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(ScheduledJobs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // The job runner polls by due time on every tick.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_scheduled_jobs_run_at")
                    .table(ScheduledJobs)
                    .col(crate::entities::scheduled_jobs::Column::RunAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledJobs).to_owned())
            .await?;

        Ok(())
    }
}
