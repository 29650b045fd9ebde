use sea_orm_migration::prelude::*;

mod m20250301_initial;
mod m20250318_add_absences;
mod m20250402_add_scheduled_jobs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_initial::Migration),
            Box::new(m20250318_add_absences::Migration),
            Box::new(m20250402_add_scheduled_jobs::Migration),
        ]
    }
}
