use crate::domain::AbsenceEventKind;
use crate::entities::{address_books, calendar_subscriptions, calendars, scheduled_jobs};
use crate::models::absence::Absence;
use crate::models::search::{ObjectSearchOptions, ObjectSearchRow};
use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::calendar::IndexedProperty;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn addressbook_repo(&self) -> repositories::addressbook::AddressBookRepository {
        repositories::addressbook::AddressBookRepository::new(self.conn.clone())
    }

    fn calendar_repo(&self) -> repositories::calendar::CalendarRepository {
        repositories::calendar::CalendarRepository::new(self.conn.clone())
    }

    fn absence_repo(&self) -> repositories::absence::AbsenceRepository {
        repositories::absence::AbsenceRepository::new(self.conn.clone())
    }

    fn job_repo(&self) -> repositories::jobs::JobRepository {
        repositories::jobs::JobRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::UserSettingsRepository {
        repositories::settings::UserSettingsRepository::new(self.conn.clone())
    }

    // ------------------------------------------------------------------
    // Address books / cards
    // ------------------------------------------------------------------

    pub async fn get_address_books_for_user(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<address_books::Model>> {
        self.addressbook_repo().get_for_principal(principal_uri).await
    }

    pub async fn search_cards(
        &self,
        principal_uri: &str,
        term: &str,
        options: &ObjectSearchOptions,
    ) -> Result<Vec<ObjectSearchRow>> {
        self.addressbook_repo()
            .search_principal_uri(principal_uri, term, options)
            .await
    }

    pub async fn insert_address_book(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
    ) -> Result<address_books::Model> {
        self.addressbook_repo()
            .insert_address_book(principal_uri, uri, display_name)
            .await
    }

    pub async fn insert_card(
        &self,
        address_book_id: i32,
        uri: &str,
        card_data: &str,
        properties: &[(&str, &str)],
    ) -> Result<crate::entities::cards::Model> {
        self.addressbook_repo()
            .insert_card(address_book_id, uri, card_data, properties)
            .await
    }

    // ------------------------------------------------------------------
    // Calendars / objects
    // ------------------------------------------------------------------

    pub async fn get_calendars_for_user(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<calendars::Model>> {
        self.calendar_repo()
            .get_calendars_for_principal(principal_uri)
            .await
    }

    pub async fn get_subscriptions_for_user(
        &self,
        principal_uri: &str,
    ) -> Result<Vec<calendar_subscriptions::Model>> {
        self.calendar_repo()
            .get_subscriptions_for_principal(principal_uri)
            .await
    }

    pub async fn search_calendar_objects(
        &self,
        principal_uri: &str,
        term: &str,
        options: &ObjectSearchOptions,
    ) -> Result<Vec<ObjectSearchRow>> {
        self.calendar_repo()
            .search_principal_uri(principal_uri, term, options)
            .await
    }

    pub async fn insert_calendar(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
        components: &str,
    ) -> Result<calendars::Model> {
        self.calendar_repo()
            .insert_calendar(principal_uri, uri, display_name, components)
            .await
    }

    pub async fn insert_subscription(
        &self,
        principal_uri: &str,
        uri: &str,
        display_name: &str,
        source: &str,
    ) -> Result<calendar_subscriptions::Model> {
        self.calendar_repo()
            .insert_subscription(principal_uri, uri, display_name, source)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_calendar_object(
        &self,
        calendar_id: i32,
        calendar_type: i32,
        uri: &str,
        component_type: &str,
        calendar_data: &str,
        occurrence: (Option<i64>, Option<i64>),
        properties: &[IndexedProperty],
    ) -> Result<crate::entities::calendar_objects::Model> {
        self.calendar_repo()
            .insert_object(
                calendar_id,
                calendar_type,
                uri,
                component_type,
                calendar_data,
                occurrence,
                properties,
            )
            .await
    }

    // ------------------------------------------------------------------
    // Absences
    // ------------------------------------------------------------------

    pub async fn find_absence_by_user_id(&self, user_id: &str) -> Result<Option<Absence>> {
        self.absence_repo().find_by_user_id(user_id).await
    }

    pub async fn insert_absence(
        &self,
        user_id: &str,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence> {
        self.absence_repo()
            .insert(user_id, first_day, last_day, short_message, message)
            .await
    }

    pub async fn update_absence(
        &self,
        id: i32,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence> {
        self.absence_repo()
            .update(id, first_day, last_day, short_message, message)
            .await
    }

    pub async fn delete_absence(&self, id: i32) -> Result<()> {
        self.absence_repo().delete(id).await
    }

    // ------------------------------------------------------------------
    // One-shot jobs
    // ------------------------------------------------------------------

    pub async fn schedule_job_after(
        &self,
        absence_id: i32,
        user_id: &str,
        event: AbsenceEventKind,
        run_at: i64,
    ) -> Result<scheduled_jobs::Model> {
        self.job_repo()
            .schedule_after(absence_id, user_id, event, run_at)
            .await
    }

    pub async fn due_jobs(&self, now: i64) -> Result<Vec<scheduled_jobs::Model>> {
        self.job_repo().due(now).await
    }

    pub async fn list_pending_jobs(&self) -> Result<Vec<scheduled_jobs::Model>> {
        self.job_repo().list_pending().await
    }

    pub async fn delete_job(&self, id: i32) -> Result<()> {
        self.job_repo().delete(id).await
    }

    pub async fn delete_jobs_for_absence(&self, absence_id: i32) -> Result<u64> {
        self.job_repo().delete_for_absence(absence_id).await
    }

    // ------------------------------------------------------------------
    // User settings
    // ------------------------------------------------------------------

    pub async fn get_user_timezone(&self, user_id: &str) -> Result<Option<String>> {
        self.settings_repo().get_timezone(user_id).await
    }

    pub async fn get_disabled_apps(&self, user_id: &str) -> Result<Vec<String>> {
        self.settings_repo().get_disabled_apps(user_id).await
    }

    pub async fn set_user_timezone(&self, user_id: &str, timezone: Option<&str>) -> Result<()> {
        self.settings_repo().set_timezone(user_id, timezone).await
    }

    pub async fn set_disabled_apps(&self, user_id: &str, apps: &[String]) -> Result<()> {
        self.settings_repo().set_disabled_apps(user_id, apps).await
    }
}
