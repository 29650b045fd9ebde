use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::constants::{apps, components};
use crate::db::Store;
use crate::domain::principal_uri;
use crate::models::search::{ObjectSearchOptions, SearchResultEntry, SearchResults};
use crate::parser::ics::{self, DateValue};
use crate::services::apps::AppGate;
use crate::services::events_search::{format_date, format_time};
use crate::services::search_provider::{SearchError, SearchProvider, SearchQuery};

const SEARCH_PROPERTIES: &[&str] = &["SUMMARY", "DESCRIPTION", "CATEGORIES"];

/// Searches the user's calendars for VTODO tasks.
pub struct TasksSearchProvider {
    store: Store,
    gate: Arc<AppGate>,
    config: Arc<RwLock<Config>>,
}

impl TasksSearchProvider {
    #[must_use]
    pub const fn new(store: Store, gate: Arc<AppGate>, config: Arc<RwLock<Config>>) -> Self {
        Self {
            store,
            gate,
            config,
        }
    }

    fn entry(
        web_base: &str,
        collection_uri: &str,
        object_uri: &str,
        task: &ics::ParsedTask,
    ) -> SearchResultEntry {
        let title = task
            .summary
            .clone()
            .unwrap_or_else(|| "Untitled task".to_string());

        let resource_url =
            format!("{web_base}/apps/tasks/#/calendars/{collection_uri}/tasks/{object_uri}");

        SearchResultEntry {
            thumbnail_url: String::new(),
            title,
            subline: task_subline(task),
            resource_url,
            icon: "icon-tasks-dark".to_string(),
            rounded: false,
        }
    }
}

#[async_trait]
impl SearchProvider for TasksSearchProvider {
    fn id(&self) -> &'static str {
        apps::TASKS
    }

    fn display_name(&self) -> &'static str {
        "Tasks"
    }

    async fn search(
        &self,
        user_id: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults, SearchError> {
        if !self.gate.is_enabled_for_user(apps::TASKS, user_id).await? {
            return Ok(SearchResults::empty());
        }

        let principal = principal_uri(user_id);
        let offset = query.offset();

        let options = ObjectSearchOptions {
            component: Some(components::VTODO.to_string()),
            properties: SEARCH_PROPERTIES.iter().map(ToString::to_string).collect(),
            cn_only_properties: Vec::new(),
            limit: query.limit,
            offset,
            since: None,
            until: None,
        };

        let rows = self
            .store
            .search_calendar_objects(&principal, &query.term, &options)
            .await?;
        let row_count = rows.len() as u64;

        metrics::counter!("davarr_searches_total", "provider" => apps::TASKS).increment(1);

        let web_base = self.config.read().await.server.web_base_url.clone();

        let entries = rows
            .into_iter()
            .filter_map(|row| match ics::parse_task(&row.data) {
                Ok(task) => Some(Self::entry(
                    &web_base,
                    &row.collection_uri,
                    &row.object_uri,
                    &task,
                )),
                Err(e) => {
                    warn!(object = %row.object_uri, error = %e, "Skipping unreadable task");
                    None
                }
            })
            .collect();

        Ok(SearchResults::page(
            entries,
            row_count,
            query.limit,
            offset,
        ))
    }
}

/// Completion wins over the due date; a task with neither shows nothing.
pub fn task_subline(task: &ics::ParsedTask) -> String {
    if let Some(completed) = task.completed {
        return format!("Completed on {}", format_date(completed.as_datetime().date()));
    }

    match task.due {
        Some(DateValue::Date(date)) => format!("Due on {}", format_date(date)),
        Some(DateValue::DateTime(datetime)) => format!(
            "Due on {} by {}",
            format_date(datetime.date()),
            format_time(datetime)
        ),
        None => String::new(),
    }
}
