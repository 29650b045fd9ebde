use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::Config;
use crate::constants::{apps, components};
use crate::db::Store;
use crate::domain::principal_uri;
use crate::models::search::{ObjectSearchOptions, SearchResultEntry, SearchResults};
use crate::parser::ics::{self, EventTimes};
use crate::services::apps::AppGate;
use crate::services::search_provider::{SearchError, SearchProvider, SearchQuery};

const SEARCH_PROPERTIES: &[&str] = &[
    "SUMMARY",
    "LOCATION",
    "DESCRIPTION",
    "ATTENDEE",
    "ORGANIZER",
    "CATEGORIES",
];

/// Attendee and organizer values are mailto URIs; only their CN display
/// names are sensible free-text match targets.
const CN_ONLY_PROPERTIES: &[&str] = &["ATTENDEE", "ORGANIZER"];

/// Searches the user's calendars and subscriptions for events.
pub struct EventsSearchProvider {
    store: Store,
    gate: Arc<AppGate>,
    config: Arc<RwLock<Config>>,
}

impl EventsSearchProvider {
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
        user_id: &str,
        collection_uri: &str,
        object_uri: &str,
        event: &ics::ParsedEvent,
    ) -> SearchResultEntry {
        let title = event
            .summary
            .clone()
            .unwrap_or_else(|| "Untitled event".to_string());

        let subline = event.times.map(|t| format_event_range(&t)).unwrap_or_default();

        let dav_path = format!("calendars/{user_id}/{collection_uri}/{object_uri}");
        let resource_url = format!(
            "{web_base}/apps/calendar/edit/{}",
            URL_SAFE_NO_PAD.encode(dav_path)
        );

        SearchResultEntry {
            thumbnail_url: String::new(),
            title,
            subline,
            resource_url,
            icon: "icon-calendar-dark".to_string(),
            rounded: false,
        }
    }
}

#[async_trait]
impl SearchProvider for EventsSearchProvider {
    fn id(&self) -> &'static str {
        apps::CALENDAR
    }

    fn display_name(&self) -> &'static str {
        "Events"
    }

    async fn search(
        &self,
        user_id: &str,
        query: &SearchQuery,
    ) -> Result<SearchResults, SearchError> {
        if !self
            .gate
            .is_enabled_for_user(apps::CALENDAR, user_id)
            .await?
        {
            return Ok(SearchResults::empty());
        }

        let principal = principal_uri(user_id);
        let offset = query.offset();

        let options = ObjectSearchOptions {
            component: Some(components::VEVENT.to_string()),
            properties: SEARCH_PROPERTIES.iter().map(ToString::to_string).collect(),
            cn_only_properties: CN_ONLY_PROPERTIES
                .iter()
                .map(ToString::to_string)
                .collect(),
            limit: query.limit,
            offset,
            since: query.since,
            until: query.until,
        };

        let rows = self
            .store
            .search_calendar_objects(&principal, &query.term, &options)
            .await?;
        let row_count = rows.len() as u64;

        metrics::counter!("davarr_searches_total", "provider" => apps::CALENDAR).increment(1);

        let web_base = self.config.read().await.server.web_base_url.clone();

        let entries = rows
            .into_iter()
            .filter_map(|row| match ics::parse_event(&row.data) {
                Ok(event) => Some(Self::entry(
                    &web_base,
                    user_id,
                    &row.collection_uri,
                    &row.object_uri,
                    &event,
                )),
                Err(e) => {
                    warn!(object = %row.object_uri, error = %e, "Skipping unreadable event");
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

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

pub(crate) fn format_time(datetime: NaiveDateTime) -> String {
    datetime.format("%H:%M").to_string()
}

/// Render the date/time range shown under an event title.
///
/// All-day DTEND is exclusive, so a one-day event shows a single date and
/// multi-day ranges end a day before DTEND.
pub fn format_event_range(times: &EventTimes) -> String {
    if times.all_day {
        let start_date = times.start.date();
        let last_date = times
            .end
            .date()
            .pred_opt()
            .unwrap_or_else(|| times.end.date());

        if last_date <= start_date {
            return format_date(start_date);
        }

        return format!("{} - {}", format_date(start_date), format_date(last_date));
    }

    if times.start.date() == times.end.date() {
        return format!(
            "{} {} - {}",
            format_date(times.start.date()),
            format_time(times.start),
            format_time(times.end)
        );
    }

    format!(
        "{} {} - {} {}",
        format_date(times.start.date()),
        format_time(times.start),
        format_date(times.end.date()),
        format_time(times.end)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        date.and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn timed_same_day() {
        let times = EventTimes {
            start: at(d(2016, 8, 16), 9, 0),
            end: at(d(2016, 8, 16), 10, 0),
            all_day: false,
        };
        assert_eq!(format_event_range(&times), "08-16 09:00 - 10:00");
    }

    #[test]
    fn timed_across_days() {
        let times = EventTimes {
            start: at(d(2016, 8, 16), 22, 0),
            end: at(d(2016, 8, 17), 2, 30),
            all_day: false,
        };
        assert_eq!(format_event_range(&times), "08-16 22:00 - 08-17 02:30");
    }

    #[test]
    fn all_day_single() {
        let times = EventTimes {
            start: d(2016, 10, 5).and_time(NaiveTime::MIN),
            end: d(2016, 10, 6).and_time(NaiveTime::MIN),
            all_day: true,
        };
        assert_eq!(format_event_range(&times), "10-05");
    }

    #[test]
    fn all_day_multi_day_drops_exclusive_end() {
        let times = EventTimes {
            start: d(2016, 10, 5).and_time(NaiveTime::MIN),
            end: d(2016, 10, 8).and_time(NaiveTime::MIN),
            all_day: true,
        };
        assert_eq!(format_event_range(&times), "10-05 - 10-07");
    }

    #[test]
    fn zero_length_event_shows_start_times() {
        let times = EventTimes {
            start: at(d(2016, 8, 16), 9, 0),
            end: at(d(2016, 8, 16), 9, 0),
            all_day: false,
        };
        assert_eq!(format_event_range(&times), "08-16 09:00 - 09:00");
    }
}
