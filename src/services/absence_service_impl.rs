//! `SeaORM` implementation of the `AbsenceService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::constants::jobs::END_OF_DAY_MINUTES;
use crate::db::Store;
use crate::domain::AbsenceEventKind;
use crate::domain::events::{AbsencePayload, NotificationEvent};
use crate::models::absence::Absence;
use crate::services::absence_service::{AbsenceError, AbsenceService};
use crate::services::clock::Clock;
use crate::services::timezone::TimezoneService;

pub struct SeaOrmAbsenceService {
    store: Store,
    timezones: Arc<TimezoneService>,
    clock: Arc<dyn Clock>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmAbsenceService {
    #[must_use]
    pub const fn new(
        store: Store,
        timezones: Arc<TimezoneService>,
        clock: Arc<dyn Clock>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            timezones,
            clock,
            event_bus,
        }
    }
}

#[async_trait]
impl AbsenceService for SeaOrmAbsenceService {
    async fn create_or_update(
        &self,
        user_id: &str,
        first_day: NaiveDate,
        last_day: NaiveDate,
        short_message: &str,
        message: &str,
    ) -> Result<Absence, AbsenceError> {
        if last_day < first_day {
            return Err(AbsenceError::Validation(format!(
                "last day {last_day} precedes first day {first_day}"
            )));
        }

        let existing = self.store.find_absence_by_user_id(user_id).await?;
        let is_update = existing.is_some();

        let absence = match existing {
            None => {
                self.store
                    .insert_absence(user_id, first_day, last_day, short_message, message)
                    .await?
            }
            Some(current) => {
                self.store
                    .update_absence(current.id, first_day, last_day, short_message, message)
                    .await?
            }
        };

        let tz = self.timezones.get_user_timezone(user_id).await?;
        let (start, end) = window_instants(tz, first_day, last_day);
        let (start_ts, end_ts) = (start.timestamp(), end.timestamp());

        let payload = AbsencePayload {
            absence_id: absence.id,
            user_id: user_id.to_string(),
            start: start_ts,
            end: end_ts,
            short_message: short_message.to_string(),
            message: message.to_string(),
        };
        let event = if is_update {
            NotificationEvent::OutOfOfficeChanged(payload)
        } else {
            NotificationEvent::OutOfOfficeScheduled(payload)
        };
        let _ = self.event_bus.send(event);

        let now = self.clock.epoch_seconds();
        for kind in events_to_schedule(now, start_ts, end_ts) {
            let run_at = match kind {
                AbsenceEventKind::Start => start_ts,
                AbsenceEventKind::End => end_ts,
            };
            self.store
                .schedule_job_after(absence.id, user_id, kind, run_at)
                .await?;
            debug!(user_id, absence_id = absence.id, event = %kind, run_at, "Queued absence job");
        }

        metrics::counter!("davarr_absence_upserts_total").increment(1);
        info!(
            user_id,
            absence_id = absence.id,
            %first_day,
            %last_day,
            updated = is_update,
            "Absence window persisted"
        );

        Ok(absence)
    }

    async fn get(&self, user_id: &str) -> Result<Option<Absence>, AbsenceError> {
        Ok(self.store.find_absence_by_user_id(user_id).await?)
    }

    async fn clear(&self, user_id: &str) -> Result<bool, AbsenceError> {
        let Some(absence) = self.store.find_absence_by_user_id(user_id).await? else {
            return Ok(false);
        };

        self.store.delete_jobs_for_absence(absence.id).await?;
        self.store.delete_absence(absence.id).await?;

        let _ = self.event_bus.send(NotificationEvent::OutOfOfficeCleared {
            absence_id: absence.id,
            user_id: user_id.to_string(),
        });

        info!(user_id, absence_id = absence.id, "Absence window cleared");
        Ok(true)
    }
}

/// Absolute start/end instants of a window in the user's zone: the first
/// day's midnight, and the last day's midnight plus 23h59m. The offset is
/// deliberate and must stay as-is.
#[must_use]
pub fn window_instants(
    tz: Tz,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> (DateTime<Tz>, DateTime<Tz>) {
    let start = local_midnight(tz, first_day);
    let end = local_midnight(tz, last_day) + Duration::minutes(END_OF_DAY_MINUTES);
    (start, end)
}

/// Midnight of a calendar day in the given zone. When a DST gap swallows
/// midnight the earliest valid interpretation is used, falling back to the
/// naive time read as UTC.
fn local_midnight(tz: Tz, day: NaiveDate) -> DateTime<Tz> {
    use chrono::TimeZone;

    let naive = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Which one-shot jobs to queue: only edges still in the future. Edges
/// already past get no catch-up job.
#[must_use]
pub fn events_to_schedule(now: i64, start: i64, end: i64) -> Vec<AbsenceEventKind> {
    let mut kinds = Vec::new();
    if start > now {
        kinds.push(AbsenceEventKind::Start);
    }
    if end > now {
        kinds.push(AbsenceEventKind::End);
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_spans_midnight_to_end_of_day_offset() {
        let tz: Tz = "Europe/Vienna".parse().unwrap();
        let (start, end) = window_instants(tz, day(2026, 3, 2), day(2026, 3, 6));

        assert_eq!(start.to_rfc3339(), "2026-03-02T00:00:00+01:00");
        // 23h59m past the last day's midnight, not 23:59:59.
        assert_eq!(end.to_rfc3339(), "2026-03-06T23:59:00+01:00");
    }

    #[test]
    fn single_day_window() {
        let tz = Tz::UTC;
        let (start, end) = window_instants(tz, day(2026, 7, 1), day(2026, 7, 1));
        assert_eq!(end.timestamp() - start.timestamp(), (23 * 60 + 59) * 60);
    }

    #[test]
    fn end_of_day_offset_survives_dst_transitions() {
        // Vienna springs forward on 2026-03-29; the last day's instant is
        // still midnight + 23h59m of wall-clock arithmetic on instants.
        let tz: Tz = "Europe/Vienna".parse().unwrap();
        let (_, end) = window_instants(tz, day(2026, 3, 28), day(2026, 3, 29));
        assert_eq!(end.to_rfc3339(), "2026-03-30T00:59:00+02:00");
    }

    #[test]
    fn future_window_schedules_both_edges() {
        assert_eq!(
            events_to_schedule(100, 200, 300),
            vec![AbsenceEventKind::Start, AbsenceEventKind::End]
        );
    }

    #[test]
    fn running_window_schedules_only_end() {
        assert_eq!(
            events_to_schedule(250, 200, 300),
            vec![AbsenceEventKind::End]
        );
    }

    #[test]
    fn past_window_schedules_nothing() {
        assert!(events_to_schedule(400, 200, 300).is_empty());
    }

    #[test]
    fn edge_instants_equal_to_now_are_not_scheduled() {
        assert!(events_to_schedule(300, 200, 300).is_empty());
    }
}
