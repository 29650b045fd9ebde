//! Absence window scheduling against a real store and a pinned clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use davarr::config::Config;
use davarr::domain::events::NotificationEvent;
use davarr::services::scheduler::drain_due_jobs;
use davarr::services::{Clock, FixedClock};
use davarr::state::SharedState;
use std::sync::Arc;
use tokio::sync::broadcast;

const END_OF_DAY_SECONDS: i64 = (23 * 60 + 59) * 60;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn instant(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap()
}

async fn spawn_state(
    now: i64,
) -> (
    Arc<SharedState>,
    broadcast::Receiver<NotificationEvent>,
    Arc<dyn Clock>,
) {
    let db_path =
        std::env::temp_dir().join(format!("davarr-absence-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());

    let (event_bus, rx) = broadcast::channel(32);
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(instant(now)));

    let state = SharedState::with_parts(config, event_bus, clock.clone())
        .await
        .expect("failed to create state");

    (Arc::new(state), rx, clock)
}

#[tokio::test]
async fn future_window_schedules_start_and_end_once() {
    let first = day(2030, 6, 10);
    let last = day(2030, 6, 14);
    let now = utc_midnight(day(2030, 6, 1));

    let (state, mut rx, _) = spawn_state(now).await;

    let absence = state
        .absence_service
        .create_or_update("alice", first, last, "Away", "Back on the 15th")
        .await
        .unwrap();

    let jobs = state.store.list_pending_jobs().await.unwrap();
    assert_eq!(jobs.len(), 2);

    let start_job = jobs.iter().find(|j| j.event == "start").unwrap();
    let end_job = jobs.iter().find(|j| j.event == "end").unwrap();

    assert_eq!(start_job.absence_id, absence.id);
    assert_eq!(start_job.run_at, utc_midnight(first));
    assert_eq!(end_job.run_at, utc_midnight(last) + END_OF_DAY_SECONDS);

    match rx.try_recv().unwrap() {
        NotificationEvent::OutOfOfficeScheduled(payload) => {
            assert_eq!(payload.absence_id, absence.id);
            assert_eq!(payload.user_id, "alice");
            assert_eq!(payload.start, utc_midnight(first));
            assert_eq!(payload.end, utc_midnight(last) + END_OF_DAY_SECONDS);
            assert_eq!(payload.short_message, "Away");
        }
        other => panic!("expected OutOfOfficeScheduled, got {other:?}"),
    }
}

#[tokio::test]
async fn running_window_schedules_only_end() {
    let first = day(2030, 6, 10);
    let last = day(2030, 6, 14);
    let now = utc_midnight(day(2030, 6, 12));

    let (state, _rx, _) = spawn_state(now).await;

    state
        .absence_service
        .create_or_update("alice", first, last, "", "")
        .await
        .unwrap();

    let jobs = state.store.list_pending_jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].event, "end");
}

#[tokio::test]
async fn past_window_schedules_nothing() {
    let first = day(2030, 6, 10);
    let last = day(2030, 6, 14);
    let now = utc_midnight(day(2030, 7, 1));

    let (state, _rx, _) = spawn_state(now).await;

    state
        .absence_service
        .create_or_update("alice", first, last, "", "")
        .await
        .unwrap();

    assert!(state.store.list_pending_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_preserves_id_and_dispatches_changed() {
    let now = utc_midnight(day(2030, 6, 1));
    let (state, mut rx, _) = spawn_state(now).await;

    let created = state
        .absence_service
        .create_or_update("alice", day(2030, 6, 10), day(2030, 6, 14), "Away", "")
        .await
        .unwrap();

    let updated = state
        .absence_service
        .create_or_update("alice", day(2030, 6, 11), day(2030, 6, 15), "Still away", "")
        .await
        .unwrap();

    assert_eq!(created.id, updated.id);
    assert_eq!(updated.first_day, day(2030, 6, 11));
    assert_eq!(updated.short_message, "Still away");

    assert!(matches!(
        rx.try_recv().unwrap(),
        NotificationEvent::OutOfOfficeScheduled(_)
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        NotificationEvent::OutOfOfficeChanged(_)
    ));
}

#[tokio::test]
async fn repeated_updates_do_not_deduplicate_jobs() {
    let now = utc_midnight(day(2030, 6, 1));
    let (state, _rx, _) = spawn_state(now).await;

    for _ in 0..2 {
        state
            .absence_service
            .create_or_update("alice", day(2030, 6, 10), day(2030, 6, 14), "", "")
            .await
            .unwrap();
    }

    // Scheduling is re-evaluated on every call without clearing prior
    // jobs, so both calls queue a start and an end.
    let jobs = state.store.list_pending_jobs().await.unwrap();
    assert_eq!(jobs.len(), 4);
}

#[tokio::test]
async fn rejects_inverted_windows() {
    let now = utc_midnight(day(2030, 6, 1));
    let (state, _rx, _) = spawn_state(now).await;

    let result = state
        .absence_service
        .create_or_update("alice", day(2030, 6, 14), day(2030, 6, 10), "", "")
        .await;

    assert!(result.is_err());
    assert!(state.store.list_pending_jobs().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_removes_window_and_jobs() {
    let now = utc_midnight(day(2030, 6, 1));
    let (state, _rx, _) = spawn_state(now).await;

    state
        .absence_service
        .create_or_update("alice", day(2030, 6, 10), day(2030, 6, 14), "", "")
        .await
        .unwrap();

    assert!(state.absence_service.clear("alice").await.unwrap());
    assert!(state.store.list_pending_jobs().await.unwrap().is_empty());
    assert!(state.absence_service.get("alice").await.unwrap().is_none());

    // Nothing left to clear.
    assert!(!state.absence_service.clear("alice").await.unwrap());
}

#[tokio::test]
async fn drain_fires_due_jobs_and_deletes_them() {
    let first = day(2030, 6, 10);
    let last = day(2030, 6, 14);
    let now = utc_midnight(day(2030, 6, 1));

    let (state, mut rx, _) = spawn_state(now).await;

    state
        .absence_service
        .create_or_update("alice", first, last, "", "")
        .await
        .unwrap();

    // Consume the scheduling notification so only job events remain.
    let _ = rx.try_recv().unwrap();

    // Both edges are now in the past.
    let later: Arc<dyn Clock> =
        Arc::new(FixedClock(instant(utc_midnight(day(2030, 7, 1)))));

    let fired = drain_due_jobs(&state.store, later.as_ref(), &state.event_bus)
        .await
        .unwrap();
    assert_eq!(fired, 2);

    assert!(matches!(
        rx.try_recv().unwrap(),
        NotificationEvent::OutOfOfficeStarted { .. }
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        NotificationEvent::OutOfOfficeEnded { .. }
    ));

    assert!(state.store.list_pending_jobs().await.unwrap().is_empty());

    // A second drain finds nothing.
    let fired = drain_due_jobs(&state.store, later.as_ref(), &state.event_bus)
        .await
        .unwrap();
    assert_eq!(fired, 0);
}

#[tokio::test]
async fn drain_skips_jobs_not_yet_due() {
    let first = day(2030, 6, 10);
    let last = day(2030, 6, 14);
    let now = utc_midnight(day(2030, 6, 1));

    let (state, _rx, clock) = spawn_state(now).await;

    state
        .absence_service
        .create_or_update("alice", first, last, "", "")
        .await
        .unwrap();

    let fired = drain_due_jobs(&state.store, clock.as_ref(), &state.event_bus)
        .await
        .unwrap();

    assert_eq!(fired, 0);
    assert_eq!(state.store.list_pending_jobs().await.unwrap().len(), 2);
}
