use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::SchedulerConfig;
use crate::db::Store;
use crate::domain::AbsenceEventKind;
use crate::domain::events::NotificationEvent;
use crate::services::clock::Clock;

/// Background runner for persisted one-shot jobs. Each tick drains jobs
/// whose due time has passed, dispatches their notification and deletes
/// the row.
pub struct Scheduler {
    store: Store,
    clock: Arc<dyn Clock>,
    event_bus: broadcast::Sender<NotificationEvent>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        event_bus: broadcast::Sender<NotificationEvent>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            clock,
            event_bus,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background job runner");

        if let Some(cron_expr) = self.config.cron_expression.clone() {
            self.run_with_cron(&cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let clock = Arc::clone(&self.clock);
        let event_bus = self.event_bus.clone();
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let store = store.clone();
            let clock = Arc::clone(&clock);
            let event_bus = event_bus.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = drain_due_jobs(&store, clock.as_ref(), &event_bus).await {
                    error!(event = "job_failed", job_name = "drain_due", error = %e, "Scheduled job drain failed");
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Job runner running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let tick_seconds = u64::from(self.config.tick_seconds.max(1));
        info!("Job runner running: drain every {}s", tick_seconds);

        let mut tick = interval(Duration::from_secs(tick_seconds));

        loop {
            tick.tick().await;

            if !*self.running.read().await {
                break;
            }

            if let Err(e) =
                drain_due_jobs(&self.store, self.clock.as_ref(), &self.event_bus).await
            {
                error!(event = "job_failed", job_name = "drain_due", error = %e, "Scheduled job drain failed");
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping job runner...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Single drain pass, for the CLI and tests.
    pub async fn run_once(&self) -> Result<usize> {
        drain_due_jobs(&self.store, self.clock.as_ref(), &self.event_bus).await
    }
}

/// Fire every job whose instant has passed. Duplicate rows for the same
/// edge each fire once; rows with an unknown event kind are dropped.
pub async fn drain_due_jobs(
    store: &Store,
    clock: &dyn Clock,
    event_bus: &broadcast::Sender<NotificationEvent>,
) -> Result<usize> {
    let now = clock.epoch_seconds();
    let due = store.due_jobs(now).await?;
    let mut fired = 0;

    for job in due {
        match job.event.parse::<AbsenceEventKind>() {
            Ok(AbsenceEventKind::Start) => {
                let _ = event_bus.send(NotificationEvent::OutOfOfficeStarted {
                    absence_id: job.absence_id,
                    user_id: job.user_id.clone(),
                });
                info!(user_id = %job.user_id, absence_id = job.absence_id, "Absence started");
                metrics::counter!("davarr_jobs_fired_total").increment(1);
                fired += 1;
            }
            Ok(AbsenceEventKind::End) => {
                let _ = event_bus.send(NotificationEvent::OutOfOfficeEnded {
                    absence_id: job.absence_id,
                    user_id: job.user_id.clone(),
                });
                info!(user_id = %job.user_id, absence_id = job.absence_id, "Absence ended");
                metrics::counter!("davarr_jobs_fired_total").increment(1);
                fired += 1;
            }
            Err(e) => {
                warn!(job_id = job.id, error = %e, "Dropping job with unknown event kind");
            }
        }

        store.delete_job(job.id).await?;
    }

    Ok(fired)
}
