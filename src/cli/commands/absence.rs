use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_absence_set(
    config: &Config,
    user: &str,
    first_day: &str,
    last_day: &str,
    short_message: &str,
    message: &str,
) -> anyhow::Result<()> {
    let first_day = parse_day(first_day)?;
    let last_day = parse_day(last_day)?;

    let state = Arc::new(SharedState::new(config.clone()).await?);

    let absence = state
        .absence_service
        .create_or_update(user, first_day, last_day, short_message, message)
        .await?;

    println!(
        "✓ Absence for {user}: {} to {} (ID: {})",
        absence.first_day, absence.last_day, absence.id
    );

    let jobs = state.store.list_pending_jobs().await?;
    let mine: Vec<_> = jobs.iter().filter(|j| j.absence_id == absence.id).collect();
    if mine.is_empty() {
        println!("  No future edges to schedule (window already passed).");
    } else {
        for job in mine {
            println!("  Queued {} job at epoch {}", job.event, job.run_at);
        }
    }

    Ok(())
}

pub async fn cmd_absence_show(config: &Config, user: &str) -> anyhow::Result<()> {
    let state = Arc::new(SharedState::new(config.clone()).await?);

    match state.absence_service.get(user).await? {
        Some(absence) => {
            println!("Absence for {user} (ID: {})", absence.id);
            println!("  {} to {}", absence.first_day, absence.last_day);
            if !absence.short_message.is_empty() {
                println!("  Status: {}", absence.short_message);
            }
            if !absence.message.is_empty() {
                println!("  Message: {}", absence.message);
            }
        }
        None => println!("No absence configured for {user}."),
    }

    Ok(())
}

pub async fn cmd_absence_clear(config: &Config, user: &str) -> anyhow::Result<()> {
    let state = Arc::new(SharedState::new(config.clone()).await?);

    if state.absence_service.clear(user).await? {
        println!("✓ Absence for {user} cleared.");
    } else {
        println!("No absence configured for {user}.");
    }

    Ok(())
}

fn parse_day(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{value}', expected YYYY-MM-DD"))
}
