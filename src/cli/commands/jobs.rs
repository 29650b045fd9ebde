use crate::config::Config;
use crate::db::Store;

pub async fn cmd_jobs_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let jobs = store.list_pending_jobs().await?;

    if jobs.is_empty() {
        println!("No pending jobs.");
        return Ok(());
    }

    println!("Pending Jobs ({} total)", jobs.len());
    println!("{:-<70}", "");

    for job in jobs {
        println!(
            "#{} {} for {} (absence {}) at epoch {}",
            job.id, job.event, job.user_id, job.absence_id, job.run_at
        );
    }

    Ok(())
}
