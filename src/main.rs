use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use argus_tracker::config::AppConfig;
use argus_tracker::fetch::PageFetcher;
use argus_tracker::models::load_trackers;
use argus_tracker::notify::{LogNotifier, Notifier, SlackNotifier};
use argus_tracker::runner::{RunOutcome, TrackerRunner};
use argus_tracker::store::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("argus_tracker=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    let trackers = load_trackers(&config.trackers_file)?;
    info!("Starting Argus tick with {} trackers", trackers.len());

    let store = Arc::new(SqliteStore::connect(&config.database).await?);

    let notifier: Arc<dyn Notifier> = match &config.notifications.webhook_url {
        Some(webhook_url) => Arc::new(SlackNotifier::new(
            webhook_url.clone(),
            config.notifications.username.clone(),
        )?),
        None => {
            warn!("No webhook configured, alerts will be logged only");
            Arc::new(LogNotifier)
        }
    };

    let runner = TrackerRunner::new(
        PageFetcher::new(&config)?,
        store,
        notifier,
        config.notifications.alert_channel.clone(),
        config.notifications.error_channel.clone(),
    );

    let mut changed = 0usize;
    let mut failed = 0usize;
    for tracker in &trackers {
        match runner.run(tracker).await {
            RunOutcome::Changed { snapshot_id } => {
                info!(tracker = %tracker.name, snapshot_id, "changed");
                changed += 1;
            }
            RunOutcome::NoChange => {}
            RunOutcome::Failed { reason } => {
                warn!(tracker = %tracker.name, %reason, "failed");
                failed += 1;
            }
        }
    }

    info!(
        "Tick complete: {} changed, {} failed, {} total",
        changed,
        failed,
        trackers.len()
    );
    Ok(())
}
