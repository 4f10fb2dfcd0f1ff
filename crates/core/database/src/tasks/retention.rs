use std::time::Duration;

use garrison_config::config;
use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::Database;

/// Delete aggregates past their retention threshold.
///
/// Unflagged aggregates are kept for `retention.days`, flagged ones for
/// `retention.flagged_days`. Deletion is hard; an ingestion racing the
/// sweep simply recreates the aggregate.
pub async fn sweep(db: &Database) -> Result<u64> {
    let config = config().await;
    let now = Timestamp::now_utc();

    db.delete_stale_server_states(
        now - iso8601_timestamp::Duration::days(config.retention.days),
        now - iso8601_timestamp::Duration::days(config.retention.flagged_days),
    )
    .await
}

/// Start a new worker
pub async fn worker(db: Database) {
    loop {
        match sweep(&db).await {
            Ok(0) => (),
            Ok(count) => info!("Retention sweep removed {count} stale server aggregate(s)."),
            Err(err) => error!("Retention sweep failed with {err:?}!"),
        }

        let interval = config().await.retention.sweep_interval_seconds;
        async_std::task::sleep(Duration::from_secs(interval)).await;
    }
}
