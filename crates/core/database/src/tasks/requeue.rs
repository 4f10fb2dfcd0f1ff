use std::time::Duration;

use garrison_config::config;
use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::Database;

/// Return delivered commands whose expiry passed without an
/// acknowledgment back to the pending queue
pub async fn requeue(db: &Database) -> Result<u64> {
    db.requeue_expired_commands(Timestamp::now_utc()).await
}

/// Start a new worker
pub async fn worker(db: Database) {
    loop {
        match requeue(&db).await {
            Ok(0) => (),
            Ok(count) => info!("Returned {count} expired command deliveries to pending."),
            Err(err) => error!("Delivery requeue failed with {err:?}!"),
        }

        let interval = config().await.commands.requeue_interval_seconds;
        async_std::task::sleep(Duration::from_secs(interval)).await;
    }
}
