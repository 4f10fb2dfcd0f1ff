use garrison_result::Result;

use crate::OutboxMessage;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractServerOutbox: Sync + Send {
    /// Insert a new outbox broadcast
    async fn insert_outbox_message(&self, message: &OutboxMessage) -> Result<()>;

    /// Atomically mark all undelivered broadcasts for a server as
    /// delivered under the given token and return them in creation order
    async fn claim_outbox_messages(&self, server: &str, token: &str)
        -> Result<Vec<OutboxMessage>>;
}
