use garrison_result::Result;

use crate::OutboxMessage;
use crate::ReferenceDb;

use super::AbstractServerOutbox;

#[async_trait]
impl AbstractServerOutbox for ReferenceDb {
    /// Insert a new outbox broadcast
    async fn insert_outbox_message(&self, message: &OutboxMessage) -> Result<()> {
        let mut server_outbox = self.server_outbox.lock().await;
        if server_outbox.contains_key(&message.id) {
            Err(create_database_error!("insert", "outbox_message"))
        } else {
            server_outbox.insert(message.id.to_string(), message.clone());
            Ok(())
        }
    }

    /// Atomically claim all undelivered broadcasts for a server
    async fn claim_outbox_messages(
        &self,
        server: &str,
        token: &str,
    ) -> Result<Vec<OutboxMessage>> {
        let mut server_outbox = self.server_outbox.lock().await;

        let mut claimed: Vec<OutboxMessage> = server_outbox
            .values_mut()
            .filter(|message| message.server == server && !message.delivered)
            .map(|message| {
                message.delivered = true;
                message.claim_token = Some(token.to_string());
                message.clone()
            })
            .collect();

        claimed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(claimed)
    }
}
