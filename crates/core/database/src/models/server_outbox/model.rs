use garrison_result::Result;
use iso8601_timestamp::Timestamp;
use ulid::Ulid;

use crate::{AuditEntry, ChatEntry, Database, ServerState};

auto_derived!(
    /// Informational dashboard-to-game broadcast.
    ///
    /// Mirrors the command queue shape but with no acknowledgment
    /// phase; unlike a command, a lost broadcast is acceptable.
    pub struct OutboxMessage {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Server this broadcast is addressed to
        pub server: String,

        pub content: String,
        /// Staff member who posted the broadcast
        pub author: String,

        /// Whether the game server has picked this broadcast up
        #[serde(skip_serializing_if = "crate::if_false", default)]
        pub delivered: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub claim_token: Option<String>,

        pub created_at: Timestamp,
    }
);

impl OutboxMessage {
    /// Post a staff broadcast to a server.
    ///
    /// Fans out to the chat transcript as a notification, the audit
    /// trail, and the outbox the game server polls.
    pub async fn broadcast(
        db: &Database,
        server: &ServerState,
        content: String,
        author: String,
    ) -> Result<OutboxMessage> {
        db.append_chat(
            &server.id,
            &ChatEntry::notification(author.to_string(), content.to_string()),
        )
        .await?;

        db.append_audit(
            &server.id,
            &AuditEntry::new(author.to_string(), format!("Broadcast: {content}")),
        )
        .await?;

        let message = OutboxMessage {
            id: Ulid::new().to_string(),
            server: server.id.to_string(),
            content,
            author,
            delivered: false,
            claim_token: None,
            created_at: Timestamp::now_utc(),
        };

        db.insert_outbox_message(&message).await?;
        Ok(message)
    }

    /// Hand all undelivered broadcasts for a server to the game client
    pub async fn claim_all(db: &Database, server: &str) -> Result<Vec<OutboxMessage>> {
        db.claim_outbox_messages(server, &Ulid::new().to_string())
            .await
    }
}
