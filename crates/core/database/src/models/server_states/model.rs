use iso8601_timestamp::Timestamp;
use ulid::Ulid;

/// Maximum number of chat entries retained per server; older entries
/// are evicted from the head by the store itself.
pub const CHAT_WINDOW: usize = 100;

auto_derived!(
    /// Aggregate state for one live (or recently live) game server
    pub struct ServerState {
        /// Externally assigned server identifier
        #[serde(rename = "_id")]
        pub id: String,

        /// Last known full roster, replaced wholesale on ingestion
        #[serde(default)]
        pub players: Vec<PlayerEntry>,
        /// Sliding window over the most recent chat entries
        #[serde(default)]
        pub chat: Vec<ChatEntry>,
        /// Moderation and administrative events scoped to this server
        #[serde(default)]
        pub audit: Vec<AuditEntry>,

        /// Whether this server is under investigation, which extends
        /// its retention lifetime
        #[serde(default)]
        pub flagged: bool,
        /// Last write, drives retention
        pub updated_at: Timestamp,
    }

    /// Roster entry
    pub struct PlayerEntry {
        pub id: String,
        pub username: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub team: Option<String>,
        /// Set once the player disconnects; entries are not removed
        /// until the next full roster replace
        #[serde(skip_serializing_if = "crate::if_false", default)]
        pub left: bool,
    }

    /// Chat transcript entry
    pub struct ChatEntry {
        /// Originating player, absent for synthetic entries
        #[serde(skip_serializing_if = "Option::is_none")]
        pub player_id: Option<String>,
        pub username: String,
        pub content: String,
        #[serde(default)]
        pub kind: ChatKind,
        pub timestamp: Timestamp,
    }

    /// Origin of a chat entry
    pub enum ChatKind {
        /// Relayed from a player in-game
        Message,
        /// Staff broadcast
        Notification,
        /// Inline record of an issued moderation command
        Command,
    }

    /// Audit trail entry
    pub struct AuditEntry {
        pub id: String,
        pub actor: String,
        pub content: String,
        pub timestamp: Timestamp,
    }

    /// Summary of a server aggregate for listings
    pub struct ServerStateMeta {
        pub id: String,
        pub flagged: bool,
        pub updated_at: Timestamp,
        pub player_count: usize,
        pub chat_count: usize,
        pub audit_count: usize,
    }
);

impl Default for ChatKind {
    fn default() -> Self {
        ChatKind::Message
    }
}

impl ServerState {
    /// Create an empty aggregate for a previously unseen server
    pub fn new(id: String) -> Self {
        ServerState {
            id,
            players: vec![],
            chat: vec![],
            audit: vec![],
            flagged: false,
            updated_at: Timestamp::now_utc(),
        }
    }

    /// Summarise this aggregate for listings
    pub fn meta(&self) -> ServerStateMeta {
        ServerStateMeta {
            id: self.id.clone(),
            flagged: self.flagged,
            updated_at: self.updated_at,
            player_count: self.players.iter().filter(|player| !player.left).count(),
            chat_count: self.chat.len(),
            audit_count: self.audit.len(),
        }
    }
}

impl ChatEntry {
    /// Chat entry relayed from a player in-game
    pub fn message(player_id: String, username: String, content: String) -> Self {
        ChatEntry {
            player_id: Some(player_id),
            username,
            content,
            kind: ChatKind::Message,
            timestamp: Timestamp::now_utc(),
        }
    }

    /// Synthetic entry for a staff broadcast
    pub fn notification(author: String, content: String) -> Self {
        ChatEntry {
            player_id: None,
            username: author,
            content,
            kind: ChatKind::Notification,
            timestamp: Timestamp::now_utc(),
        }
    }

    /// Inline transcript line for an issued moderation command
    pub fn command(issued_by: String, content: String) -> Self {
        ChatEntry {
            player_id: None,
            username: issued_by,
            content,
            kind: ChatKind::Command,
            timestamp: Timestamp::now_utc(),
        }
    }
}

impl AuditEntry {
    pub fn new(actor: String, content: String) -> Self {
        AuditEntry {
            id: Ulid::new().to_string(),
            actor,
            content,
            timestamp: Timestamp::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use iso8601_timestamp::{Duration, Timestamp};

    use crate::{ChatEntry, PlayerEntry, CHAT_WINDOW};

    #[async_std::test]
    async fn chat_ingestion_creates_the_aggregate() {
        database_test!(|db| async move {
            db.append_chat(
                "S1",
                &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
            )
            .await
            .expect("`ChatEntry`");

            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            assert_eq!(state.chat.len(), 1);
            assert_eq!(state.chat[0].player_id.as_deref(), Some("42"));
            assert_eq!(state.chat[0].content, "hello");
            assert!(state.players.is_empty());
            assert!(!state.flagged);
        });
    }

    #[async_std::test]
    async fn chat_window_evicts_oldest_entries_first() {
        database_test!(|db| async move {
            for i in 0..120 {
                db.append_chat(
                    "S1",
                    &ChatEntry::message(
                        "42".to_string(),
                        "Player".to_string(),
                        format!("message {i}"),
                    ),
                )
                .await
                .expect("`ChatEntry`");
            }

            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            assert_eq!(state.chat.len(), CHAT_WINDOW);
            assert_eq!(state.chat.first().expect("entry").content, "message 20");
            assert_eq!(state.chat.last().expect("entry").content, "message 119");
        });
    }

    #[async_std::test]
    async fn roster_replace_is_wholesale() {
        database_test!(|db| async move {
            db.replace_roster(
                "S1",
                &[
                    PlayerEntry {
                        id: "1".to_string(),
                        username: "one".to_string(),
                        team: Some("red".to_string()),
                        left: false,
                    },
                    PlayerEntry {
                        id: "2".to_string(),
                        username: "two".to_string(),
                        team: None,
                        left: false,
                    },
                ],
            )
            .await
            .expect("roster");

            db.replace_roster(
                "S1",
                &[PlayerEntry {
                    id: "2".to_string(),
                    username: "two".to_string(),
                    team: None,
                    left: true,
                }],
            )
            .await
            .expect("roster");

            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            assert_eq!(state.players.len(), 1);
            assert_eq!(state.players[0].id, "2");
            assert!(state.players[0].left);
            assert_eq!(state.meta().player_count, 0);
        });
    }

    #[async_std::test]
    async fn flagging_requires_an_existing_aggregate() {
        database_test!(|db| async move {
            assert!(db.set_flagged("missing", true).await.is_err());

            db.append_chat(
                "S1",
                &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
            )
            .await
            .expect("`ChatEntry`");

            db.set_flagged("S1", true).await.expect("flag");
            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            assert!(state.flagged);
        });
    }

    #[async_std::test]
    async fn retention_honours_both_thresholds() {
        database_test!(|db| async move {
            db.append_chat(
                "plain",
                &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
            )
            .await
            .expect("`ChatEntry`");

            db.append_chat(
                "watched",
                &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
            )
            .await
            .expect("`ChatEntry`");
            db.set_flagged("watched", true).await.expect("flag");

            let now = Timestamp::now_utc();

            // Fresh aggregates survive a sweep at the configured thresholds.
            let removed = db
                .delete_stale_server_states(now - Duration::days(14), now - Duration::days(90))
                .await
                .expect("sweep");
            assert_eq!(removed, 0);

            // Push the unflagged threshold past now: only the plain one goes.
            let removed = db
                .delete_stale_server_states(now + Duration::minutes(1), now - Duration::days(90))
                .await
                .expect("sweep");
            assert_eq!(removed, 1);
            assert!(db.fetch_server_state("plain").await.is_err());
            assert!(db.fetch_server_state("watched").await.is_ok());

            // Flagged aggregates only go once their longer threshold passes.
            let removed = db
                .delete_stale_server_states(now + Duration::minutes(1), now + Duration::minutes(1))
                .await
                .expect("sweep");
            assert_eq!(removed, 1);
            assert!(db.fetch_server_state("watched").await.is_err());
        });
    }
}
