use std::fmt;

use garrison_config::config;
use garrison_result::Result;
use iso8601_timestamp::{Duration, Timestamp};
use ulid::Ulid;

use crate::{AuditEntry, ChatEntry, Database, ModerationAction, ServerState};

auto_derived!(
    /// Staff-issued moderation command awaiting execution by the
    /// remote game server
    pub struct Command {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Server this command is queued for
        pub server: String,

        /// What the game server should do
        pub kind: CommandKind,
        /// Player the command applies to
        pub target_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reason: Option<String>,
        /// Staff member who issued the command
        pub issued_by: String,

        /// Delivery state
        pub status: CommandStatus,
        /// Token under which the current delivery was claimed
        #[serde(skip_serializing_if = "Option::is_none")]
        pub delivery_token: Option<String>,
        /// When the current delivery lapses back to pending
        #[serde(skip_serializing_if = "Option::is_none")]
        pub delivery_expires_at: Option<Timestamp>,
        /// How many times this command has been handed to a poller
        #[serde(default)]
        pub attempts: u32,
        /// Why the game server refused the command, if it did
        #[serde(skip_serializing_if = "Option::is_none")]
        pub rejection_reason: Option<String>,

        pub created_at: Timestamp,
    }

    /// Command type
    pub enum CommandKind {
        Kick,
        Mute,
        Unmute,
    }

    /// Delivery state of a command.
    ///
    /// Commands are never deleted, only transitioned:
    /// pending -> delivered -> executed or rejected, where an expired
    /// delivery lapses back to pending.
    pub enum CommandStatus {
        /// Waiting to be handed to the game server
        Pending,
        /// Claimed by a poll, awaiting acknowledgment
        Delivered,
        /// Acknowledged as applied in-game
        Executed,
        /// Refused by the game server
        Rejected,
    }

    /// Acknowledgment outcome reported by the game server
    pub enum AckOutcome {
        Executed,
        Rejected,
    }
);

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Command {
    /// Queue a new command for a server.
    ///
    /// Also drops an inline line into the chat transcript so staff
    /// watching the live view see the action, and records the action on
    /// the global moderation ledger.
    pub async fn create(
        db: &Database,
        server: &ServerState,
        kind: CommandKind,
        target_id: String,
        reason: Option<String>,
        issued_by: String,
    ) -> Result<Command> {
        let command = Command {
            id: Ulid::new().to_string(),
            server: server.id.to_string(),
            kind,
            target_id,
            reason,
            issued_by,
            status: CommandStatus::Pending,
            delivery_token: None,
            delivery_expires_at: None,
            attempts: 0,
            rejection_reason: None,
            created_at: Timestamp::now_utc(),
        };

        db.insert_command(&command).await?;

        let line = match &command.reason {
            Some(reason) => format!(
                "{} issued {} on {}: {}",
                command.issued_by, command.kind, command.target_id, reason
            ),
            None => format!(
                "{} issued {} on {}",
                command.issued_by, command.kind, command.target_id
            ),
        };

        db.append_chat(
            &server.id,
            &ChatEntry::command(command.issued_by.to_string(), line),
        )
        .await?;

        ModerationAction::log_command(db, &command).await?;

        Ok(command)
    }

    /// Claim every pending command for a server under a fresh delivery
    /// token with a short expiry.
    ///
    /// The claim is a single conditional store operation, so two
    /// concurrent pollers can never receive the same command.
    pub async fn claim_all(db: &Database, server: &str) -> Result<(String, Vec<Command>)> {
        let token = Ulid::new().to_string();
        let expires_at = Timestamp::now_utc()
            + Duration::seconds(config().await.commands.delivery_expiry_seconds);

        let commands = db.claim_commands(server, &token, expires_at).await?;
        Ok((token, commands))
    }

    /// Conclude a delivered command.
    ///
    /// Idempotent: re-acknowledging a concluded command with the same
    /// outcome has no effect, while a conflicting outcome is an error.
    pub async fn acknowledge(
        db: &Database,
        id: &str,
        token: &str,
        outcome: AckOutcome,
        reason: Option<String>,
    ) -> Result<Command> {
        let rejected = matches!(outcome, AckOutcome::Rejected);
        let command = db.acknowledge_command(id, token, outcome, reason).await?;

        if rejected {
            db.append_audit(
                &command.server,
                &AuditEntry::new(
                    "game".to_string(),
                    match &command.rejection_reason {
                        Some(reason) => format!(
                            "Rejected {} on {}: {}",
                            command.kind, command.target_id, reason
                        ),
                        None => format!("Rejected {} on {}", command.kind, command.target_id),
                    },
                ),
            )
            .await?;
        }

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use iso8601_timestamp::{Duration, Timestamp};

    use crate::{
        AckOutcome, ActionKind, ChatEntry, ChatKind, Command, CommandKind, CommandStatus,
        Database, ServerState,
    };

    async fn seed_server(db: &Database, id: &str) -> ServerState {
        db.append_chat(
            id,
            &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
        )
        .await
        .expect("`ChatEntry`");

        db.fetch_server_state(id).await.expect("`ServerState`")
    }

    #[async_std::test]
    async fn commands_are_delivered_exactly_once() {
        database_test!(|db| async move {
            let state = seed_server(&db, "S1").await;

            let command = Command::create(
                &db,
                &state,
                CommandKind::Kick,
                "42".to_string(),
                Some("AFK".to_string()),
                "moderator".to_string(),
            )
            .await
            .expect("`Command`");
            assert!(matches!(command.status, CommandStatus::Pending));

            let (token, claimed) = Command::claim_all(&db, "S1").await.expect("claim");
            assert_eq!(claimed.len(), 1);
            assert_eq!(claimed[0].id, command.id);
            assert!(matches!(claimed[0].status, CommandStatus::Delivered));

            // An immediate second poll comes back empty.
            let (_, empty) = Command::claim_all(&db, "S1").await.expect("claim");
            assert!(empty.is_empty());

            let acked = Command::acknowledge(&db, &command.id, &token, AckOutcome::Executed, None)
                .await
                .expect("ack");
            assert!(matches!(acked.status, CommandStatus::Executed));

            // Re-acknowledging with the same outcome is a no-op.
            Command::acknowledge(&db, &command.id, &token, AckOutcome::Executed, None)
                .await
                .expect("ack");

            // A conflicting outcome is refused.
            assert!(
                Command::acknowledge(&db, &command.id, &token, AckOutcome::Rejected, None)
                    .await
                    .is_err()
            );
        });
    }

    #[async_std::test]
    async fn expired_deliveries_are_requeued() {
        database_test!(|db| async move {
            let state = seed_server(&db, "S1").await;

            let command = Command::create(
                &db,
                &state,
                CommandKind::Mute,
                "42".to_string(),
                None,
                "moderator".to_string(),
            )
            .await
            .expect("`Command`");

            // Claim with an expiry that has already lapsed.
            let claimed = db
                .claim_commands(
                    "S1",
                    "token-1",
                    Timestamp::now_utc() - Duration::seconds(1),
                )
                .await
                .expect("claim");
            assert_eq!(claimed.len(), 1);

            let requeued = db
                .requeue_expired_commands(Timestamp::now_utc())
                .await
                .expect("requeue");
            assert_eq!(requeued, 1);

            let (_, reclaimed) = Command::claim_all(&db, "S1").await.expect("claim");
            assert_eq!(reclaimed.len(), 1);
            assert_eq!(reclaimed[0].attempts, 2);

            // The lapsed token can no longer conclude the command.
            assert!(Command::acknowledge(
                &db,
                &command.id,
                "token-1",
                AckOutcome::Executed,
                None
            )
            .await
            .is_err());
        });
    }

    #[async_std::test]
    async fn enqueue_writes_transcript_line_and_ledger_row() {
        database_test!(|db| async move {
            let state = seed_server(&db, "S1").await;

            Command::create(
                &db,
                &state,
                CommandKind::Kick,
                "42".to_string(),
                Some("AFK".to_string()),
                "moderator".to_string(),
            )
            .await
            .expect("`Command`");

            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            let line = state.chat.last().expect("entry");
            assert_eq!(line.kind, ChatKind::Command);
            assert!(line.content.contains("AFK"));

            let actions = db
                .fetch_moderation_actions(Some("S1"), None, 10)
                .await
                .expect("ledger");
            assert_eq!(actions.len(), 1);
            assert!(matches!(actions[0].action, ActionKind::Kick));
        });
    }

    #[async_std::test]
    async fn rejection_is_an_explicit_terminal_state() {
        database_test!(|db| async move {
            let state = seed_server(&db, "S1").await;

            let command = Command::create(
                &db,
                &state,
                CommandKind::Kick,
                "404".to_string(),
                None,
                "moderator".to_string(),
            )
            .await
            .expect("`Command`");

            let (token, _) = Command::claim_all(&db, "S1").await.expect("claim");

            let rejected = Command::acknowledge(
                &db,
                &command.id,
                &token,
                AckOutcome::Rejected,
                Some("unknown player".to_string()),
            )
            .await
            .expect("ack");
            assert!(matches!(rejected.status, CommandStatus::Rejected));
            assert_eq!(rejected.rejection_reason.as_deref(), Some("unknown player"));

            // The refusal shows up on the audit trail.
            let state = db.fetch_server_state("S1").await.expect("`ServerState`");
            assert!(state
                .audit
                .iter()
                .any(|entry| entry.content.contains("unknown player")));

            // And the command never becomes pending again.
            let (_, reclaimed) = Command::claim_all(&db, "S1").await.expect("claim");
            assert!(reclaimed.is_empty());
        });
    }
}
