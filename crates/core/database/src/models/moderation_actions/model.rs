use garrison_result::{Error, Result};
use iso8601_timestamp::{Duration, Timestamp};
use ulid::Ulid;

use crate::platform::Restrictions;
use crate::{AuditEntry, Command, CommandKind, Database};

auto_derived!(
    /// Entry on the global enforcement ledger.
    ///
    /// Immutable once created; a row is written for every enforcement
    /// decision, including ones the downstream authority refused.
    pub struct ModerationAction {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,

        pub action: ActionKind,
        pub target_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub target_name: Option<String>,
        pub moderator_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub moderator_name: Option<String>,

        /// Originating server, absent for purely global actions
        #[serde(skip_serializing_if = "Option::is_none")]
        pub server: Option<String>,
        pub scope: ActionScope,

        #[serde(skip_serializing_if = "Option::is_none")]
        pub ban_type: Option<BanType>,
        /// When a temporary restriction lapses
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expires_at: Option<Timestamp>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reason: Option<String>,

        /// Whether the downstream enforcement call went through
        pub status: ActionStatus,
        /// Opaque echo of the restriction authority's reply
        #[serde(skip_serializing_if = "Option::is_none")]
        pub raw_response: Option<String>,

        pub created_at: Timestamp,
    }

    /// Enforcement action type
    pub enum ActionKind {
        Kick,
        Ban,
        Unban,
        Mute,
        Unmute,
    }

    /// Whether an action applies to one server or the whole platform
    pub enum ActionScope {
        Server,
        Global,
    }

    /// Ban flavour
    pub enum BanType {
        Permanent,
        Temporary,
        ServerOnly,
    }

    /// Outcome of the downstream enforcement call
    pub enum ActionStatus {
        Succeeded,
        Failed,
    }
);

/// Parameters for an enforcement decision
#[derive(Debug, Clone)]
pub struct EnforcementRequest {
    pub target_id: String,
    pub target_name: Option<String>,
    pub moderator_id: String,
    pub moderator_name: Option<String>,
    pub server: Option<String>,
    pub scope: ActionScope,
    pub ban_type: Option<BanType>,
    pub duration_minutes: Option<i64>,
    pub reason: Option<String>,
}

impl From<&CommandKind> for ActionKind {
    fn from(kind: &CommandKind) -> ActionKind {
        match kind {
            CommandKind::Kick => ActionKind::Kick,
            CommandKind::Mute => ActionKind::Mute,
            CommandKind::Unmute => ActionKind::Unmute,
        }
    }
}

impl ModerationAction {
    /// Apply a ban and record it.
    ///
    /// Global bans are executed against the restriction authority first;
    /// the ledger row is written either way, and a downstream failure is
    /// surfaced to the caller after it has been recorded. A ban naming a
    /// server also queues a kick there so it takes effect in-game.
    pub async fn ban(
        db: &Database,
        restrictions: &Restrictions,
        request: EnforcementRequest,
    ) -> Result<ModerationAction> {
        let expires_at = match request.ban_type {
            Some(BanType::Temporary) => Some(
                Timestamp::now_utc()
                    + Duration::minutes(
                        request
                            .duration_minutes
                            .ok_or_else(|| create_error!(InvalidOperation))?,
                    ),
            ),
            _ => None,
        };

        let downstream = match request.scope {
            ActionScope::Global => Some(
                restrictions
                    .apply_restriction(&request.target_id, request.reason.as_deref(), expires_at)
                    .await,
            ),
            ActionScope::Server => None,
        };

        let action =
            ModerationAction::record(db, ActionKind::Ban, &request, expires_at, downstream)
                .await?;

        if let Some(server) = &request.server {
            match db.fetch_server_state(server).await {
                Ok(state) => {
                    Command::create(
                        db,
                        &state,
                        CommandKind::Kick,
                        request.target_id.to_string(),
                        request.reason.clone(),
                        request.moderator_id.to_string(),
                    )
                    .await?;

                    db.append_audit(
                        server,
                        &AuditEntry::new(
                            request.moderator_id.to_string(),
                            format!("Banned {}", request.target_id),
                        ),
                    )
                    .await?;
                }
                Err(_) => warn!("Banned {} on unknown server {server}.", request.target_id),
            }
        }

        Ok(action)
    }

    /// Clear a restriction and record it
    pub async fn unban(
        db: &Database,
        restrictions: &Restrictions,
        request: EnforcementRequest,
    ) -> Result<ModerationAction> {
        let downstream = match request.scope {
            ActionScope::Global => Some(restrictions.clear_restriction(&request.target_id).await),
            ActionScope::Server => None,
        };

        ModerationAction::record(db, ActionKind::Unban, &request, None, downstream).await
    }

    /// Record a server-scoped command on the ledger
    pub async fn log_command(db: &Database, command: &Command) -> Result<ModerationAction> {
        let action = ModerationAction {
            id: Ulid::new().to_string(),
            action: ActionKind::from(&command.kind),
            target_id: command.target_id.to_string(),
            target_name: None,
            moderator_id: command.issued_by.to_string(),
            moderator_name: None,
            server: Some(command.server.to_string()),
            scope: ActionScope::Server,
            ban_type: None,
            expires_at: None,
            reason: command.reason.clone(),
            status: ActionStatus::Succeeded,
            raw_response: None,
            created_at: Timestamp::now_utc(),
        };

        db.insert_moderation_action(&action).await?;
        Ok(action)
    }

    /// Write the ledger row for an enforcement decision, then surface
    /// any downstream failure
    async fn record(
        db: &Database,
        kind: ActionKind,
        request: &EnforcementRequest,
        expires_at: Option<Timestamp>,
        downstream: Option<Result<String>>,
    ) -> Result<ModerationAction> {
        let (status, raw_response, failure): (_, _, Option<Error>) = match downstream {
            None => (ActionStatus::Succeeded, None, None),
            Some(Ok(raw)) => (ActionStatus::Succeeded, Some(raw), None),
            Some(Err(error)) => (
                ActionStatus::Failed,
                Some(format!("{:?}", error.error_type)),
                Some(error),
            ),
        };

        let action = ModerationAction {
            id: Ulid::new().to_string(),
            action: kind,
            target_id: request.target_id.to_string(),
            target_name: request.target_name.clone(),
            moderator_id: request.moderator_id.to_string(),
            moderator_name: request.moderator_name.clone(),
            server: request.server.clone(),
            scope: request.scope.clone(),
            ban_type: request.ban_type.clone(),
            expires_at,
            reason: request.reason.clone(),
            status,
            raw_response,
            created_at: Timestamp::now_utc(),
        };

        db.insert_moderation_action(&action).await?;

        if let Some(error) = failure {
            return Err(error);
        }

        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use iso8601_timestamp::{Duration, Timestamp};

    use crate::platform::{ReferenceRestrictions, Restrictions};
    use crate::{
        ActionKind, ActionScope, ActionStatus, BanType, ChatEntry, EnforcementRequest,
        ModerationAction,
    };

    fn request(ban_type: Option<BanType>, duration_minutes: Option<i64>) -> EnforcementRequest {
        EnforcementRequest {
            target_id: "42".to_string(),
            target_name: Some("Player".to_string()),
            moderator_id: "moderator".to_string(),
            moderator_name: None,
            server: None,
            scope: ActionScope::Global,
            ban_type,
            duration_minutes,
            reason: Some("spam".to_string()),
        }
    }

    #[async_std::test]
    async fn temporary_ban_computes_expiry() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(Default::default());

            let action = ModerationAction::ban(
                &db,
                &restrictions,
                request(Some(BanType::Temporary), Some(60)),
            )
            .await
            .expect("`ModerationAction`");

            let expires_at = action.expires_at.expect("expiry");
            let expected = Timestamp::now_utc() + Duration::minutes(60);
            assert!(expires_at.duration_since(expected).whole_seconds().abs() <= 1);

            match &restrictions {
                Restrictions::Reference(reference) => {
                    assert!(reference.is_restricted("42").await)
                }
                _ => unreachable!(),
            }
        });
    }

    #[async_std::test]
    async fn permanent_ban_has_no_expiry() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(Default::default());

            let action = ModerationAction::ban(
                &db,
                &restrictions,
                request(Some(BanType::Permanent), None),
            )
            .await
            .expect("`ModerationAction`");

            assert!(action.expires_at.is_none());
            assert!(matches!(action.status, ActionStatus::Succeeded));
            assert!(action.raw_response.is_some());
        });
    }

    #[async_std::test]
    async fn temporary_ban_without_duration_is_invalid() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(Default::default());

            assert!(
                ModerationAction::ban(&db, &restrictions, request(Some(BanType::Temporary), None))
                    .await
                    .is_err()
            );

            // Nothing was recorded and nothing was applied.
            let actions = db
                .fetch_moderation_actions(None, None, 10)
                .await
                .expect("ledger");
            assert!(actions.is_empty());
        });
    }

    #[async_std::test]
    async fn failed_enforcement_still_writes_a_ledger_row() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(ReferenceRestrictions::broken());

            assert!(ModerationAction::ban(
                &db,
                &restrictions,
                request(Some(BanType::Permanent), None)
            )
            .await
            .is_err());

            let actions = db
                .fetch_moderation_actions(None, None, 10)
                .await
                .expect("ledger");
            assert_eq!(actions.len(), 1);
            assert!(matches!(actions[0].status, ActionStatus::Failed));
        });
    }

    #[async_std::test]
    async fn unban_clears_the_restriction() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(Default::default());

            ModerationAction::ban(&db, &restrictions, request(Some(BanType::Permanent), None))
                .await
                .expect("`ModerationAction`");

            // Keep the two ledger ids in distinct milliseconds so the
            // newest-first order is deterministic.
            async_std::task::sleep(std::time::Duration::from_millis(2)).await;

            ModerationAction::unban(&db, &restrictions, request(None, None))
                .await
                .expect("`ModerationAction`");

            match &restrictions {
                Restrictions::Reference(reference) => {
                    assert!(!reference.is_restricted("42").await)
                }
                _ => unreachable!(),
            }

            let actions = db
                .fetch_moderation_actions(None, None, 10)
                .await
                .expect("ledger");
            assert_eq!(actions.len(), 2);
            assert!(matches!(actions[0].action, ActionKind::Unban));
            assert!(matches!(actions[1].action, ActionKind::Ban));
        });
    }

    #[async_std::test]
    async fn ban_naming_a_server_queues_a_kick_there() {
        database_test!(|db| async move {
            let restrictions = Restrictions::Reference(Default::default());

            db.append_chat(
                "S1",
                &ChatEntry::message("42".to_string(), "Player".to_string(), "hello".to_string()),
            )
            .await
            .expect("`ChatEntry`");

            let mut data = request(Some(BanType::Permanent), None);
            data.server = Some("S1".to_string());

            ModerationAction::ban(&db, &restrictions, data)
                .await
                .expect("`ModerationAction`");

            let (_, claimed) = crate::Command::claim_all(&db, "S1").await.expect("claim");
            assert_eq!(claimed.len(), 1);
            assert!(matches!(claimed[0].kind, crate::CommandKind::Kick));
            assert_eq!(claimed[0].target_id, "42");
        });
    }
}
