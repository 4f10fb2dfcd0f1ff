use garrison_database::platform::Restrictions;
use garrison_database::{ActionScope, BanType, Database, EnforcementRequest, ModerationAction};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataCreateBan {
    #[validate(length(min = 1, max = 64))]
    pub target_id: String,
    #[validate(length(max = 64))]
    pub target_name: Option<String>,
    pub scope: ActionScope,
    pub ban_type: Option<BanType>,
    /// Required for temporary bans
    #[validate(range(min = 1))]
    pub duration_minutes: Option<i64>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub moderator_id: String,
    #[validate(length(max = 64))]
    pub moderator_name: Option<String>,
    /// Originating server; a ban naming one also queues a kick there
    #[validate(length(max = 64))]
    pub server: Option<String>,
}

/// # Ban Player
///
/// Apply a ban against the platform restriction authority and record it
/// on the enforcement ledger. The ledger row is written even when the
/// authority refuses the call.
#[openapi(tag = "Moderation")]
#[post("/ban", data = "<data>")]
pub async fn ban(
    db: &State<Database>,
    restrictions: &State<Restrictions>,
    data: Json<DataCreateBan>,
) -> Result<Json<ModerationAction>> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    ModerationAction::ban(
        db,
        restrictions,
        EnforcementRequest {
            target_id: data.target_id,
            target_name: data.target_name,
            moderator_id: data.moderator_id,
            moderator_name: data.moderator_name,
            server: data.server,
            scope: data.scope,
            ban_type: data.ban_type,
            duration_minutes: data.duration_minutes,
            reason: data.reason,
        },
    )
    .await
    .map(Json)
}

#[cfg(test)]
mod test {
    use crate::util::test::TestHarness;
    use garrison_database::platform::Restrictions;
    use garrison_database::{ActionStatus, ModerationAction};
    use iso8601_timestamp::{Duration, Timestamp};
    use rocket::http::{ContentType, Status};

    #[rocket::async_test]
    async fn success_temporary_ban() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/moderation/ban")
            .header(ContentType::JSON)
            .body(
                json!({
                    "target_id": "42",
                    "target_name": "Player",
                    "scope": "Global",
                    "ban_type": "Temporary",
                    "duration_minutes": 60,
                    "reason": "spam",
                    "moderator_id": "moderator"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let action: ModerationAction = response.into_json().await.expect("`ModerationAction`");
        assert!(matches!(action.status, ActionStatus::Succeeded));

        let expires_at = action.expires_at.expect("expiry");
        let expected = Timestamp::now_utc() + Duration::minutes(60);
        assert!(expires_at.duration_since(expected).whole_seconds().abs() <= 1);

        // The restriction authority applied it.
        match harness
            .client
            .rocket()
            .state::<Restrictions>()
            .expect("restrictions")
        {
            Restrictions::Reference(reference) => {
                assert!(reference.is_restricted("42").await)
            }
            _ => unreachable!(),
        }
    }

    #[rocket::async_test]
    async fn success_permanent_ban_has_no_expiry() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/moderation/ban")
            .header(ContentType::JSON)
            .body(
                json!({
                    "target_id": "42",
                    "scope": "Global",
                    "ban_type": "Permanent",
                    "moderator_id": "moderator"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let action: ModerationAction = response.into_json().await.expect("`ModerationAction`");
        assert!(action.expires_at.is_none());
    }

    #[rocket::async_test]
    async fn fail_temporary_ban_without_duration() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/moderation/ban")
            .header(ContentType::JSON)
            .body(
                json!({
                    "target_id": "42",
                    "scope": "Global",
                    "ban_type": "Temporary",
                    "moderator_id": "moderator"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }
}
