use garrison_database::platform::Restrictions;
use garrison_database::{ActionScope, Database, EnforcementRequest, ModerationAction};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataRemoveBan {
    #[validate(length(min = 1, max = 64))]
    pub target_id: String,
    #[validate(length(max = 64))]
    pub target_name: Option<String>,
    pub scope: ActionScope,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub moderator_id: String,
    #[validate(length(max = 64))]
    pub moderator_name: Option<String>,
    #[validate(length(max = 64))]
    pub server: Option<String>,
}

/// # Unban Player
///
/// Clear a restriction with the platform authority and record the
/// reversal on the enforcement ledger.
#[openapi(tag = "Moderation")]
#[post("/unban", data = "<data>")]
pub async fn unban(
    db: &State<Database>,
    restrictions: &State<Restrictions>,
    data: Json<DataRemoveBan>,
) -> Result<Json<ModerationAction>> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    ModerationAction::unban(
        db,
        restrictions,
        EnforcementRequest {
            target_id: data.target_id,
            target_name: data.target_name,
            moderator_id: data.moderator_id,
            moderator_name: data.moderator_name,
            server: data.server,
            scope: data.scope,
            ban_type: None,
            duration_minutes: None,
            reason: data.reason,
        },
    )
    .await
    .map(Json)
}
