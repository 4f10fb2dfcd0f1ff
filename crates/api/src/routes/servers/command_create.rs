use garrison_database::util::reference::Reference;
use garrison_database::{Command, CommandKind, Database};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataCreateCommand {
    pub kind: CommandKind,
    #[validate(length(min = 1, max = 64))]
    pub target_id: String,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    /// Staff member issuing the command
    #[validate(length(min = 1, max = 64))]
    pub issued_by: String,
}

/// # Queue Command
///
/// Queue a moderation command for the game server to pick up on its
/// next poll.
#[openapi(tag = "Commands")]
#[post("/<target>/commands", data = "<data>")]
pub async fn create_command(
    db: &State<Database>,
    target: Reference<'_>,
    data: Json<DataCreateCommand>,
) -> Result<Json<Command>> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    let server = target.as_server_state(db).await?;

    Command::create(
        db,
        &server,
        data.kind,
        data.target_id,
        data.reason,
        data.issued_by,
    )
    .await
    .map(Json)
}
