use garrison_database::util::reference::Reference;
use garrison_database::{AckOutcome, Command, Database};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::util::ingest::IngestKey;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataAcknowledgeCommand {
    #[validate(length(min = 1, max = 64))]
    pub command_id: String,
    /// Delivery token returned by the poll that handed the command over
    #[validate(length(min = 1, max = 64))]
    pub token: String,
    pub outcome: AckOutcome,
    /// Why the command was refused, when it was
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// # Acknowledge Command
///
/// Conclude a delivered command as executed or rejected. Idempotent for
/// repeated acknowledgments with the same outcome.
#[openapi(tag = "Commands")]
#[post("/<target>/commands/ack", data = "<data>")]
pub async fn acknowledge_command(
    db: &State<Database>,
    _ingest: IngestKey,
    target: Reference<'_>,
    data: Json<DataAcknowledgeCommand>,
) -> Result<Json<Command>> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    let command = db.fetch_command(&data.command_id).await?;
    if command.server != target.id {
        return Err(create_error!(NotFound));
    }

    Command::acknowledge(db, &data.command_id, &data.token, data.outcome, data.reason)
        .await
        .map(Json)
}
