use garrison_database::util::reference::Reference;
use garrison_database::{ChatEntry, Database};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use rocket_empty::EmptyResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::util::ingest::IngestKey;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataPushChat {
    #[validate(length(min = 1, max = 64))]
    pub player_id: String,
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// # Push Chat
///
/// Ingest a chat message relayed by the game server. Creates the server
/// aggregate on first contact.
#[openapi(tag = "Ingestion")]
#[post("/<target>/chat", data = "<data>")]
pub async fn push_chat(
    db: &State<Database>,
    _ingest: IngestKey,
    target: Reference<'_>,
    data: Json<DataPushChat>,
) -> Result<EmptyResponse> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    db.append_chat(
        target.id,
        &ChatEntry::message(data.player_id, data.username, data.content),
    )
    .await
    .map(|_| EmptyResponse)
}
