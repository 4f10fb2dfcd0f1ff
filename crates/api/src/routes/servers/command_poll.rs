use garrison_database::util::reference::Reference;
use garrison_database::{Command, Database};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::util::ingest::IngestKey;

/// One delivery of pending commands
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct CommandDelivery {
    /// Token the game server must echo back when acknowledging
    pub token: String,
    pub commands: Vec<Command>,
}

/// # Poll Commands
///
/// Atomically claim every pending command for this server. Claimed
/// commands must be acknowledged before the delivery expires or they
/// return to the queue.
#[openapi(tag = "Commands")]
#[get("/<target>/commands")]
pub async fn poll_commands(
    db: &State<Database>,
    _ingest: IngestKey,
    target: Reference<'_>,
) -> Result<Json<CommandDelivery>> {
    let server = target.as_server_state(db).await?;
    let (token, commands) = Command::claim_all(db, &server.id).await?;

    Ok(Json(CommandDelivery { token, commands }))
}
