use garrison_database::util::reference::Reference;
use garrison_database::{Database, OutboxMessage};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

use crate::util::ingest::IngestKey;

/// # Poll Outbox
///
/// Hand any staff broadcasts addressed to this server to the game
/// client. Broadcasts are delivered at most once.
#[openapi(tag = "Commands")]
#[get("/<target>/outbox")]
pub async fn poll_outbox(
    db: &State<Database>,
    _ingest: IngestKey,
    target: Reference<'_>,
) -> Result<Json<Vec<OutboxMessage>>> {
    let server = target.as_server_state(db).await?;
    OutboxMessage::claim_all(db, &server.id).await.map(Json)
}
