use garrison_database::util::reference::Reference;
use garrison_database::{Database, PlayerEntry};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # Fetch Roster
///
/// Last known full roster for a server.
#[openapi(tag = "Servers")]
#[get("/<target>/players")]
pub async fn fetch_roster(
    db: &State<Database>,
    target: Reference<'_>,
) -> Result<Json<Vec<PlayerEntry>>> {
    target
        .as_server_state(db)
        .await
        .map(|state| Json(state.players))
}
