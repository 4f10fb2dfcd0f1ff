use garrison_database::{Database, ServerStateMeta};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # List Servers
///
/// Summaries of every known server aggregate, for the dashboard roster.
#[openapi(tag = "Servers")]
#[get("/")]
pub async fn list(db: &State<Database>) -> Result<Json<Vec<ServerStateMeta>>> {
    db.fetch_server_states()
        .await
        .map(|states| Json(states.iter().map(|state| state.meta()).collect()))
}
