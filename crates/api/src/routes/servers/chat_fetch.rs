use garrison_database::util::reference::Reference;
use garrison_database::{ChatEntry, Database};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # Fetch Chat
///
/// Current bounded chat window for a server.
#[openapi(tag = "Servers")]
#[get("/<target>/chat")]
pub async fn fetch_chat(db: &State<Database>, target: Reference<'_>) -> Result<Json<Vec<ChatEntry>>> {
    target.as_server_state(db).await.map(|state| Json(state.chat))
}
