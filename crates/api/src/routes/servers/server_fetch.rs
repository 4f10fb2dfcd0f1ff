use garrison_database::util::reference::Reference;
use garrison_database::{Database, ServerStateMeta};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # Fetch Server
///
/// Summary of one server aggregate.
#[openapi(tag = "Servers")]
#[get("/<target>")]
pub async fn fetch(db: &State<Database>, target: Reference<'_>) -> Result<Json<ServerStateMeta>> {
    target
        .as_server_state(db)
        .await
        .map(|state| Json(state.meta()))
}
