use garrison_database::util::reference::Reference;
use garrison_database::{AuditEntry, Database};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # Fetch Audit Trail
///
/// Moderation and administrative events scoped to a server.
#[openapi(tag = "Servers")]
#[get("/<target>/audit")]
pub async fn fetch_audit(
    db: &State<Database>,
    target: Reference<'_>,
) -> Result<Json<Vec<AuditEntry>>> {
    target
        .as_server_state(db)
        .await
        .map(|state| Json(state.audit))
}
