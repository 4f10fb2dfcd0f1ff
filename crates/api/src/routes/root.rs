use rocket::serde::json::Json;
use schemars::JsonSchema;
use serde::Serialize;

/// Capture crate version from Cargo
static CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Successful root response
#[derive(Serialize, Debug, JsonSchema)]
pub struct RootResponse {
    garrison: &'static str,
    version: &'static str,
}

/// # Service Information
///
/// Echo response confirming the service is up.
#[openapi(tag = "Core")]
#[get("/")]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        garrison: "Companion backend for the game server fleet.",
        version: CRATE_VERSION,
    })
}
