use garrison_database::util::reference::Reference;
use garrison_database::{AuditEntry, Database};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use rocket_empty::EmptyResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataFlagServer {
    /// Whether the server is under investigation
    pub flagged: bool,
    /// Staff member making the change
    #[validate(length(min = 1, max = 64))]
    pub actor: String,
}

/// # Flag Server
///
/// Mark or unmark a server as under investigation, which extends its
/// retention lifetime.
#[openapi(tag = "Servers")]
#[post("/<target>/flag", data = "<data>")]
pub async fn flag(
    db: &State<Database>,
    target: Reference<'_>,
    data: Json<DataFlagServer>,
) -> Result<EmptyResponse> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    db.set_flagged(target.id, data.flagged).await?;

    db.append_audit(
        target.id,
        &AuditEntry::new(
            data.actor,
            if data.flagged {
                "Flagged for investigation".to_string()
            } else {
                "Cleared investigation flag".to_string()
            },
        ),
    )
    .await
    .map(|_| EmptyResponse)
}
