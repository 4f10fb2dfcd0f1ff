use garrison_database::util::reference::Reference;
use garrison_database::{Database, PlayerEntry};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use rocket_empty::EmptyResponse;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::util::ingest::IngestKey;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataReplaceRoster {
    /// Complete live roster; this is a full replacement, not a diff
    #[validate(length(max = 500))]
    pub players: Vec<PlayerEntry>,
}

/// # Replace Roster
///
/// Ingest the full player roster for a server. The previous roster is
/// discarded wholesale.
#[openapi(tag = "Ingestion")]
#[post("/<target>/players", data = "<data>")]
pub async fn replace_roster(
    db: &State<Database>,
    _ingest: IngestKey,
    target: Reference<'_>,
    data: Json<DataReplaceRoster>,
) -> Result<EmptyResponse> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    db.replace_roster(target.id, &data.players)
        .await
        .map(|_| EmptyResponse)
}

#[cfg(test)]
mod test {
    use crate::util::test::TestHarness;
    use garrison_database::PlayerEntry;
    use rocket::http::{ContentType, Header, Status};

    #[rocket::async_test]
    async fn success_roster_is_replaced_wholesale() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/servers/S1/players")
            .header(Header::new("x-ingest-key", TestHarness::ingest_key().await))
            .header(ContentType::JSON)
            .body(
                json!({
                    "players": [
                        { "id": "1", "username": "one", "team": "red" },
                        { "id": "2", "username": "two" }
                    ]
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NoContent);
        drop(response);

        let response = harness
            .client
            .post("/servers/S1/players")
            .header(Header::new("x-ingest-key", TestHarness::ingest_key().await))
            .header(ContentType::JSON)
            .body(
                json!({
                    "players": [
                        { "id": "2", "username": "two", "left": true }
                    ]
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NoContent);
        drop(response);

        let response = harness.client.get("/servers/S1/players").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let roster: Vec<PlayerEntry> = response.into_json().await.expect("`PlayerEntry` array");
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, "2");
        assert!(roster[0].left);
    }

    #[rocket::async_test]
    async fn fail_without_ingest_key() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/servers/S1/players")
            .header(ContentType::JSON)
            .body(json!({ "players": [] }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Forbidden);
    }
}
