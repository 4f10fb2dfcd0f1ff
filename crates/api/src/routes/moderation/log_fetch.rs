use garrison_database::{Database, ModerationAction};
use garrison_result::Result;
use rocket::serde::json::Json;
use rocket::State;

/// # Fetch Moderation Log
///
/// Read the append-only enforcement ledger, newest first. Paginate with
/// the id of the last entry seen as `before`.
#[openapi(tag = "Moderation")]
#[get("/log?<server>&<before>&<limit>")]
pub async fn fetch_log(
    db: &State<Database>,
    server: Option<String>,
    before: Option<String>,
    limit: Option<i64>,
) -> Result<Json<Vec<ModerationAction>>> {
    let limit = limit.unwrap_or(50).clamp(1, 100);

    db.fetch_moderation_actions(server.as_deref(), before.as_deref(), limit)
        .await
        .map(Json)
}

#[cfg(test)]
mod test {
    use crate::util::test::TestHarness;
    use garrison_database::ModerationAction;
    use rocket::http::{ContentType, Header, Status};

    #[rocket::async_test]
    async fn ledger_is_paginated_newest_first() {
        let harness = TestHarness::new().await;

        // Seed an aggregate, then queue two commands; each leaves a
        // ledger row behind.
        let response = harness
            .client
            .post("/servers/S1/chat")
            .header(Header::new("x-ingest-key", TestHarness::ingest_key().await))
            .header(ContentType::JSON)
            .body(
                json!({
                    "player_id": "42",
                    "username": "Player",
                    "content": "hello"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NoContent);
        drop(response);

        for target in ["42", "43"] {
            let response = harness
                .client
                .post("/servers/S1/commands")
                .header(ContentType::JSON)
                .body(
                    json!({
                        "kind": "Kick",
                        "target_id": target,
                        "issued_by": "moderator"
                    })
                    .to_string(),
                )
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);

            // Keep the two ledger ids in distinct milliseconds so the
            // newest-first order is deterministic.
            async_std::task::sleep(std::time::Duration::from_millis(2)).await;
        }

        let response = harness
            .client
            .get("/moderation/log?server=S1&limit=1")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let page: Vec<ModerationAction> = response.into_json().await.expect("ledger page");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].target_id, "43");

        let response = harness
            .client
            .get(format!("/moderation/log?server=S1&before={}", page[0].id))
            .dispatch()
            .await;
        let rest: Vec<ModerationAction> = response.into_json().await.expect("ledger page");
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].target_id, "42");
    }
}
