use garrison_database::util::reference::Reference;
use garrison_database::{Database, OutboxMessage};
use garrison_result::{create_error, Result};
use rocket::serde::json::Json;
use rocket::State;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Validate, Serialize, Deserialize, JsonSchema)]
pub struct DataPostNotification {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    /// Staff member posting the broadcast
    #[validate(length(min = 1, max = 64))]
    pub author: String,
}

/// # Post Notification
///
/// Staff broadcast to a server: fans out to the chat transcript, the
/// audit trail and the outbox the game server polls.
#[openapi(tag = "Servers")]
#[post("/<target>/post", data = "<data>")]
pub async fn post_notification(
    db: &State<Database>,
    target: Reference<'_>,
    data: Json<DataPostNotification>,
) -> Result<Json<OutboxMessage>> {
    let data = data.into_inner();
    data.validate().map_err(|error| {
        create_error!(FailedValidation {
            error: error.to_string()
        })
    })?;

    let server = target.as_server_state(db).await?;

    OutboxMessage::broadcast(db, &server, data.content, data.author)
        .await
        .map(Json)
}

#[cfg(test)]
mod test {
    use crate::util::test::TestHarness;
    use garrison_database::{AuditEntry, ChatEntry, ChatKind, OutboxMessage};
    use rocket::http::{ContentType, Header, Status};

    #[rocket::async_test]
    async fn broadcast_fans_out_and_is_polled_once() {
        let harness = TestHarness::new().await;

        // Seed the aggregate through ingestion.
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

        let response = harness
            .client
            .post("/servers/S1/post")
            .header(ContentType::JSON)
            .body(
                json!({
                    "content": "Maintenance in five minutes",
                    "author": "operator"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        drop(response);

        // The broadcast landed on the transcript and the audit trail.
        let response = harness.client.get("/servers/S1/chat").dispatch().await;
        let chat: Vec<ChatEntry> = response.into_json().await.expect("`ChatEntry` array");
        assert_eq!(chat.last().expect("entry").kind, ChatKind::Notification);

        let response = harness.client.get("/servers/S1/audit").dispatch().await;
        let audit: Vec<AuditEntry> = response.into_json().await.expect("`AuditEntry` array");
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].actor, "operator");

        // The game client picks it up exactly once.
        let response = harness
            .client
            .get("/servers/S1/outbox")
            .header(Header::new("x-ingest-key", TestHarness::ingest_key().await))
            .dispatch()
            .await;
        let messages: Vec<OutboxMessage> =
            response.into_json().await.expect("`OutboxMessage` array");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Maintenance in five minutes");

        let response = harness
            .client
            .get("/servers/S1/outbox")
            .header(Header::new("x-ingest-key", TestHarness::ingest_key().await))
            .dispatch()
            .await;
        let empty: Vec<OutboxMessage> = response.into_json().await.expect("`OutboxMessage` array");
        assert!(empty.is_empty());
    }

    #[rocket::async_test]
    async fn fail_broadcast_to_unknown_server() {
        let harness = TestHarness::new().await;

        let response = harness
            .client
            .post("/servers/missing/post")
            .header(ContentType::JSON)
            .body(json!({ "content": "hello", "author": "operator" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::NotFound);
    }
}
