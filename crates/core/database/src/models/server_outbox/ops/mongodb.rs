use bson::Document;
use garrison_result::Result;
use mongodb::options::FindOptions;

use crate::MongoDb;
use crate::OutboxMessage;

use super::AbstractServerOutbox;

static COL: &str = "server_outbox";

#[async_trait]
impl AbstractServerOutbox for MongoDb {
    /// Insert a new outbox broadcast
    async fn insert_outbox_message(&self, message: &OutboxMessage) -> Result<()> {
        query!(self, insert_one, COL, &message).map(|_| ())
    }

    /// Atomically claim all undelivered broadcasts for a server
    async fn claim_outbox_messages(
        &self,
        server: &str,
        token: &str,
    ) -> Result<Vec<OutboxMessage>> {
        let result = self
            .col::<Document>(COL)
            .update_many(
                doc! {
                    "server": server,
                    "delivered": { "$ne": true }
                },
                doc! {
                    "$set": {
                        "delivered": true,
                        "claim_token": token
                    }
                },
            )
            .await
            .map_err(|_| create_database_error!("update_many", COL))?;

        if result.modified_count == 0 {
            return Ok(vec![]);
        }

        query!(
            self,
            find_with_options,
            COL,
            doc! {
                "server": server,
                "claim_token": token
            },
            FindOptions::builder()
                .sort(doc! {
                    "_id": 1_i32
                })
                .build()
        )
    }
}
