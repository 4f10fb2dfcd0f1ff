use bson::{to_bson, Document};
use garrison_result::Result;
use iso8601_timestamp::Timestamp;
use mongodb::options::FindOptions;

use crate::MongoDb;
use crate::{AckOutcome, Command, CommandStatus};

use super::AbstractServerCommands;

static COL: &str = "server_commands";

#[async_trait]
impl AbstractServerCommands for MongoDb {
    /// Insert a new command into the queue
    async fn insert_command(&self, command: &Command) -> Result<()> {
        query!(self, insert_one, COL, &command).map(|_| ())
    }

    /// Fetch a command by its id
    async fn fetch_command(&self, id: &str) -> Result<Command> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(UnknownCommand))
    }

    /// Atomically claim all pending commands for a server
    async fn claim_commands(
        &self,
        server: &str,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<Vec<Command>> {
        let result = self
            .col::<Document>(COL)
            .update_many(
                doc! {
                    "server": server,
                    "status": CommandStatus::Pending.to_string()
                },
                doc! {
                    "$set": {
                        "status": CommandStatus::Delivered.to_string(),
                        "delivery_token": token,
                        "delivery_expires_at": to_bson(&expires_at)
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    },
                    "$inc": {
                        "attempts": 1_i32
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
                "delivery_token": token
            },
            FindOptions::builder()
                .sort(doc! {
                    "_id": 1_i32
                })
                .build()
        )
    }

    /// Conclude a delivered command, guarded by its delivery token
    async fn acknowledge_command(
        &self,
        id: &str,
        token: &str,
        outcome: AckOutcome,
        reason: Option<String>,
    ) -> Result<Command> {
        let mut set = doc! {
            "status": match outcome {
                AckOutcome::Executed => CommandStatus::Executed.to_string(),
                AckOutcome::Rejected => CommandStatus::Rejected.to_string(),
            }
        };

        if let (AckOutcome::Rejected, Some(reason)) = (&outcome, &reason) {
            set.insert("rejection_reason", reason.as_str());
        }

        let result = self
            .col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id,
                    "status": CommandStatus::Delivered.to_string(),
                    "delivery_token": token
                },
                doc! {
                    "$set": set,
                    "$unset": {
                        "delivery_token": 1_i32,
                        "delivery_expires_at": 1_i32
                    }
                },
            )
            .await
            .map_err(|_| create_database_error!("update_one", COL))?;

        let command = self.fetch_command(id).await?;
        if result.modified_count == 1 {
            return Ok(command);
        }

        // The conditional update did not apply; work out why.
        match (command.status.clone(), outcome) {
            (CommandStatus::Executed, AckOutcome::Executed)
            | (CommandStatus::Rejected, AckOutcome::Rejected) => Ok(command),
            (CommandStatus::Executed, _) | (CommandStatus::Rejected, _) => {
                Err(create_error!(CommandConcluded))
            }
            _ => Err(create_error!(DeliveryExpired)),
        }
    }

    /// Return expired deliveries back to pending
    async fn requeue_expired_commands(&self, now: Timestamp) -> Result<u64> {
        self.col::<Document>(COL)
            .update_many(
                doc! {
                    "status": CommandStatus::Delivered.to_string(),
                    "delivery_expires_at": {
                        "$lt": to_bson(&now)
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    }
                },
                doc! {
                    "$set": {
                        "status": CommandStatus::Pending.to_string()
                    },
                    "$unset": {
                        "delivery_token": 1_i32,
                        "delivery_expires_at": 1_i32
                    }
                },
            )
            .await
            .map(|result| result.modified_count)
            .map_err(|_| create_database_error!("update_many", COL))
    }
}
