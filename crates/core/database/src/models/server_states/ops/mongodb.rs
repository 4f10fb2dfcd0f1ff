use bson::{to_bson, to_document, Document};
use garrison_result::Result;
use iso8601_timestamp::Timestamp;
use mongodb::options::{FindOptions, UpdateOptions};

use crate::MongoDb;
use crate::{AuditEntry, ChatEntry, PlayerEntry, ServerState, CHAT_WINDOW};

use super::AbstractServerStates;

static COL: &str = "server_states";

fn upsert() -> UpdateOptions {
    UpdateOptions::builder().upsert(true).build()
}

#[async_trait]
impl AbstractServerStates for MongoDb {
    /// Fetch a server aggregate by its id
    async fn fetch_server_state(&self, id: &str) -> Result<ServerState> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(UnknownServer))
    }

    /// Fetch all known server aggregates
    async fn fetch_server_states(&self) -> Result<Vec<ServerState>> {
        query!(
            self,
            find_with_options,
            COL,
            doc! {},
            FindOptions::builder()
                .sort(doc! {
                    "_id": 1_i32
                })
                .build()
        )
    }

    /// Append a chat entry, creating the aggregate if it does not exist
    async fn append_chat(&self, id: &str, entry: &ChatEntry) -> Result<()> {
        let entry = to_document(entry).map_err(|_| create_database_error!("to_document", COL))?;

        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$push": {
                        "chat": {
                            "$each": [entry],
                            "$slice": -(CHAT_WINDOW as i64)
                        }
                    },
                    "$set": {
                        "updated_at": to_bson(&Timestamp::now_utc())
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    },
                    "$setOnInsert": {
                        "players": [],
                        "audit": [],
                        "flagged": false
                    }
                },
            )
            .with_options(upsert())
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Replace the full roster, creating the aggregate if it does not exist
    async fn replace_roster(&self, id: &str, players: &[PlayerEntry]) -> Result<()> {
        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$set": {
                        "players": to_bson(players)
                            .map_err(|_| create_database_error!("to_bson", COL))?,
                        "updated_at": to_bson(&Timestamp::now_utc())
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    },
                    "$setOnInsert": {
                        "chat": [],
                        "audit": [],
                        "flagged": false
                    }
                },
            )
            .with_options(upsert())
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Append an audit entry, creating the aggregate if it does not exist
    async fn append_audit(&self, id: &str, entry: &AuditEntry) -> Result<()> {
        let entry = to_document(entry).map_err(|_| create_database_error!("to_document", COL))?;

        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$push": {
                        "audit": entry
                    },
                    "$set": {
                        "updated_at": to_bson(&Timestamp::now_utc())
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    },
                    "$setOnInsert": {
                        "players": [],
                        "chat": [],
                        "flagged": false
                    }
                },
            )
            .with_options(upsert())
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Mark or unmark an existing aggregate as under investigation
    async fn set_flagged(&self, id: &str, flagged: bool) -> Result<()> {
        let result = self
            .col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$set": {
                        "flagged": flagged,
                        "updated_at": to_bson(&Timestamp::now_utc())
                            .map_err(|_| create_database_error!("to_bson", COL))?
                    }
                },
            )
            .await
            .map_err(|_| create_database_error!("update_one", COL))?;

        if result.matched_count == 0 {
            Err(create_error!(UnknownServer))
        } else {
            Ok(())
        }
    }

    /// Delete aggregates past their retention threshold
    async fn delete_stale_server_states(
        &self,
        unflagged_before: Timestamp,
        flagged_before: Timestamp,
    ) -> Result<u64> {
        self.col::<Document>(COL)
            .delete_many(doc! {
                "$or": [
                    {
                        "flagged": { "$ne": true },
                        "updated_at": {
                            "$lt": to_bson(&unflagged_before)
                                .map_err(|_| create_database_error!("to_bson", COL))?
                        }
                    },
                    {
                        "flagged": true,
                        "updated_at": {
                            "$lt": to_bson(&flagged_before)
                                .map_err(|_| create_database_error!("to_bson", COL))?
                        }
                    }
                ]
            })
            .await
            .map(|result| result.deleted_count)
            .map_err(|_| create_database_error!("delete_many", COL))
    }
}
