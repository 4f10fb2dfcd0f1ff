use garrison_result::Result;
use mongodb::options::FindOptions;

use crate::ModerationAction;
use crate::MongoDb;

use super::AbstractModerationActions;

static COL: &str = "moderation_actions";

#[async_trait]
impl AbstractModerationActions for MongoDb {
    /// Insert a new action onto the ledger
    async fn insert_moderation_action(&self, action: &ModerationAction) -> Result<()> {
        query!(self, insert_one, COL, &action).map(|_| ())
    }

    /// Fetch ledger entries, newest first
    async fn fetch_moderation_actions(
        &self,
        server: Option<&str>,
        before: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ModerationAction>> {
        let mut filter = doc! {};

        if let Some(server) = server {
            filter.insert("server", server);
        }

        if let Some(before) = before {
            filter.insert(
                "_id",
                doc! {
                    "$lt": before
                },
            );
        }

        query!(
            self,
            find_with_options,
            COL,
            filter,
            FindOptions::builder()
                .limit(limit)
                .sort(doc! {
                    "_id": -1_i32
                })
                .build()
        )
    }
}
