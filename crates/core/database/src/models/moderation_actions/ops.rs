use garrison_result::Result;

use crate::ModerationAction;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractModerationActions: Sync + Send {
    /// Insert a new action onto the ledger
    async fn insert_moderation_action(&self, action: &ModerationAction) -> Result<()>;

    /// Fetch ledger entries, newest first, optionally scoped to one
    /// server and paginated by id cursor
    async fn fetch_moderation_actions(
        &self,
        server: Option<&str>,
        before: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ModerationAction>>;
}
