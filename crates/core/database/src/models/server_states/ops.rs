use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::{AuditEntry, ChatEntry, PlayerEntry, ServerState};

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractServerStates: Sync + Send {
    /// Fetch a server aggregate by its id
    async fn fetch_server_state(&self, id: &str) -> Result<ServerState>;

    /// Fetch all known server aggregates
    async fn fetch_server_states(&self) -> Result<Vec<ServerState>>;

    /// Append a chat entry, creating the aggregate if it does not exist.
    ///
    /// The chat transcript is truncated to its sliding window in the same
    /// store operation as the append.
    async fn append_chat(&self, id: &str, entry: &ChatEntry) -> Result<()>;

    /// Replace the full roster, creating the aggregate if it does not exist
    async fn replace_roster(&self, id: &str, players: &[PlayerEntry]) -> Result<()>;

    /// Append an audit entry, creating the aggregate if it does not exist
    async fn append_audit(&self, id: &str, entry: &AuditEntry) -> Result<()>;

    /// Mark or unmark an existing aggregate as under investigation
    async fn set_flagged(&self, id: &str, flagged: bool) -> Result<()>;

    /// Delete aggregates past their retention threshold, returning how
    /// many were removed
    async fn delete_stale_server_states(
        &self,
        unflagged_before: Timestamp,
        flagged_before: Timestamp,
    ) -> Result<u64>;
}
