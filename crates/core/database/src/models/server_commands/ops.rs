use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::{AckOutcome, Command};

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractServerCommands: Sync + Send {
    /// Insert a new command into the queue
    async fn insert_command(&self, command: &Command) -> Result<()>;

    /// Fetch a command by its id
    async fn fetch_command(&self, id: &str) -> Result<Command>;

    /// Atomically transition all pending commands for a server to
    /// delivered under the given token, returning the claimed set in
    /// creation order
    async fn claim_commands(
        &self,
        server: &str,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<Vec<Command>>;

    /// Conclude a delivered command, guarded by its delivery token.
    ///
    /// Acknowledging an already concluded command with the same outcome
    /// is a no-op; a conflicting outcome or a stale token is an error.
    async fn acknowledge_command(
        &self,
        id: &str,
        token: &str,
        outcome: AckOutcome,
        reason: Option<String>,
    ) -> Result<Command>;

    /// Return delivered commands whose expiry has passed back to
    /// pending, returning how many were requeued
    async fn requeue_expired_commands(&self, now: Timestamp) -> Result<u64>;
}
