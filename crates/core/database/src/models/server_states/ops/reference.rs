use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::ReferenceDb;
use crate::{AuditEntry, ChatEntry, PlayerEntry, ServerState, CHAT_WINDOW};

use super::AbstractServerStates;

#[async_trait]
impl AbstractServerStates for ReferenceDb {
    /// Fetch a server aggregate by its id
    async fn fetch_server_state(&self, id: &str) -> Result<ServerState> {
        let server_states = self.server_states.lock().await;
        server_states
            .get(id)
            .cloned()
            .ok_or_else(|| create_error!(UnknownServer))
    }

    /// Fetch all known server aggregates
    async fn fetch_server_states(&self) -> Result<Vec<ServerState>> {
        let server_states = self.server_states.lock().await;
        let mut states: Vec<ServerState> = server_states.values().cloned().collect();
        states.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(states)
    }

    /// Append a chat entry, creating the aggregate if it does not exist
    async fn append_chat(&self, id: &str, entry: &ChatEntry) -> Result<()> {
        let mut server_states = self.server_states.lock().await;
        let state = server_states
            .entry(id.to_string())
            .or_insert_with(|| ServerState::new(id.to_string()));

        state.chat.push(entry.clone());
        if state.chat.len() > CHAT_WINDOW {
            let excess = state.chat.len() - CHAT_WINDOW;
            state.chat.drain(..excess);
        }

        state.updated_at = Timestamp::now_utc();
        Ok(())
    }

    /// Replace the full roster, creating the aggregate if it does not exist
    async fn replace_roster(&self, id: &str, players: &[PlayerEntry]) -> Result<()> {
        let mut server_states = self.server_states.lock().await;
        let state = server_states
            .entry(id.to_string())
            .or_insert_with(|| ServerState::new(id.to_string()));

        state.players = players.to_vec();
        state.updated_at = Timestamp::now_utc();
        Ok(())
    }

    /// Append an audit entry, creating the aggregate if it does not exist
    async fn append_audit(&self, id: &str, entry: &AuditEntry) -> Result<()> {
        let mut server_states = self.server_states.lock().await;
        let state = server_states
            .entry(id.to_string())
            .or_insert_with(|| ServerState::new(id.to_string()));

        state.audit.push(entry.clone());
        state.updated_at = Timestamp::now_utc();
        Ok(())
    }

    /// Mark or unmark an existing aggregate as under investigation
    async fn set_flagged(&self, id: &str, flagged: bool) -> Result<()> {
        let mut server_states = self.server_states.lock().await;
        if let Some(state) = server_states.get_mut(id) {
            state.flagged = flagged;
            state.updated_at = Timestamp::now_utc();
            Ok(())
        } else {
            Err(create_error!(UnknownServer))
        }
    }

    /// Delete aggregates past their retention threshold
    async fn delete_stale_server_states(
        &self,
        unflagged_before: Timestamp,
        flagged_before: Timestamp,
    ) -> Result<u64> {
        let mut server_states = self.server_states.lock().await;
        let before = server_states.len();

        server_states.retain(|_, state| {
            let threshold = if state.flagged {
                flagged_before
            } else {
                unflagged_before
            };

            state.updated_at >= threshold
        });

        Ok((before - server_states.len()) as u64)
    }
}
