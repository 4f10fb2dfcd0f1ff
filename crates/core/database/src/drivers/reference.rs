use std::{collections::HashMap, sync::Arc};

use futures::lock::Mutex;

use crate::{Command, ModerationAction, OutboxMessage, ServerState};

database_derived!(
    /// Reference implementation
    #[derive(Default)]
    pub struct ReferenceDb {
        pub server_states: Arc<Mutex<HashMap<String, ServerState>>>,
        pub server_commands: Arc<Mutex<HashMap<String, Command>>>,
        pub server_outbox: Arc<Mutex<HashMap<String, OutboxMessage>>>,
        pub moderation_actions: Arc<Mutex<HashMap<String, ModerationAction>>>,
    }
);

impl ReferenceDb {
    /// Wipe all stored state, used by the test suite
    pub async fn clear(&self) {
        self.server_states.lock().await.clear();
        self.server_commands.lock().await.clear();
        self.server_outbox.lock().await.clear();
        self.moderation_actions.lock().await.clear();
    }
}
