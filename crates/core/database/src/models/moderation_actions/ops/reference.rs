use std::cmp::Reverse;

use garrison_result::Result;

use crate::ModerationAction;
use crate::ReferenceDb;

use super::AbstractModerationActions;

#[async_trait]
impl AbstractModerationActions for ReferenceDb {
    /// Insert a new action onto the ledger
    async fn insert_moderation_action(&self, action: &ModerationAction) -> Result<()> {
        let mut moderation_actions = self.moderation_actions.lock().await;
        if moderation_actions.contains_key(&action.id) {
            Err(create_database_error!("insert", "moderation_action"))
        } else {
            moderation_actions.insert(action.id.to_string(), action.clone());
            Ok(())
        }
    }

    /// Fetch ledger entries, newest first
    async fn fetch_moderation_actions(
        &self,
        server: Option<&str>,
        before: Option<&str>,
        limit: i64,
    ) -> Result<Vec<ModerationAction>> {
        let moderation_actions = self.moderation_actions.lock().await;

        let mut actions: Vec<ModerationAction> = moderation_actions
            .values()
            .filter(|action| match server {
                Some(server) => action.server.as_deref() == Some(server),
                None => true,
            })
            .filter(|action| match before {
                Some(before) => action.id.as_str() < before,
                None => true,
            })
            .cloned()
            .collect();

        actions.sort_by_key(|action| Reverse(action.id.to_string()));
        actions.truncate(limit as usize);
        Ok(actions)
    }
}
