use garrison_result::Result;
use iso8601_timestamp::Timestamp;

use crate::ReferenceDb;
use crate::{AckOutcome, Command, CommandStatus};

use super::AbstractServerCommands;

#[async_trait]
impl AbstractServerCommands for ReferenceDb {
    /// Insert a new command into the queue
    async fn insert_command(&self, command: &Command) -> Result<()> {
        let mut server_commands = self.server_commands.lock().await;
        if server_commands.contains_key(&command.id) {
            Err(create_database_error!("insert", "command"))
        } else {
            server_commands.insert(command.id.to_string(), command.clone());
            Ok(())
        }
    }

    /// Fetch a command by its id
    async fn fetch_command(&self, id: &str) -> Result<Command> {
        let server_commands = self.server_commands.lock().await;
        server_commands
            .get(id)
            .cloned()
            .ok_or_else(|| create_error!(UnknownCommand))
    }

    /// Atomically claim all pending commands for a server
    async fn claim_commands(
        &self,
        server: &str,
        token: &str,
        expires_at: Timestamp,
    ) -> Result<Vec<Command>> {
        let mut server_commands = self.server_commands.lock().await;

        let mut claimed: Vec<Command> = server_commands
            .values_mut()
            .filter(|command| {
                command.server == server && matches!(command.status, CommandStatus::Pending)
            })
            .map(|command| {
                command.status = CommandStatus::Delivered;
                command.delivery_token = Some(token.to_string());
                command.delivery_expires_at = Some(expires_at);
                command.attempts += 1;
                command.clone()
            })
            .collect();

        claimed.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(claimed)
    }

    /// Conclude a delivered command, guarded by its delivery token
    async fn acknowledge_command(
        &self,
        id: &str,
        token: &str,
        outcome: AckOutcome,
        reason: Option<String>,
    ) -> Result<Command> {
        let mut server_commands = self.server_commands.lock().await;
        let command = server_commands
            .get_mut(id)
            .ok_or_else(|| create_error!(UnknownCommand))?;

        let token_matches = command.delivery_token.as_deref() == Some(token);

        match (command.status.clone(), outcome) {
            (CommandStatus::Delivered, outcome) if token_matches => {
                command.status = match outcome {
                    AckOutcome::Executed => CommandStatus::Executed,
                    AckOutcome::Rejected => {
                        command.rejection_reason = reason;
                        CommandStatus::Rejected
                    }
                };

                command.delivery_token = None;
                command.delivery_expires_at = None;
                Ok(command.clone())
            }
            (CommandStatus::Executed, AckOutcome::Executed)
            | (CommandStatus::Rejected, AckOutcome::Rejected) => Ok(command.clone()),
            (CommandStatus::Executed, _) | (CommandStatus::Rejected, _) => {
                Err(create_error!(CommandConcluded))
            }
            _ => Err(create_error!(DeliveryExpired)),
        }
    }

    /// Return expired deliveries back to pending
    async fn requeue_expired_commands(&self, now: Timestamp) -> Result<u64> {
        let mut server_commands = self.server_commands.lock().await;
        let mut requeued = 0;

        for command in server_commands.values_mut() {
            if matches!(command.status, CommandStatus::Delivered)
                && command
                    .delivery_expires_at
                    .map(|expires_at| expires_at < now)
                    .unwrap_or_default()
            {
                command.status = CommandStatus::Pending;
                command.delivery_token = None;
                command.delivery_expires_at = None;
                requeued += 1;
            }
        }

        Ok(requeued)
    }
}
