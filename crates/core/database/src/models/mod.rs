mod moderation_actions;
mod server_commands;
mod server_outbox;
mod server_states;

pub use moderation_actions::*;
pub use server_commands::*;
pub use server_outbox::*;
pub use server_states::*;

use crate::ReferenceDb;
#[cfg(feature = "mongodb")]
use crate::MongoDb;

pub trait AbstractDatabase:
    Sync
    + Send
    + moderation_actions::AbstractModerationActions
    + server_commands::AbstractServerCommands
    + server_outbox::AbstractServerOutbox
    + server_states::AbstractServerStates
{
}

impl AbstractDatabase for ReferenceDb {}
#[cfg(feature = "mongodb")]
impl AbstractDatabase for MongoDb {}

impl std::ops::Deref for crate::Database {
    type Target = dyn AbstractDatabase;

    fn deref(&self) -> &Self::Target {
        match &self {
            crate::Database::Reference(reference) => reference,
            #[cfg(feature = "mongodb")]
            crate::Database::MongoDb(mongo) => mongo,
        }
    }
}
