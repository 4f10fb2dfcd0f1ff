//! Background task management

use crate::Database;

use async_std::task;

pub mod requeue;
pub mod retention;

/// Spawn background workers
pub fn start_workers(db: Database) {
    task::spawn(retention::worker(db.clone()));
    task::spawn(requeue::worker(db));
}
