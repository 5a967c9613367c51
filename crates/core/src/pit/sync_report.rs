//! Outcome of one batch sync.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub batch_id: Uuid,
    /// Input messages handed to the batch, pit or not.
    pub messages_processed: usize,
    /// Statements sent to the store; 0 when the store was not contacted.
    pub statements_executed: usize,
    pub completed_at: String,
}

impl SyncReport {
    pub fn new(batch_id: Uuid, messages_processed: usize, statements_executed: usize) -> Self {
        Self {
            batch_id,
            messages_processed,
            statements_executed,
            completed_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn touched_store(&self) -> bool {
        self.statements_executed > 0
    }
}
