use super::expense::ExpenseRecord;
use super::ids::{ParticipantId, TripId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn store(&self, expense: ExpenseRecord) -> Result<()>;
    async fn list_by_trip(&self, trip: &TripId) -> Result<Vec<ExpenseRecord>>;
}

/// Resolves participant identifiers to human-readable names.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn display_name(&self, participant: &ParticipantId) -> Result<Option<String>>;
}

pub type ExpenseStoreRef = Arc<dyn ExpenseStore>;
pub type ParticipantDirectoryRef = Arc<dyn ParticipantDirectory>;
