use crate::domain::expense::ExpenseRecord;
use crate::domain::ids::{ParticipantId, TripId};
use crate::domain::ports::{ExpenseStore, ParticipantDirectory};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store of expense records, grouped by trip.
///
/// Records keep their insertion order within a trip.
#[derive(Default, Clone)]
pub struct InMemoryExpenseStore {
    expenses: Arc<RwLock<HashMap<TripId, Vec<ExpenseRecord>>>>,
}

impl InMemoryExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips that currently hold at least one record, sorted.
    pub async fn trips(&self) -> Vec<TripId> {
        let expenses = self.expenses.read().await;
        let mut trips: Vec<TripId> = expenses.keys().cloned().collect();
        trips.sort();
        trips
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn store(&self, expense: ExpenseRecord) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        let records = expenses.entry(expense.trip.clone()).or_default();
        match records.iter_mut().find(|r| r.id == expense.id) {
            Some(existing) => *existing = expense,
            None => records.push(expense),
        }
        Ok(())
    }

    async fn list_by_trip(&self, trip: &TripId) -> Result<Vec<ExpenseRecord>> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(trip).cloned().unwrap_or_default())
    }
}

/// A thread-safe in-memory participant directory.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    names: Arc<RwLock<HashMap<ParticipantId, String>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, participant: ParticipantId, name: impl Into<String>) {
        let mut names = self.names.write().await;
        names.insert(participant, name.into());
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryDirectory {
    async fn display_name(&self, participant: &ParticipantId) -> Result<Option<String>> {
        let names = self.names.read().await;
        Ok(names.get(participant).cloned())
    }
}
