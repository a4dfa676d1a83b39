use crate::domain::balance::BalanceMap;
use crate::domain::ids::{ParticipantId, TripId};
use crate::domain::money::Money;
use crate::domain::ports::{ExpenseStoreRef, ParticipantDirectoryRef};
use crate::domain::settlement::Settlement;
use crate::domain::summary::summarize;
use crate::error::{Result, SettleError};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tokio::task::JoinSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedBalance {
    pub participant: String,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSettlement {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSpending {
    pub participant: String,
    pub total_spent: Money,
    pub total_spent_on_self: Money,
}

/// Balances and settlement payments of a trip, with display names filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub trip: TripId,
    pub balances: Vec<NamedBalance>,
    pub settlements: Vec<NamedSettlement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingReport {
    pub trip: TripId,
    pub participants: Vec<NamedSpending>,
}

/// Builds trip reports on top of the settlement domain.
///
/// Fetches the trip's expense records from the store, runs the pure
/// computations and swaps identifiers for display names. Name lookups run
/// concurrently, one task per distinct participant.
pub struct TripReportService {
    expenses: ExpenseStoreRef,
    directory: ParticipantDirectoryRef,
}

impl TripReportService {
    pub fn new(expenses: ExpenseStoreRef, directory: ParticipantDirectoryRef) -> Self {
        Self {
            expenses,
            directory,
        }
    }

    /// Computes the raw settlement of a trip, without name resolution.
    pub async fn settle(&self, trip: &TripId) -> Result<Settlement> {
        let records = self.expenses.list_by_trip(trip).await?;
        Settlement::compute(trip, &records)
    }

    pub async fn settlement_report(&self, trip: &TripId) -> Result<SettlementReport> {
        let settlement = self.settle(trip).await?;
        // Every instruction endpoint is a balance key, so this covers both lists.
        let names = self.resolve_names(settlement.balances.participants()).await;

        Ok(SettlementReport {
            trip: trip.clone(),
            balances: named_balances(&settlement.balances, &names),
            settlements: settlement
                .instructions
                .iter()
                .map(|i| NamedSettlement {
                    from: display(&names, &i.from),
                    to: display(&names, &i.to),
                    amount: i.amount,
                })
                .collect(),
        })
    }

    pub async fn spending_report(&self, trip: &TripId) -> Result<SpendingReport> {
        let records = self.expenses.list_by_trip(trip).await?;
        if records.is_empty() {
            return Err(SettleError::NoExpenses { trip: trip.clone() });
        }
        let summaries = summarize(&records)?;
        let names = self
            .resolve_names(summaries.iter().map(|s| &s.participant))
            .await;

        Ok(SpendingReport {
            trip: trip.clone(),
            participants: summaries
                .into_iter()
                .map(|s| NamedSpending {
                    participant: display(&names, &s.participant),
                    total_spent: s.total_spent,
                    total_spent_on_self: s.total_spent_on_self,
                })
                .collect(),
        })
    }

    async fn resolve_names<'a>(
        &self,
        participants: impl Iterator<Item = &'a ParticipantId>,
    ) -> HashMap<ParticipantId, String> {
        let unique: BTreeSet<&ParticipantId> = participants.collect();

        let mut lookups = JoinSet::new();
        for participant in unique {
            let directory = self.directory.clone();
            let participant = participant.clone();
            lookups.spawn(async move {
                let name = directory.display_name(&participant).await;
                (participant, name)
            });
        }

        let mut names = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((participant, Ok(Some(name)))) => {
                    names.insert(participant, name);
                }
                Ok((_, Ok(None))) => {}
                Ok((participant, Err(e))) => {
                    tracing::warn!(%participant, error = %e, "participant lookup failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "participant lookup task failed");
                }
            }
        }
        names
    }
}

fn display(names: &HashMap<ParticipantId, String>, participant: &ParticipantId) -> String {
    names
        .get(participant)
        .cloned()
        .unwrap_or_else(|| format!("User Not Found ({participant})"))
}

fn named_balances(
    balances: &BalanceMap,
    names: &HashMap<ParticipantId, String>,
) -> Vec<NamedBalance> {
    balances
        .iter()
        .map(|(participant, balance)| NamedBalance {
            participant: display(names, participant),
            balance: *balance,
        })
        .collect()
}
