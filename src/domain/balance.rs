use super::expense::ExpenseRecord;
use super::ids::ParticipantId;
use super::money::Money;
use super::settlement::SettlementInstruction;
use crate::error::{Result, SettleError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Net balance per participant.
///
/// Positive means the participant is owed money by the group, negative means
/// they owe. Entries are kept ordered by participant identifier so every
/// traversal is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BalanceMap(BTreeMap<ParticipantId, Money>);

impl BalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, participant: &ParticipantId) -> Option<Money> {
        self.0.get(participant).copied()
    }

    pub fn credit(&mut self, participant: &ParticipantId, amount: Money) {
        *self.0.entry(participant.clone()).or_default() += amount;
    }

    pub fn debit(&mut self, participant: &ParticipantId, amount: Money) {
        *self.0.entry(participant.clone()).or_default() -= amount;
    }

    /// Moves `amount` from `debtor` to `creditor`, or returns `None` without
    /// touching either balance if a result would overflow.
    fn checked_transfer(
        &mut self,
        debtor: &ParticipantId,
        creditor: &ParticipantId,
        amount: Money,
    ) -> Option<()> {
        let owed = self.get(debtor).unwrap_or_default().checked_sub(amount)?;
        let due = self.get(creditor).unwrap_or_default().checked_add(amount)?;
        self.0.insert(debtor.clone(), owed);
        self.0.insert(creditor.clone(), due);
        Some(())
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ParticipantId, Money> {
        self.0.iter()
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Zero for any map produced by [`aggregate`].
    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    /// Number of participants whose balance is not within epsilon of zero.
    pub fn count_nonzero(&self) -> usize {
        self.0.values().filter(|b| !b.is_settled()).count()
    }

    pub fn is_settled(&self) -> bool {
        self.0.values().all(Money::is_settled)
    }

    /// Applies one payment: the payer's debt shrinks, the payee's credit shrinks.
    pub fn apply(&mut self, instruction: &SettlementInstruction) {
        self.credit(&instruction.from, instruction.amount);
        self.debit(&instruction.to, instruction.amount);
    }
}

impl FromIterator<(ParticipantId, Money)> for BalanceMap {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Money)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BalanceMap {
    type Item = (ParticipantId, Money);
    type IntoIter = btree_map::IntoIter<ParticipantId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BalanceMap {
    type Item = (&'a ParticipantId, &'a Money);
    type IntoIter = btree_map::Iter<'a, ParticipantId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reduces expense records to net balances.
///
/// Every contribution moves its share, rounded to cents, from the contributor
/// to the payer, so both sides always move by the same amount and the map
/// nets to zero. Self-contributions are skipped. Totals that leave the
/// representable range are rejected.
pub fn aggregate(expenses: &[ExpenseRecord]) -> Result<BalanceMap> {
    let mut balances = BalanceMap::new();

    for expense in expenses {
        expense.validate()?;
        for contribution in &expense.contributions {
            if contribution.participant == expense.payer {
                continue;
            }
            let share = contribution.share.round_cents();
            balances
                .checked_transfer(&contribution.participant, &expense.payer, share)
                .ok_or_else(|| {
                    SettleError::ValidationError(format!(
                        "Expense {} pushes a balance out of range",
                        expense.id
                    ))
                })?;
        }
    }

    tracing::debug!(
        records = expenses.len(),
        participants = balances.len(),
        "aggregated expense balances"
    );
    Ok(balances)
}
