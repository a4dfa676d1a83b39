use super::expense::ExpenseRecord;
use super::ids::ParticipantId;
use super::money::Money;
use crate::error::{Result, SettleError};
use serde::Serialize;
use std::collections::HashMap;

/// How much a participant spent in a trip, and how much of it on themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    pub participant: ParticipantId,
    pub total_spent: Money,
    pub total_spent_on_self: Money,
}

impl SpendingSummary {
    fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            total_spent: Money::ZERO,
            total_spent_on_self: Money::ZERO,
        }
    }
}

/// Per-participant spending totals, listed in order of first appearance.
///
/// The payer is charged the full amount; each contributor is charged their
/// share both as spending and as self-spending. Whatever the contributions
/// leave over counts as the payer's self-spending; an over-allocated expense
/// leaves the payer's self-spending unchanged.
pub fn summarize(expenses: &[ExpenseRecord]) -> Result<Vec<SpendingSummary>> {
    let mut summaries: Vec<SpendingSummary> = Vec::new();
    let mut index: HashMap<ParticipantId, usize> = HashMap::new();

    let mut slot = |participant: &ParticipantId, summaries: &mut Vec<SpendingSummary>| -> usize {
        *index.entry(participant.clone()).or_insert_with(|| {
            summaries.push(SpendingSummary::new(participant.clone()));
            summaries.len() - 1
        })
    };

    for expense in expenses {
        expense.validate()?;

        let out_of_range = || {
            SettleError::ValidationError(format!(
                "Expense {} pushes a spending total out of range",
                expense.id
            ))
        };

        let payer = slot(&expense.payer, &mut summaries);
        add_to(&mut summaries[payer].total_spent, expense.amount).ok_or_else(out_of_range)?;

        if expense.contributions.is_empty() {
            add_to(&mut summaries[payer].total_spent_on_self, expense.amount)
                .ok_or_else(out_of_range)?;
            continue;
        }

        for contribution in &expense.contributions {
            let contributor = slot(&contribution.participant, &mut summaries);
            let summary = &mut summaries[contributor];
            add_to(&mut summary.total_spent, contribution.share).ok_or_else(out_of_range)?;
            add_to(&mut summary.total_spent_on_self, contribution.share)
                .ok_or_else(out_of_range)?;
        }

        // Over-allocation can only make the remainder smaller, so an
        // overflowing contribution sum leaves nothing for the payer.
        if let Some(remainder) = expense
            .contributed()
            .and_then(|contributed| expense.amount.checked_sub(contributed))
            && remainder.is_positive()
        {
            add_to(&mut summaries[payer].total_spent_on_self, remainder)
                .ok_or_else(out_of_range)?;
        }
    }

    Ok(summaries)
}

fn add_to(total: &mut Money, amount: Money) -> Option<()> {
    *total = total.checked_add(amount)?;
    Some(())
}
