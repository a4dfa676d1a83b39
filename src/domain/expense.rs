use super::ids::{ParticipantId, TripId};
use super::money::Money;
use crate::error::{Result, SettleError};
use serde::{Deserialize, Serialize};

/// The part of an expense consumed by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub participant: ParticipantId,
    pub share: Money,
}

impl Contribution {
    pub fn new(participant: impl Into<ParticipantId>, share: Money) -> Self {
        Self {
            participant: participant.into(),
            share,
        }
    }
}

/// A single shared expense: who paid, how much, and who consumed what.
///
/// Contributions need not add up to `amount`; whatever is left over is the
/// payer's own consumption and never shows up in balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub trip: TripId,
    pub payer: ParticipantId,
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl ExpenseRecord {
    pub fn new(
        id: impl Into<String>,
        trip: impl Into<TripId>,
        payer: impl Into<ParticipantId>,
        amount: Money,
    ) -> Self {
        Self {
            id: id.into(),
            trip: trip.into(),
            payer: payer.into(),
            amount,
            description: String::new(),
            contributions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_contribution(mut self, participant: impl Into<ParticipantId>, share: Money) -> Self {
        self.contributions.push(Contribution::new(participant, share));
        self
    }

    /// Sum of all contribution shares, including the payer's own entry if any.
    ///
    /// `None` if the sum overflows.
    pub fn contributed(&self) -> Option<Money> {
        self.contributions
            .iter()
            .try_fold(Money::ZERO, |sum, c| sum.checked_add(c.share))
    }

    /// Rejects records that would otherwise corrupt balances.
    pub fn validate(&self) -> Result<()> {
        if self.payer.is_blank() {
            return Err(SettleError::ValidationError(format!(
                "Expense {} has no payer",
                self.id
            )));
        }
        if self.amount.is_negative() {
            return Err(SettleError::ValidationError(format!(
                "Expense {} has a negative amount ({})",
                self.id, self.amount
            )));
        }
        for contribution in &self.contributions {
            if contribution.participant.is_blank() {
                return Err(SettleError::ValidationError(format!(
                    "Expense {} has a contribution without a participant",
                    self.id
                )));
            }
            if contribution.share.is_negative() {
                return Err(SettleError::ValidationError(format!(
                    "Expense {} has a negative share ({}) for {}",
                    self.id, contribution.share, contribution.participant
                )));
            }
        }
        Ok(())
    }
}
