use crate::domain::expense::{Contribution, ExpenseRecord};
use crate::domain::ids::{ParticipantId, TripId};
use crate::domain::money::Money;
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// One CSV line: a single contribution of an expense.
///
/// Rows with the same `(trip, expense)` pair belong to the same record. A row
/// with neither `participant` nor `share` declares an expense without
/// contributions.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ExpenseRow {
    pub trip: TripId,
    pub expense: String,
    pub payer: ParticipantId,
    pub amount: Decimal,
    pub participant: Option<ParticipantId>,
    pub share: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reads expense records from a CSV source.
///
/// Header: `trip,expense,payer,amount,participant,share[,description]`.
pub struct ExpenseReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ExpenseReader<R> {
    /// Creates a new `ExpenseReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the raw rows.
    pub fn rows(self) -> impl Iterator<Item = Result<ExpenseRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(SettleError::from))
    }

    /// Reads every row and folds them into expense records, in first-seen order.
    ///
    /// Fails on the first malformed row.
    pub fn expenses(self) -> Result<Vec<ExpenseRecord>> {
        let mut records: Vec<ExpenseRecord> = Vec::new();
        let mut index: HashMap<(TripId, String), usize> = HashMap::new();

        for row in self.rows() {
            let row = row?;
            let key = (row.trip.clone(), row.expense.clone());
            let amount = Money::new(row.amount);

            let position = match index.get(&key).copied() {
                Some(position) => {
                    let record = &records[position];
                    if record.payer != row.payer || record.amount != amount {
                        return Err(SettleError::ValidationError(format!(
                            "Expense {} in trip {} has conflicting payer or amount",
                            row.expense, row.trip
                        )));
                    }
                    position
                }
                None => {
                    let mut record =
                        ExpenseRecord::new(row.expense.clone(), row.trip.clone(), row.payer, amount);
                    if let Some(description) = row.description.as_deref() {
                        record = record.with_description(description);
                    }
                    records.push(record);
                    index.insert(key, records.len() - 1);
                    records.len() - 1
                }
            };

            match (row.participant, row.share) {
                (Some(participant), Some(share)) => {
                    records[position].contributions.push(Contribution {
                        participant,
                        share: Money::new(share),
                    });
                }
                (None, None) => {}
                _ => {
                    return Err(SettleError::ValidationError(format!(
                        "Expense {} in trip {} has a contribution missing its participant or share",
                        row.expense, row.trip
                    )));
                }
            }
        }

        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }
}
