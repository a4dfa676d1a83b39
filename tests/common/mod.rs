#![allow(dead_code)]

use rand::Rng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use tripsplit::domain::expense::ExpenseRecord;
use tripsplit::domain::money::Money;

pub const HEADER: [&str; 7] = [
    "trip",
    "expense",
    "payer",
    "amount",
    "participant",
    "share",
    "description",
];

/// Writes `rows` expenses for one trip, each split evenly between its payer
/// and the next participant in the rotation.
pub fn generate_csv(path: &Path, trip: &str, participants: usize, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(HEADER)?;

    for i in 0..rows {
        let payer = format!("p{}", i % participants);
        let other = format!("p{}", (i + 1) % participants);
        let expense = format!("e{i}");
        wtr.write_record([trip, &expense, &payer, "10.00", &other, "5.00", "generated"])?;
        wtr.write_record([trip, &expense, &payer, "10.00", &payer, "5.00", "generated"])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Random cent-precision expense records over `participants` members.
pub fn random_expenses(rng: &mut StdRng, participants: usize, count: usize) -> Vec<ExpenseRecord> {
    (0..count)
        .map(|i| {
            let payer = format!("p{}", rng.gen_range(0..participants));
            let mut record = ExpenseRecord::new(
                format!("e{i}"),
                "trip",
                payer.as_str(),
                Money::new(Decimal::new(rng.gen_range(0..100_000), 2)),
            );
            for _ in 0..rng.gen_range(0..=participants) {
                let participant = format!("p{}", rng.gen_range(0..participants));
                let share = Money::new(Decimal::new(rng.gen_range(0..50_000), 2));
                record = record.with_contribution(participant.as_str(), share);
            }
            record
        })
        .collect()
}

/// Like [`random_expenses`], but shares carry a tenth of a cent so that
/// rounding happens on every contribution.
pub fn random_sub_cent_expenses(
    rng: &mut StdRng,
    participants: usize,
    count: usize,
) -> Vec<ExpenseRecord> {
    (0..count)
        .map(|i| {
            let payer = format!("p{}", rng.gen_range(0..participants));
            let mut record = ExpenseRecord::new(
                format!("e{i}"),
                "trip",
                payer.as_str(),
                Money::new(Decimal::new(rng.gen_range(0..100_000), 2)),
            );
            for _ in 0..rng.gen_range(1..=participants) {
                let participant = format!("p{}", rng.gen_range(0..participants));
                let share = Money::new(Decimal::new(rng.gen_range(0..50_000), 3));
                record = record.with_contribution(participant.as_str(), share);
            }
            record
        })
        .collect()
}
