use crate::application::report::{SettlementReport, SpendingReport};
use crate::error::Result;
use std::io::Write;

/// Writes trip reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// `from,to,amount`, one row per payment, in resolution order.
    pub fn write_settlements(&mut self, report: &SettlementReport) -> Result<()> {
        self.writer.write_record(["from", "to", "amount"])?;
        for settlement in &report.settlements {
            self.writer.write_record([
                settlement.from.as_str(),
                settlement.to.as_str(),
                &settlement.amount.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// `participant,balance`, ordered by participant identifier.
    pub fn write_balances(&mut self, report: &SettlementReport) -> Result<()> {
        self.writer.write_record(["participant", "balance"])?;
        for balance in &report.balances {
            self.writer.write_record([
                balance.participant.as_str(),
                &balance.balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_spending(&mut self, report: &SpendingReport) -> Result<()> {
        self.writer
            .write_record(["participant", "total_spent", "total_spent_on_self"])?;
        for spending in &report.participants {
            self.writer.write_record([
                spending.participant.as_str(),
                &spending.total_spent.to_string(),
                &spending.total_spent_on_self.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
