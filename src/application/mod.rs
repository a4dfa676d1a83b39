//! Application layer orchestrating the settlement domain.
//!
//! `TripReportService` pulls a trip's expense records through the
//! `ExpenseStore` port, runs the pure balance/settlement/summary computations
//! and resolves participant identifiers through the `ParticipantDirectory`
//! port before handing reports to the interfaces layer.

pub mod report;
