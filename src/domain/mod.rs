//! Settlement domain: expense records, balances, the minimum cash flow
//! resolver and the spending summary, plus the ports the application layer
//! talks to.

pub mod balance;
pub mod expense;
pub mod ids;
pub mod money;
pub mod ports;
pub mod settlement;
pub mod summary;
