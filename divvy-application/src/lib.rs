#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod processor;

pub use error::LedgerError;
pub use model::{LedgerReport, LedgerSnapshot, ParticipantBalance};
pub use ports::SettlementStrategy;
pub use processor::LedgerProcessor;
