#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Expense, ExpensePosition, Money, ParticipantBalances, ParticipantName, RemainderPolicy,
    Settlement, SettlementId,
};
pub use services::{BalanceCalculator, BalanceError, DebtNetting, PlanError, SettlementPlanner};
