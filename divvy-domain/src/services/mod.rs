pub mod balance_calculator;
pub mod debt_netting;
pub mod settlement_planner;

pub use balance_calculator::{BalanceCalculator, BalanceError};
pub use debt_netting::DebtNetting;
pub use settlement_planner::{PlanError, SettlementPlanner};
