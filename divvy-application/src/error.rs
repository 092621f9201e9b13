use divvy_domain::{BalanceError, PlanError};
use thiserror::Error;

/// Unified failure type for ledger computations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}
