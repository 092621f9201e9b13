use divvy_domain::{BalanceCalculator, Money, ParticipantBalances, Settlement};
use tracing::debug;

use crate::{
    error::LedgerError,
    model::{LedgerReport, LedgerSnapshot, ParticipantBalance},
    ports::SettlementStrategy,
};

/// Runs the balance fold and the configured settlement strategy over a
/// snapshot. Holds no state of its own; every call starts from the snapshot
/// it is given.
#[derive(Clone, Copy)]
pub struct LedgerProcessor<'a> {
    strategy: &'a dyn SettlementStrategy,
}

impl<'a> LedgerProcessor<'a> {
    pub fn new(strategy: &'a dyn SettlementStrategy) -> Self {
        Self { strategy }
    }

    /// Net balance per participant other than the snapshot's user.
    pub fn balances(&self, snapshot: &LedgerSnapshot) -> Result<ParticipantBalances, LedgerError> {
        let balances = BalanceCalculator.calculate(
            snapshot.participants(),
            snapshot.user(),
            snapshot.expenses(),
        )?;
        Ok(balances)
    }

    /// Settlements suggested by the configured strategy for the snapshot's
    /// current balances.
    pub fn settlements(&self, snapshot: &LedgerSnapshot) -> Result<Vec<Settlement>, LedgerError> {
        let balances = self.balances(snapshot)?;
        let settlements = self.strategy.plan(&balances, snapshot.user())?;
        Ok(settlements)
    }

    /// Balances, settlements and summary totals in one pass.
    pub fn report(&self, snapshot: &LedgerSnapshot) -> Result<LedgerReport, LedgerError> {
        let balances = self.balances(snapshot)?;
        let settlements = self.strategy.plan(&balances, snapshot.user())?;

        let mut total_owed_to_user = Money::ZERO;
        let mut total_user_owes = Money::ZERO;
        for amount in balances.values() {
            if amount.signum() > 0 {
                total_owed_to_user += *amount;
            } else {
                total_user_owes += amount.abs();
            }
        }

        let net_balance = total_owed_to_user - total_user_owes;

        let rows: Vec<ParticipantBalance> = balances
            .into_iter()
            .map(|(name, amount)| ParticipantBalance { name, amount })
            .collect();

        debug!(
            balance_count = rows.len(),
            settlement_count = settlements.len(),
            net_balance = %net_balance,
            "Ledger report assembled"
        );

        Ok(LedgerReport {
            balances: rows,
            settlements,
            total_owed_to_user,
            total_user_owes,
            net_balance,
        })
    }
}
