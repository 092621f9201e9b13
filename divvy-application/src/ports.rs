use divvy_domain::{
    DebtNetting, ParticipantBalances, ParticipantName, PlanError, Settlement, SettlementPlanner,
};

/// Strategy port for turning balances into settlements.
///
/// The processor forwards whatever balances the fold produced; implementors
/// decide the routing. Swapping the strategy changes who pays whom, so the
/// caller always picks one explicitly.
pub trait SettlementStrategy: Send + Sync {
    fn plan(
        &self,
        balances: &ParticipantBalances,
        user: &ParticipantName,
    ) -> Result<Vec<Settlement>, PlanError>;
}

impl SettlementStrategy for SettlementPlanner {
    fn plan(
        &self,
        balances: &ParticipantBalances,
        user: &ParticipantName,
    ) -> Result<Vec<Settlement>, PlanError> {
        SettlementPlanner::plan(self, balances, user)
    }
}

impl SettlementStrategy for DebtNetting {
    fn plan(
        &self,
        balances: &ParticipantBalances,
        user: &ParticipantName,
    ) -> Result<Vec<Settlement>, PlanError> {
        DebtNetting::plan(self, balances, user)
    }
}
