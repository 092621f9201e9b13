use thiserror::Error;
use tracing::{debug, error};

use crate::model::{ParticipantBalances, ParticipantName, Settlement, SettlementId};

/// Rejection reasons for settlement planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("balance set contains the user \"{name}\"; balances are relative to the user")]
    InvalidBalanceSet { name: ParticipantName },
}

/// Plans settlements with the user on one side of every transfer.
///
/// Participants never pay each other directly; a debtor pays the user and the
/// user pays each creditor, even when pairing two participants would need
/// fewer transfers. `DebtNetting` is the strategy for callers who want the
/// smaller plan and accept the different payment routing.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Produces the transfers that would zero every balance.
    ///
    /// Owes-user entries come first, then user-owes entries, each phase in
    /// name order. Ids are sequential from 1 in emission order. Zero balances
    /// produce no transfer.
    ///
    /// # Arguments
    /// * `balances` - Net balance per participant, excluding the user.
    /// * `user` - The participant on the fixed side of every transfer.
    pub fn plan(
        &self,
        balances: &ParticipantBalances,
        user: &ParticipantName,
    ) -> Result<Vec<Settlement>, PlanError> {
        if balances.contains_key(user.as_str()) {
            error!(
                reject_reason = "user_in_balance_set",
                user = %user,
                "Settlement plan rejected"
            );
            return Err(PlanError::InvalidBalanceSet { name: user.clone() });
        }

        let mut settlements = Vec::new();
        let mut next_id = SettlementId(1);

        for (name, balance) in balances {
            if balance.signum() > 0 {
                settlements.push(Settlement {
                    id: next_id,
                    from: name.clone(),
                    to: user.clone(),
                    amount: *balance,
                });
                next_id = SettlementId(next_id.0 + 1);
            }
        }
        for (name, balance) in balances {
            if balance.signum() < 0 {
                settlements.push(Settlement {
                    id: next_id,
                    from: user.clone(),
                    to: name.clone(),
                    amount: balance.abs(),
                });
                next_id = SettlementId(next_id.0 + 1);
            }
        }

        debug!(
            balance_count = balances.len(),
            settlement_count = settlements.len(),
            "Settlement plan built"
        );
        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    use super::*;
    use crate::model::Money;

    #[fixture]
    fn planner() -> SettlementPlanner {
        SettlementPlanner
    }

    fn money(value: &str) -> Money {
        Money::from_decimal(Decimal::from_str(value).expect("valid decimal"))
    }

    fn balances(entries: &[(&str, &str)]) -> ParticipantBalances {
        entries
            .iter()
            .map(|(name, amount)| (ParticipantName::from(*name), money(amount)))
            .collect()
    }

    #[rstest]
    #[case::debtor_pays_user(
        &[("Alex", "40.00")],
        &[("Alex", "You", "40.00")]
    )]
    #[case::user_pays_creditor(
        &[("Alex", "-25.00")],
        &[("You", "Alex", "25.00")]
    )]
    #[case::mixed_signs_owes_user_first(
        &[("Alex", "-10.00"), ("Jamie", "5.00")],
        &[("Jamie", "You", "5.00"), ("You", "Alex", "10.00")]
    )]
    #[case::zero_balance_is_skipped(
        &[("Alex", "40.00"), ("Jamie", "0.00"), ("Taylor", "-12.50")],
        &[("Alex", "You", "40.00"), ("You", "Taylor", "12.50")]
    )]
    #[case::empty_balances(&[], &[])]
    fn plan_routes_everything_through_user(
        planner: SettlementPlanner,
        #[case] input: &[(&str, &str)],
        #[case] expected: &[(&str, &str, &str)],
    ) {
        let user = ParticipantName::from("You");

        let settlements = planner
            .plan(&balances(input), &user)
            .expect("plan should succeed");

        let expected: Vec<Settlement> = expected
            .iter()
            .enumerate()
            .map(|(position, (from, to, amount))| Settlement {
                id: SettlementId(position as u64 + 1),
                from: ParticipantName::from(*from),
                to: ParticipantName::from(*to),
                amount: money(amount),
            })
            .collect();
        assert_eq!(settlements, expected);
    }

    #[rstest]
    fn every_settlement_touches_the_user(planner: SettlementPlanner) {
        let user = ParticipantName::from("You");
        let input = balances(&[
            ("Alex", "-9.9249"),
            ("Jamie", "30.225"),
            ("Taylor", "9.625"),
        ]);

        let settlements = planner.plan(&input, &user).expect("plan should succeed");

        assert_eq!(settlements.len(), 3);
        for settlement in &settlements {
            assert!(settlement.from == user || settlement.to == user);
            assert_ne!(settlement.from, settlement.to);
            assert!(settlement.amount.signum() > 0);
        }
    }

    #[rstest]
    fn ids_are_fresh_on_every_call(planner: SettlementPlanner) {
        let user = ParticipantName::from("You");
        let input = balances(&[("Alex", "40.00"), ("Jamie", "-12.00")]);

        let first = planner.plan(&input, &user).expect("plan should succeed");
        let second = planner.plan(&input, &user).expect("plan should succeed");

        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|s| s.id).collect::<Vec<_>>(),
            [SettlementId(1), SettlementId(2)]
        );
    }

    #[rstest]
    fn balance_set_containing_the_user_is_rejected(planner: SettlementPlanner) {
        let user = ParticipantName::from("You");
        let input = balances(&[("Alex", "10.00"), ("You", "-10.00")]);

        let error = planner
            .plan(&input, &user)
            .expect_err("user entry should be rejected");

        assert_eq!(error, PlanError::InvalidBalanceSet { name: user });
    }
}
